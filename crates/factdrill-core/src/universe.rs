//! Fact universe enumeration.

use crate::model::{DisabledFactors, Fact};

/// Every ordered fact whose factors are both enabled, row-major.
///
/// The result has `k²` entries where `k` is the number of enabled factors.
/// An empty result means every factor is disabled.
pub fn fact_universe(disabled: &DisabledFactors) -> Vec<Fact> {
    let enabled = disabled.enabled_factors();
    enabled
        .iter()
        .flat_map(|&a| enabled.iter().map(move |&b| Fact::new(a, b)))
        .collect()
}
