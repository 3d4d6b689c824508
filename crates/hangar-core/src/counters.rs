//! Counter maps — named countable quantities accumulated over service life.

use std::collections::BTreeMap;

/// Factor id (e.g. `"FH"` for flight hours, `"CYC"` for cycles) mapped to an
/// accumulated value. Factor definitions live in an external registry; this
/// core references them by id only.
pub type CounterMap = BTreeMap<String, f64>;

/// Read a single factor, treating an absent key as zero.
pub fn counter_value(counters: &CounterMap, factor: &str) -> f64 {
  counters.get(factor).copied().unwrap_or(0.0)
}
