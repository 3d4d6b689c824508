//! Aircraft — the root containers installed assets hang from.

use serde::{Deserialize, Serialize};

use crate::counters::CounterMap;

/// An aircraft as seen by this core: identity plus its own current total
/// life counters — the reference point all installed sub-assets measure
/// their delta life against. Aircraft records are managed elsewhere and are
/// read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
  pub serial_number: String,
  pub registration:  String,
  pub counters:      CounterMap,
}
