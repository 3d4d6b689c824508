//! Live-life computation — derived, read-only views over an asset's
//! installation snapshot and its root aircraft's current counters.
//!
//! The stored `counters` field is only rewritten at removal time (the
//! freeze) or through the explicit maintenance update path; everything in
//! this module is a pure function of its inputs.

use std::collections::BTreeSet;

use crate::{
  asset::{ComponentAsset, InstallSnapshot},
  counters::{CounterMap, counter_value},
};

/// Accumulated life of `asset` for one factor, measured against the root
/// aircraft's current counter state.
///
/// While installed: the snapshot baseline plus the root's counter delta
/// since installation. The delta is clamped at zero — aircraft counters are
/// monotonically non-decreasing in normal operation, so a negative delta
/// means stale source data and must never reduce recorded life. When the
/// asset is not installed the stored value is already live.
pub fn live_value(
  asset: &ComponentAsset,
  factor: &str,
  current_root: &CounterMap,
) -> f64 {
  match asset.state.snapshot() {
    Some(snapshot) => snapshot_live_value(snapshot, factor, current_root),
    None => counter_value(&asset.counters, factor),
  }
}

fn snapshot_live_value(
  snapshot: &InstallSnapshot,
  factor: &str,
  current_root: &CounterMap,
) -> f64 {
  let at_install = counter_value(&snapshot.parent_counters, factor);
  let now = counter_value(current_root, factor);
  let delta = (now - at_install).max(0.0);
  counter_value(&snapshot.asset_counters, factor) + delta
}

/// Live values for every factor known to the snapshot or the supplied root
/// state.
///
/// This is also the freeze computation: at removal the result becomes the
/// asset's new stored baseline.
pub fn live_counters(
  asset: &ComponentAsset,
  current_root: &CounterMap,
) -> CounterMap {
  let Some(snapshot) = asset.state.snapshot() else {
    return asset.counters.clone();
  };

  let factors: BTreeSet<&str> = snapshot
    .asset_counters
    .keys()
    .chain(snapshot.parent_counters.keys())
    .chain(current_root.keys())
    .map(String::as_str)
    .collect();

  factors
    .into_iter()
    .map(|f| (f.to_owned(), snapshot_live_value(snapshot, f, current_root)))
    .collect()
}

/// Whether the asset has consumed its whole life limit for `factor`.
/// A pure comparison for warning display; it never blocks a move.
pub fn is_life_expired(
  asset: &ComponentAsset,
  factor: &str,
  current_root: &CounterMap,
) -> bool {
  match asset.life_limits.get(factor) {
    Some(limit) => live_value(asset, factor, current_root) >= *limit,
    None => false,
  }
}

/// Life left before the limit for `factor`, when one is set. Negative for
/// an asset already past its limit.
pub fn remaining(
  asset: &ComponentAsset,
  factor: &str,
  current_root: &CounterMap,
) -> Option<f64> {
  let limit = asset.life_limits.get(factor)?;
  Some(limit - live_value(asset, factor, current_root))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::asset::{AssetState, ComponentAsset, InstallSnapshot, ParentRef};

  fn counters(pairs: &[(&str, f64)]) -> CounterMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
  }

  fn installed_asset(
    asset_counters: CounterMap,
    parent_counters: CounterMap,
  ) -> ComponentAsset {
    ComponentAsset {
      asset_id:      Uuid::new_v4(),
      part_number:   "331-500-1010".into(),
      serial_number: "A1".into(),
      state:         AssetState::Installed {
        root:     "EC-ABC".into(),
        parent:   ParentRef::Aircraft("41035".into()),
        snapshot: InstallSnapshot {
          date: "2024-01-01".parse().unwrap(),
          parent_counters,
          asset_counters,
        },
      },
      counters:      counters(&[("FH", 100.0)]),
      life_limits:   CounterMap::new(),
      history:       vec![],
      created_at:    Utc::now(),
    }
  }

  #[test]
  fn live_value_adds_parent_delta_to_baseline() {
    let asset = installed_asset(
      counters(&[("FH", 100.0)]),
      counters(&[("FH", 5000.0)]),
    );
    let root = counters(&[("FH", 5200.0)]);
    assert_eq!(live_value(&asset, "FH", &root), 300.0);
  }

  #[test]
  fn negative_delta_is_clamped_to_zero() {
    let asset = installed_asset(
      counters(&[("FH", 100.0)]),
      counters(&[("FH", 5000.0)]),
    );
    // Root counters behind the install-time value: stale data.
    let root = counters(&[("FH", 4900.0)]);
    assert_eq!(live_value(&asset, "FH", &root), 100.0);
  }

  #[test]
  fn absent_factors_read_as_zero() {
    let asset = installed_asset(CounterMap::new(), CounterMap::new());
    let root = counters(&[("CYC", 40.0)]);
    assert_eq!(live_value(&asset, "CYC", &root), 40.0);
  }

  #[test]
  fn uninstalled_asset_live_value_is_the_stored_value() {
    let mut asset = installed_asset(CounterMap::new(), CounterMap::new());
    asset.state = AssetState::InStock {
      location:  "Main stores".into(),
      condition: crate::asset::StockCondition::Serviceable,
    };
    let root = counters(&[("FH", 9999.0)]);
    assert_eq!(live_value(&asset, "FH", &root), 100.0);
  }

  #[test]
  fn live_counters_covers_factor_union() {
    let asset = installed_asset(
      counters(&[("FH", 100.0)]),
      counters(&[("FH", 5000.0), ("CYC", 800.0)]),
    );
    let root = counters(&[("FH", 5200.0), ("CYC", 860.0)]);

    let live = live_counters(&asset, &root);
    assert_eq!(live.get("FH"), Some(&300.0));
    // No baseline for CYC: accrues from zero.
    assert_eq!(live.get("CYC"), Some(&60.0));
  }

  #[test]
  fn expiry_compares_live_value_against_limit() {
    let mut asset = installed_asset(
      counters(&[("FH", 100.0)]),
      counters(&[("FH", 5000.0)]),
    );
    asset.life_limits = counters(&[("FH", 250.0)]);

    let below = counters(&[("FH", 5100.0)]); // live 200
    assert!(!is_life_expired(&asset, "FH", &below));
    assert_eq!(remaining(&asset, "FH", &below), Some(50.0));

    let at = counters(&[("FH", 5150.0)]); // live 250, limit reached
    assert!(is_life_expired(&asset, "FH", &at));

    // No limit for the factor: never expired.
    assert!(!is_life_expired(&asset, "CYC", &at));
    assert_eq!(remaining(&asset, "CYC", &at), None);
  }
}
