//! Component assets — physical, serial-numbered instances of catalog parts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{counters::CounterMap, history::HistoryEntry};

/// Stock location used when a removal or registration does not name one.
pub const DEFAULT_STOCK_LOCATION: &str = "Main stores";

// ─── Placement ───────────────────────────────────────────────────────────────

/// The immediate structural parent of an installed asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParentRef {
  /// Root-level install, keyed by the aircraft's serial number.
  Aircraft(String),
  /// Installed into a next-higher assembly.
  Asset(Uuid),
}

/// Serviceability of an asset that is sitting in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockCondition {
  Serviceable,
  Unserviceable,
}

/// Counter state captured at the moment of the current installation.
///
/// `asset_counters` is the asset's life as of the last removal or
/// registration — the baseline the live-life delta is added to. It is not
/// rewritten while the asset stays on wing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallSnapshot {
  pub date:            NaiveDate,
  pub parent_counters: CounterMap,
  pub asset_counters:  CounterMap,
}

/// Where an asset is, as a single tagged union.
///
/// An installation snapshot exists exactly when the asset is installed, and
/// a stock condition exactly when it sits in stock — inconsistent
/// combinations are unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetState {
  /// On an aircraft, directly or nested under a next-higher assembly.
  ///
  /// `root` is the registration of the ultimate root aircraft, denormalized
  /// onto every asset regardless of nesting depth so "what's at X" queries
  /// need no tree walk. It is written at install time and is NOT cascaded
  /// to structural descendants when an ancestor moves.
  Installed {
    root:     String,
    parent:   ParentRef,
    snapshot: InstallSnapshot,
  },
  InStock {
    location:  String,
    condition: StockCondition,
  },
  AtMro {
    location: String,
  },
  /// Terminal; a scrapped asset can never be installed again.
  Scrapped {
    location: String,
  },
}

impl AssetState {
  /// The name of the asset's root container: the aircraft registration when
  /// installed, the stock/shop name otherwise.
  pub fn location_reference(&self) -> &str {
    match self {
      Self::Installed { root, .. } => root,
      Self::InStock { location, .. }
      | Self::AtMro { location }
      | Self::Scrapped { location } => location,
    }
  }

  pub fn is_installed(&self) -> bool { matches!(self, Self::Installed { .. }) }

  pub fn is_scrapped(&self) -> bool { matches!(self, Self::Scrapped { .. }) }

  /// The installation snapshot, when the asset is installed.
  pub fn snapshot(&self) -> Option<&InstallSnapshot> {
    match self {
      Self::Installed { snapshot, .. } => Some(snapshot),
      _ => None,
    }
  }
}

/// The condition a removal hands the asset over in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCondition {
  Serviceable,
  Unserviceable,
  Scrapped,
}

impl RemovalCondition {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Serviceable => "serviceable",
      Self::Unserviceable => "unserviceable",
      Self::Scrapped => "scrapped",
    }
  }
}

// ─── Asset ───────────────────────────────────────────────────────────────────

/// A physical, serial-numbered instance of a catalog part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAsset {
  pub asset_id:      Uuid,
  /// Catalog part-number reference; practically immutable.
  pub part_number:   String,
  /// Human business key; unique per part number by convention only.
  pub serial_number: String,
  pub state:         AssetState,
  /// Authoritative "as of last known state" life. Rewritten only by the
  /// freeze at removal or the explicit maintenance update path.
  pub counters:      CounterMap,
  /// Per-factor life-limit ceilings; empty when the part is not
  /// life-limited.
  pub life_limits:   CounterMap,
  /// Append-only audit trail, ordered by recording time.
  pub history:       Vec<HistoryEntry>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::AssetStore::add_asset`].
/// `asset_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAsset {
  pub part_number:    String,
  pub serial_number:  String,
  /// Stock location the asset is registered into;
  /// [`DEFAULT_STOCK_LOCATION`] when `None`.
  pub stock_location: Option<String>,
  pub counters:       CounterMap,
  pub life_limits:    CounterMap,
}
