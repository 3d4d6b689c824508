//! History entries — the append-only audit trail of a component asset.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::counters::CounterMap;

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
  Creation,
  Install,
  Remove,
  Maintenance,
}

impl HistoryAction {
  /// The discriminant string stored in the `action` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Creation => "creation",
      Self::Install => "install",
      Self::Remove => "remove",
      Self::Maintenance => "maintenance",
    }
  }
}

/// One immutable audit-trail entry. Once appended, never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub entry_id:    Uuid,
  pub asset_id:    Uuid,
  /// Calendar date of the event itself; may be backdated.
  pub date:        NaiveDate,
  pub action:      HistoryAction,
  /// Free text naming the counterpart location, e.g. "Installed on EC-ABC".
  pub details:     String,
  /// The asset's counters as of this event — for a removal, the value
  /// before the freeze wrote the new baseline.
  pub counters:    CounterMap,
  /// Store-assigned recording timestamp; orders same-date entries.
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::AssetStore::append_history`].
/// `entry_id` and `recorded_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
  pub date:     NaiveDate,
  pub action:   HistoryAction,
  pub details:  String,
  pub counters: CounterMap,
}
