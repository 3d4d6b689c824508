//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, event dates as ISO 8601
//! calendar dates. Structured fields (placement union, counter maps) are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use hangar_core::{
  aircraft::Aircraft,
  asset::{AssetState, ComponentAsset},
  counters::CounterMap,
  history::{HistoryAction, HistoryEntry},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|e: chrono::ParseError| Error::DateParse(e.to_string()))
}

// ─── Counter maps ────────────────────────────────────────────────────────────

pub fn encode_counters(counters: &CounterMap) -> Result<String> {
  Ok(serde_json::to_string(counters)?)
}

pub fn decode_counters(s: &str) -> Result<CounterMap> {
  Ok(serde_json::from_str(s)?)
}

// ─── AssetState ──────────────────────────────────────────────────────────────

pub fn encode_state(state: &AssetState) -> Result<String> {
  Ok(serde_json::to_string(state)?)
}

pub fn decode_state(s: &str) -> Result<AssetState> {
  Ok(serde_json::from_str(s)?)
}

// ─── HistoryAction ───────────────────────────────────────────────────────────

pub fn encode_action(action: HistoryAction) -> &'static str { action.as_str() }

pub fn decode_action(s: &str) -> Result<HistoryAction> {
  match s {
    "creation" => Ok(HistoryAction::Creation),
    "install" => Ok(HistoryAction::Install),
    "remove" => Ok(HistoryAction::Remove),
    "maintenance" => Ok(HistoryAction::Maintenance),
    other => Err(Error::Decode(format!("unknown history action: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `aircraft` row.
pub struct RawAircraft {
  pub serial_number: String,
  pub registration:  String,
  pub counters:      String,
}

impl RawAircraft {
  pub fn into_aircraft(self) -> Result<Aircraft> {
    Ok(Aircraft {
      serial_number: self.serial_number,
      registration:  self.registration,
      counters:      decode_counters(&self.counters)?,
    })
  }
}

/// Raw strings read directly from an `assets` row. History rows are fetched
/// separately and attached on assembly.
pub struct RawAsset {
  pub asset_id:      String,
  pub part_number:   String,
  pub serial_number: String,
  pub state:         String,
  pub counters:      String,
  pub life_limits:   String,
  pub created_at:    String,
}

impl RawAsset {
  pub fn into_asset(self, history: Vec<HistoryEntry>) -> Result<ComponentAsset> {
    Ok(ComponentAsset {
      asset_id:      decode_uuid(&self.asset_id)?,
      part_number:   self.part_number,
      serial_number: self.serial_number,
      state:         decode_state(&self.state)?,
      counters:      decode_counters(&self.counters)?,
      life_limits:   decode_counters(&self.life_limits)?,
      history,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `asset_history` row.
pub struct RawHistoryEntry {
  pub entry_id:    String,
  pub asset_id:    String,
  pub date:        String,
  pub action:      String,
  pub details:     String,
  pub counters:    String,
  pub recorded_at: String,
}

impl RawHistoryEntry {
  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      entry_id:    decode_uuid(&self.entry_id)?,
      asset_id:    decode_uuid(&self.asset_id)?,
      date:        decode_date(&self.date)?,
      action:      decode_action(&self.action)?,
      details:     self.details,
      counters:    decode_counters(&self.counters)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
