//! [`SqliteStore`] — the SQLite implementation of [`AssetStore`] and
//! [`AircraftLookup`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use hangar_core::{
  aircraft::Aircraft,
  asset::{
    AssetState, ComponentAsset, DEFAULT_STOCK_LOCATION, NewAsset,
    StockCondition,
  },
  counters::CounterMap,
  history::{HistoryEntry, NewHistoryEntry},
  store::{AircraftLookup, AssetStore},
};

use crate::{
  Error, Result,
  encode::{
    RawAircraft, RawAsset, RawHistoryEntry, encode_action, encode_counters,
    encode_date, encode_dt, encode_state, encode_uuid,
  },
  schema::SCHEMA,
};

const ASSET_COLUMNS: &str =
  "asset_id, part_number, serial_number, state, counters, life_limits, \
   created_at";

const HISTORY_COLUMNS: &str =
  "entry_id, asset_id, date, action, details, counters, recorded_at";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn raw_asset_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAsset> {
  Ok(RawAsset {
    asset_id:      row.get(0)?,
    part_number:   row.get(1)?,
    serial_number: row.get(2)?,
    state:         row.get(3)?,
    counters:      row.get(4)?,
    life_limits:   row.get(5)?,
    created_at:    row.get(6)?,
  })
}

fn raw_history_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawHistoryEntry> {
  Ok(RawHistoryEntry {
    entry_id:    row.get(0)?,
    asset_id:    row.get(1)?,
    date:        row.get(2)?,
    action:      row.get(3)?,
    details:     row.get(4)?,
    counters:    row.get(5)?,
    recorded_at: row.get(6)?,
  })
}

fn raw_aircraft_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawAircraft> {
  Ok(RawAircraft {
    serial_number: row.get(0)?,
    registration:  row.get(1)?,
    counters:      row.get(2)?,
  })
}

/// Attach history rows to their assets, preserving per-asset recording
/// order.
fn assemble_assets(
  raw_assets: Vec<RawAsset>,
  raw_history: Vec<RawHistoryEntry>,
) -> Result<Vec<ComponentAsset>> {
  let mut grouped: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
  for raw in raw_history {
    let key = raw.asset_id.clone();
    grouped.entry(key).or_default().push(raw.into_entry()?);
  }

  raw_assets
    .into_iter()
    .map(|raw| {
      let history = grouped.remove(&raw.asset_id).unwrap_or_default();
      raw.into_asset(history)
    })
    .collect()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A component-records store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Aircraft management (not part of the core traits; aircraft stay
  //    read-only through `AircraftLookup`) ──────────────────────────────────

  /// Insert an aircraft record.
  pub async fn add_aircraft(
    &self,
    serial_number: &str,
    registration: &str,
    counters: CounterMap,
  ) -> Result<Aircraft> {
    let aircraft = Aircraft {
      serial_number: serial_number.to_owned(),
      registration:  registration.to_owned(),
      counters,
    };

    let serial_str = aircraft.serial_number.clone();
    let registration_str = aircraft.registration.clone();
    let counters_str = encode_counters(&aircraft.counters)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO aircraft (serial_number, registration, counters)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![serial_str, registration_str, counters_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(aircraft)
  }

  /// Overwrite an aircraft's counter state. `key` is a registration or
  /// serial number.
  pub async fn set_aircraft_counters(
    &self,
    key: &str,
    counters: CounterMap,
  ) -> Result<Aircraft> {
    let counters_str = encode_counters(&counters)?;
    let key_str = key.to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE aircraft SET counters = ?2
           WHERE serial_number = ?1 OR registration = ?1",
          rusqlite::params![key_str, counters_str],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Err(Error::AircraftNotFound(key.to_owned()));
    }

    self
      .get_aircraft(key)
      .await?
      .ok_or_else(|| Error::AircraftNotFound(key.to_owned()))
  }

  /// Fetch the history rows for one asset, in recording order.
  async fn history_for(&self, asset_id_str: String) -> Result<Vec<HistoryEntry>> {
    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM asset_history
           WHERE asset_id = ?1
           ORDER BY recorded_at, entry_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![asset_id_str], raw_history_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }
}

// ─── AssetStore impl ─────────────────────────────────────────────────────────

impl AssetStore for SqliteStore {
  type Error = Error;

  async fn add_asset(&self, input: NewAsset) -> Result<ComponentAsset> {
    let asset = ComponentAsset {
      asset_id:      Uuid::new_v4(),
      part_number:   input.part_number,
      serial_number: input.serial_number,
      state:         AssetState::InStock {
        location:  input
          .stock_location
          .unwrap_or_else(|| DEFAULT_STOCK_LOCATION.to_owned()),
        condition: StockCondition::Serviceable,
      },
      counters:      input.counters,
      life_limits:   input.life_limits,
      history:       Vec::new(),
      created_at:    Utc::now(),
    };

    let id_str        = encode_uuid(asset.asset_id);
    let part_str      = asset.part_number.clone();
    let serial_str    = asset.serial_number.clone();
    let state_str     = encode_state(&asset.state)?;
    let root_ref_str  = asset.state.location_reference().to_owned();
    let counters_str  = encode_counters(&asset.counters)?;
    let limits_str    = encode_counters(&asset.life_limits)?;
    let created_str   = encode_dt(asset.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assets (
             asset_id, part_number, serial_number, state, root_reference,
             counters, life_limits, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            part_str,
            serial_str,
            state_str,
            root_ref_str,
            counters_str,
            limits_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(asset)
  }

  async fn get_asset(&self, id: Uuid) -> Result<Option<ComponentAsset>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAsset> = {
      let id_str = id_str.clone();
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!(
                  "SELECT {ASSET_COLUMNS} FROM assets WHERE asset_id = ?1"
                ),
                rusqlite::params![id_str],
                raw_asset_from_row,
              )
              .optional()?,
          )
        })
        .await?
    };

    let Some(raw) = raw else { return Ok(None) };
    let history = self.history_for(id_str).await?;
    Ok(Some(raw.into_asset(history)?))
  }

  async fn list_assets(&self) -> Result<Vec<ComponentAsset>> {
    let (raw_assets, raw_history): (Vec<RawAsset>, Vec<RawHistoryEntry>) =
      self
        .conn
        .call(|conn| {
          let mut stmt =
            conn.prepare(&format!("SELECT {ASSET_COLUMNS} FROM assets"))?;
          let assets = stmt
            .query_map([], raw_asset_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(&format!(
            "SELECT {HISTORY_COLUMNS} FROM asset_history
             ORDER BY recorded_at, entry_id"
          ))?;
          let history = stmt
            .query_map([], raw_history_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          Ok((assets, history))
        })
        .await?;

    assemble_assets(raw_assets, raw_history)
  }

  async fn list_assets_at(&self, reference: &str) -> Result<Vec<ComponentAsset>> {
    let reference = reference.to_owned();

    let (raw_assets, raw_history): (Vec<RawAsset>, Vec<RawHistoryEntry>) =
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE root_reference = ?1"
          ))?;
          let assets = stmt
            .query_map(rusqlite::params![reference], raw_asset_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(
            "SELECT h.entry_id, h.asset_id, h.date, h.action, h.details,
                    h.counters, h.recorded_at
             FROM asset_history h
             JOIN assets a ON a.asset_id = h.asset_id
             WHERE a.root_reference = ?1
             ORDER BY h.recorded_at, h.entry_id",
          )?;
          let history = stmt
            .query_map(rusqlite::params![reference], raw_history_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          Ok((assets, history))
        })
        .await?;

    assemble_assets(raw_assets, raw_history)
  }

  async fn update_asset(&self, asset: &ComponentAsset) -> Result<()> {
    let asset_id     = asset.asset_id;
    let id_str       = encode_uuid(asset_id);
    let state_str    = encode_state(&asset.state)?;
    let root_ref_str = asset.state.location_reference().to_owned();
    let counters_str = encode_counters(&asset.counters)?;
    let limits_str   = encode_counters(&asset.life_limits)?;

    let changed: usize = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE assets
           SET state = ?2, root_reference = ?3, counters = ?4,
               life_limits = ?5
           WHERE asset_id = ?1",
          rusqlite::params![
            id_str,
            state_str,
            root_ref_str,
            counters_str,
            limits_str,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Err(Error::AssetNotFound(asset_id));
    }
    Ok(())
  }

  async fn append_history(
    &self,
    asset_id: Uuid,
    entry: NewHistoryEntry,
  ) -> Result<HistoryEntry> {
    let exists: bool = {
      let id_str = encode_uuid(asset_id);
      self
        .conn
        .call(move |conn| {
          let found: bool = conn
            .query_row(
              "SELECT 1 FROM assets WHERE asset_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          Ok(found)
        })
        .await?
    };
    if !exists {
      return Err(Error::AssetNotFound(asset_id));
    }

    let persisted = HistoryEntry {
      entry_id: Uuid::new_v4(),
      asset_id,
      date: entry.date,
      action: entry.action,
      details: entry.details,
      counters: entry.counters,
      recorded_at: Utc::now(),
    };

    let entry_id_str = encode_uuid(persisted.entry_id);
    let asset_id_str = encode_uuid(asset_id);
    let date_str     = encode_date(persisted.date);
    let action_str   = encode_action(persisted.action).to_owned();
    let details_str  = persisted.details.clone();
    let counters_str = encode_counters(&persisted.counters)?;
    let recorded_str = encode_dt(persisted.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO asset_history (
             entry_id, asset_id, date, action, details, counters, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            entry_id_str,
            asset_id_str,
            date_str,
            action_str,
            details_str,
            counters_str,
            recorded_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(persisted)
  }
}

// ─── AircraftLookup impl ─────────────────────────────────────────────────────

impl AircraftLookup for SqliteStore {
  type Error = Error;

  async fn get_aircraft(&self, key: &str) -> Result<Option<Aircraft>> {
    let key_str = key.to_owned();

    let raw: Option<RawAircraft> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT serial_number, registration, counters
               FROM aircraft
               WHERE serial_number = ?1 OR registration = ?1",
              rusqlite::params![key_str],
              raw_aircraft_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAircraft::into_aircraft).transpose()
  }

  async fn list_aircraft(&self) -> Result<Vec<Aircraft>> {
    let raws: Vec<RawAircraft> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT serial_number, registration, counters
           FROM aircraft ORDER BY registration",
        )?;
        let rows = stmt
          .query_map([], raw_aircraft_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAircraft::into_aircraft).collect()
  }
}
