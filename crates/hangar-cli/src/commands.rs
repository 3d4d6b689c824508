//! Subcommand implementations for the `hangar` binary.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use hangar_core::{
  asset::{
    AssetState, ComponentAsset, NewAsset, ParentRef, RemovalCondition,
    StockCondition,
  },
  counters::CounterMap,
  engine::{InstallTarget, MoveEngine},
  ledger, life,
  store::{AircraftLookup, AssetStore},
};
use hangar_store_sqlite::SqliteStore;

// ─── Shared argument types ───────────────────────────────────────────────────

/// A `FACTOR=VALUE` pair, e.g. `FH=1234.5`.
#[derive(Debug, Clone)]
pub struct CounterArg {
  pub factor: String,
  pub value:  f64,
}

impl std::str::FromStr for CounterArg {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (factor, value) = s
      .split_once('=')
      .ok_or_else(|| format!("expected FACTOR=VALUE, got {s:?}"))?;
    if factor.is_empty() {
      return Err(format!("empty factor id in {s:?}"));
    }
    let value: f64 = value
      .parse()
      .map_err(|_| format!("invalid counter value: {value:?}"))?;
    Ok(Self { factor: factor.to_owned(), value })
  }
}

fn counter_map(args: &[CounterArg]) -> CounterMap {
  args.iter().map(|c| (c.factor.clone(), c.value)).collect()
}

/// Merge `FACTOR=VALUE` updates into an existing counter map.
fn merge_counters(mut base: CounterMap, updates: &[CounterArg]) -> CounterMap {
  for c in updates {
    base.insert(c.factor.clone(), c.value);
  }
  base
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConditionArg {
  Serviceable,
  Unserviceable,
  Scrapped,
}

impl From<ConditionArg> for RemovalCondition {
  fn from(c: ConditionArg) -> Self {
    match c {
      ConditionArg::Serviceable => Self::Serviceable,
      ConditionArg::Unserviceable => Self::Unserviceable,
      ConditionArg::Scrapped => Self::Scrapped,
    }
  }
}

fn today() -> NaiveDate { Utc::now().date_naive() }

fn fmt_counters(counters: &CounterMap) -> String {
  if counters.is_empty() {
    return "-".into();
  }
  counters
    .iter()
    .map(|(k, v)| format!("{k}={v}"))
    .collect::<Vec<_>>()
    .join(" ")
}

// ─── Aircraft ────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum AircraftCommand {
  /// Register a new aircraft.
  Add {
    #[arg(long)]
    serial: String,

    #[arg(long)]
    registration: String,

    /// Initial counter values as FACTOR=VALUE pairs.
    #[arg(long = "counter")]
    counters: Vec<CounterArg>,
  },

  /// Update an aircraft's current counter totals.
  SetCounters {
    /// Registration or serial number.
    key: String,

    #[arg(long = "counter", required = true)]
    counters: Vec<CounterArg>,
  },

  /// List all aircraft.
  List,
}

pub async fn aircraft(store: &SqliteStore, cmd: AircraftCommand) -> Result<()> {
  match cmd {
    AircraftCommand::Add { serial, registration, counters } => {
      let aircraft = store
        .add_aircraft(&serial, &registration, counter_map(&counters))
        .await?;
      println!(
        "added {} (s/n {})",
        aircraft.registration, aircraft.serial_number
      );
    }

    AircraftCommand::SetCounters { key, counters } => {
      let current = store
        .get_aircraft(&key)
        .await?
        .ok_or_else(|| anyhow!("aircraft not found: {key}"))?;
      let merged = merge_counters(current.counters, &counters);
      let updated = store.set_aircraft_counters(&key, merged).await?;
      println!(
        "{}: {}",
        updated.registration,
        fmt_counters(&updated.counters)
      );
    }

    AircraftCommand::List => {
      for aircraft in store.list_aircraft().await? {
        println!(
          "{:<10} s/n {:<12} {}",
          aircraft.registration,
          aircraft.serial_number,
          fmt_counters(&aircraft.counters)
        );
      }
    }
  }
  Ok(())
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum AssetCommand {
  /// Register a new asset into stock.
  Register {
    #[arg(long)]
    part_number: String,

    #[arg(long)]
    serial: String,

    /// Stock location; the default store when omitted.
    #[arg(long)]
    location: Option<String>,

    /// Event date (defaults to today).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Initial counter values as FACTOR=VALUE pairs.
    #[arg(long = "counter")]
    counters: Vec<CounterArg>,

    /// Life limits as FACTOR=VALUE pairs.
    #[arg(long = "limit")]
    limits: Vec<CounterArg>,
  },

  /// List assets, optionally restricted to one root container.
  List {
    /// Aircraft registration or stock/shop name.
    #[arg(long)]
    at: Option<String>,
  },

  /// Show one asset in detail, including live life while installed.
  Show { id: Uuid },

  /// Install an asset onto an aircraft or into a next-higher assembly.
  Install {
    id: Uuid,

    /// Target aircraft registration or serial number.
    #[arg(long, conflicts_with = "nha")]
    aircraft: Option<String>,

    /// Target next-higher-assembly asset id.
    #[arg(long)]
    nha: Option<Uuid>,

    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Remove an installed asset into stock (or scrap it).
  Remove {
    id: Uuid,

    #[arg(long)]
    condition: ConditionArg,

    /// Receiving stock/shop location.
    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Record a maintenance event, optionally updating counters.
  Maintenance {
    id: Uuid,

    #[arg(long)]
    details: String,

    /// Counter updates as FACTOR=VALUE pairs, merged into the stored state.
    #[arg(long = "counter")]
    counters: Vec<CounterArg>,

    #[arg(long)]
    date: Option<NaiveDate>,
  },

  /// Print the paired install/remove log card, most recent first.
  LogCard { id: Uuid },
}

pub async fn asset(
  store: &SqliteStore,
  engine: &MoveEngine<SqliteStore>,
  cmd: AssetCommand,
) -> Result<()> {
  match cmd {
    AssetCommand::Register {
      part_number,
      serial,
      location,
      date,
      counters,
      limits,
    } => {
      let input = NewAsset {
        part_number,
        serial_number: serial,
        stock_location: location,
        counters: counter_map(&counters),
        life_limits: counter_map(&limits),
      };
      let asset = engine.register(input, date.unwrap_or_else(today)).await?;
      println!(
        "registered {} s/n {} as {}",
        asset.part_number, asset.serial_number, asset.asset_id
      );
    }

    AssetCommand::List { at } => {
      let assets = match at {
        Some(reference) => store.list_assets_at(&reference).await?,
        None => store.list_assets().await?,
      };
      for a in assets {
        println!(
          "{}  {:<16} s/n {:<10} @ {}",
          a.asset_id,
          a.part_number,
          a.serial_number,
          a.state.location_reference()
        );
      }
    }

    AssetCommand::Show { id } => {
      let asset = store
        .get_asset(id)
        .await?
        .ok_or_else(|| anyhow!("asset not found: {id}"))?;
      show_asset(engine, &asset).await?;
    }

    AssetCommand::Install { id, aircraft, nha, date } => {
      // Resolve the root aircraft up front: its current counters become the
      // installation snapshot's parent baseline.
      let (target, root) = match (aircraft, nha) {
        (Some(key), None) => {
          let aircraft = store
            .get_aircraft(&key)
            .await?
            .ok_or_else(|| anyhow!("aircraft not found: {key}"))?;
          (InstallTarget::Aircraft(key), aircraft)
        }
        (None, Some(nha_id)) => {
          let nha = store
            .get_asset(nha_id)
            .await?
            .ok_or_else(|| anyhow!("asset not found: {nha_id}"))?;
          let root = engine.resolve_root(&nha).await?.ok_or_else(|| {
            anyhow!("target {nha_id} is not installed on a known aircraft")
          })?;
          (InstallTarget::Asset(nha_id), root)
        }
        _ => bail!("exactly one of --aircraft or --nha is required"),
      };

      let asset = engine
        .install(id, target, date.unwrap_or_else(today), &root.counters)
        .await?;
      println!(
        "installed {} on {}",
        asset.serial_number,
        asset.state.location_reference()
      );
    }

    AssetCommand::Remove { id, condition, location, date } => {
      let asset = store
        .get_asset(id)
        .await?
        .ok_or_else(|| anyhow!("asset not found: {id}"))?;
      let root = engine.resolve_root(&asset).await?.ok_or_else(|| {
        anyhow!("cannot resolve the root aircraft of {id}; counters unknown")
      })?;

      let asset = engine
        .remove(
          id,
          date.unwrap_or_else(today),
          &root.counters,
          condition.into(),
          location,
        )
        .await?;
      println!(
        "removed {} to {} ({})",
        asset.serial_number,
        asset.state.location_reference(),
        fmt_counters(&asset.counters)
      );
    }

    AssetCommand::Maintenance { id, details, counters, date } => {
      let new_counters = if counters.is_empty() {
        None
      } else {
        let asset = store
          .get_asset(id)
          .await?
          .ok_or_else(|| anyhow!("asset not found: {id}"))?;
        Some(merge_counters(asset.counters, &counters))
      };

      let asset = engine
        .record_maintenance(id, date.unwrap_or_else(today), &details, new_counters)
        .await?;
      println!(
        "recorded maintenance on {} ({})",
        asset.serial_number,
        fmt_counters(&asset.counters)
      );
    }

    AssetCommand::LogCard { id } => {
      let asset = store
        .get_asset(id)
        .await?
        .ok_or_else(|| anyhow!("asset not found: {id}"))?;
      print_log_card(&asset);
    }
  }
  Ok(())
}

async fn show_asset(
  engine: &MoveEngine<SqliteStore>,
  asset: &ComponentAsset,
) -> Result<()> {
  println!("asset        {}", asset.asset_id);
  println!("part number  {}", asset.part_number);
  println!("serial       {}", asset.serial_number);
  println!("counters     {}", fmt_counters(&asset.counters));
  if !asset.life_limits.is_empty() {
    println!("life limits  {}", fmt_counters(&asset.life_limits));
  }

  match &asset.state {
    AssetState::Installed { root, parent, snapshot } => {
      let parent_desc = match parent {
        ParentRef::Aircraft(serial) => format!("aircraft s/n {serial}"),
        ParentRef::Asset(id) => format!("assembly {id}"),
      };
      println!(
        "location     installed on {root} (parent: {parent_desc}, since {})",
        snapshot.date
      );

      match engine.resolve_root(asset).await? {
        Some(aircraft) => {
          let live = life::live_counters(asset, &aircraft.counters);
          println!("live life    {}", fmt_counters(&live));
          for factor in asset.life_limits.keys() {
            if life::is_life_expired(asset, factor, &aircraft.counters) {
              println!("WARNING      life limit reached for {factor}");
            }
          }
        }
        None => {
          println!("live life    unknown (root aircraft not resolvable)");
        }
      }
    }
    AssetState::InStock { location, condition } => {
      let condition = match condition {
        StockCondition::Serviceable => "serviceable",
        StockCondition::Unserviceable => "unserviceable",
      };
      println!("location     in stock at {location} ({condition})");
    }
    AssetState::AtMro { location } => {
      println!("location     at MRO {location}");
    }
    AssetState::Scrapped { location } => {
      println!("location     scrapped ({location})");
    }
  }
  Ok(())
}

fn print_log_card(asset: &ComponentAsset) {
  let rows = ledger::log_card_rows(&asset.history);
  if rows.is_empty() {
    println!("no install/remove events recorded");
    return;
  }

  let describe = |entry: &hangar_core::history::HistoryEntry| {
    format!("{} {} ({})", entry.date, entry.details, fmt_counters(&entry.counters))
  };

  for row in rows {
    let install = row.install.as_ref().map(describe).unwrap_or_else(|| "-".into());
    let removal = row.removal.as_ref().map(describe).unwrap_or_else(|| "-".into());
    println!("installed: {install}");
    println!("  removed: {removal}");
  }
}

// ─── Tree ────────────────────────────────────────────────────────────────────

pub async fn tree(store: &SqliteStore, key: &str) -> Result<()> {
  let aircraft = store
    .get_aircraft(key)
    .await?
    .ok_or_else(|| anyhow!("aircraft not found: {key}"))?;
  println!(
    "{} (s/n {})  {}",
    aircraft.registration,
    aircraft.serial_number,
    fmt_counters(&aircraft.counters)
  );

  let assets = store.list_assets_at(&aircraft.registration).await?;

  // Group by immediate parent; the denormalized root already scoped the
  // query to this aircraft.
  let mut by_parent: HashMap<ParentRef, Vec<&ComponentAsset>> = HashMap::new();
  for asset in &assets {
    if let AssetState::Installed { parent, .. } = &asset.state {
      by_parent.entry(parent.clone()).or_default().push(asset);
    }
  }

  print_branch(
    &by_parent,
    &ParentRef::Aircraft(aircraft.serial_number.clone()),
    1,
  );
  Ok(())
}

fn print_branch(
  by_parent: &HashMap<ParentRef, Vec<&ComponentAsset>>,
  parent: &ParentRef,
  depth: usize,
) {
  let Some(children) = by_parent.get(parent) else { return };
  for child in children {
    println!(
      "{}- {} s/n {} ({})",
      "  ".repeat(depth),
      child.part_number,
      child.serial_number,
      fmt_counters(&child.counters)
    );
    print_branch(by_parent, &ParentRef::Asset(child.asset_id), depth + 1);
  }
}
