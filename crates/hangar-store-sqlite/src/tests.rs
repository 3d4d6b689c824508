//! Integration tests driving the move engine against an in-memory database.

use chrono::NaiveDate;
use hangar_core::{
  Error as CoreError,
  asset::{
    AssetState, DEFAULT_STOCK_LOCATION, NewAsset, ParentRef, RemovalCondition,
    StockCondition,
  },
  counters::CounterMap,
  engine::{InstallTarget, MoveEngine},
  history::HistoryAction,
  ledger, life,
  store::{AircraftLookup, AssetStore},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn engine(store: &SqliteStore) -> MoveEngine<SqliteStore> {
  MoveEngine::new(store.clone())
}

fn d(s: &str) -> NaiveDate { s.parse().expect("date") }

fn counters(pairs: &[(&str, f64)]) -> CounterMap {
  pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn new_asset(part: &str, serial: &str, fh: f64) -> NewAsset {
  NewAsset {
    part_number:    part.into(),
    serial_number:  serial.into(),
    stock_location: None,
    counters:       counters(&[("FH", fh)]),
    life_limits:    CounterMap::new(),
  }
}

// ─── Aircraft ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn aircraft_resolves_by_registration_and_serial() {
  let s = store().await;
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();

  let by_reg = s.get_aircraft("EC-ABC").await.unwrap().unwrap();
  assert_eq!(by_reg.serial_number, "41035");

  let by_serial = s.get_aircraft("41035").await.unwrap().unwrap();
  assert_eq!(by_serial.registration, "EC-ABC");

  assert!(s.get_aircraft("EC-XYZ").await.unwrap().is_none());
}

#[tokio::test]
async fn set_aircraft_counters_overwrites_state() {
  let s = store().await;
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();

  let updated = s
    .set_aircraft_counters("EC-ABC", counters(&[("FH", 1100.0), ("CYC", 640.0)]))
    .await
    .unwrap();
  assert_eq!(updated.counters.get("FH"), Some(&1100.0));
  assert_eq!(updated.counters.get("CYC"), Some(&640.0));

  let err = s
    .set_aircraft_counters("EC-XYZ", CounterMap::new())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AircraftNotFound(_)));
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_creates_stock_asset_with_creation_entry() {
  let s = store().await;
  let e = engine(&s);

  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  assert!(matches!(
    asset.state,
    AssetState::InStock { ref location, condition: StockCondition::Serviceable }
      if location == DEFAULT_STOCK_LOCATION
  ));
  assert_eq!(asset.history.len(), 1);
  assert_eq!(asset.history[0].action, HistoryAction::Creation);
  assert_eq!(asset.history[0].counters.get("FH"), Some(&0.0));

  // Round-trips through the database.
  let fetched = s.get_asset(asset.asset_id).await.unwrap().unwrap();
  assert_eq!(fetched.serial_number, "A1");
  assert_eq!(fetched.history.len(), 1);
}

// ─── Install ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn install_on_aircraft_sets_state_snapshot_and_history() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();

  let asset = e
    .register(new_asset("331-500-1010", "A1", 100.0), d("2024-01-01"))
    .await
    .unwrap();
  let asset = e
    .install(
      asset.asset_id,
      InstallTarget::Aircraft("EC-ABC".into()),
      d("2024-02-01"),
      &counters(&[("FH", 1000.0)]),
    )
    .await
    .unwrap();

  let AssetState::Installed { ref root, ref parent, ref snapshot } =
    asset.state
  else {
    panic!("expected installed state");
  };
  assert_eq!(root, "EC-ABC");
  assert_eq!(*parent, ParentRef::Aircraft("41035".into()));
  assert_eq!(snapshot.date, d("2024-02-01"));
  assert_eq!(snapshot.parent_counters.get("FH"), Some(&1000.0));
  // The asset's own counters are the untouched baseline.
  assert_eq!(snapshot.asset_counters.get("FH"), Some(&100.0));
  assert_eq!(asset.counters.get("FH"), Some(&100.0));

  let install = asset.history.last().unwrap();
  assert_eq!(install.action, HistoryAction::Install);
  assert_eq!(install.details, "Installed on EC-ABC");
  assert_eq!(install.counters.get("FH"), Some(&100.0));
}

#[tokio::test]
async fn install_into_nested_nha_resolves_root_registration() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();
  let root = counters(&[("FH", 1000.0)]);

  let apu = e
    .register(new_asset("331-500-1010", "APU-1", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let starter = e
    .register(new_asset("380-100-2020", "ST-7", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  e.install(
    apu.asset_id,
    InstallTarget::Aircraft("EC-ABC".into()),
    d("2024-02-01"),
    &root,
  )
  .await
  .unwrap();
  let starter = e
    .install(
      starter.asset_id,
      InstallTarget::Asset(apu.asset_id),
      d("2024-02-02"),
      &root,
    )
    .await
    .unwrap();

  let AssetState::Installed { ref root, ref parent, .. } = starter.state
  else {
    panic!("expected installed state");
  };
  // Root registration resolved through the NHA, not the NHA's own name.
  assert_eq!(root, "EC-ABC");
  assert_eq!(*parent, ParentRef::Asset(apu.asset_id));
}

#[tokio::test]
async fn self_install_is_a_cycle_violation() {
  let s = store().await;
  let e = engine(&s);

  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  let err = e
    .install(
      asset.asset_id,
      InstallTarget::Asset(asset.asset_id),
      d("2024-02-01"),
      &CounterMap::new(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::CycleViolation { .. }));
}

#[tokio::test]
async fn descendant_install_is_a_cycle_violation() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();
  let root = counters(&[("FH", 1000.0)]);

  // Chain a → b → c: c's parent is b, b's parent is a.
  let a = e
    .register(new_asset("P-A", "A", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let b = e
    .register(new_asset("P-B", "B", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let c = e
    .register(new_asset("P-C", "C", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  e.install(a.asset_id, InstallTarget::Aircraft("EC-ABC".into()), d("2024-01-02"), &root)
    .await
    .unwrap();
  e.install(b.asset_id, InstallTarget::Asset(a.asset_id), d("2024-01-03"), &root)
    .await
    .unwrap();
  e.install(c.asset_id, InstallTarget::Asset(b.asset_id), d("2024-01-04"), &root)
    .await
    .unwrap();

  let err = e
    .install(a.asset_id, InstallTarget::Asset(c.asset_id), d("2024-01-05"), &root)
    .await
    .unwrap_err();
  assert!(
    matches!(err, CoreError::CycleViolation { asset, target }
      if asset == a.asset_id && target == c.asset_id)
  );
}

#[tokio::test]
async fn rejected_install_leaves_no_mutation_and_no_history() {
  let s = store().await;
  let e = engine(&s);

  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let before = s.get_asset(asset.asset_id).await.unwrap().unwrap();

  let err = e
    .install(
      asset.asset_id,
      InstallTarget::Aircraft("EC-XYZ".into()),
      d("2024-02-01"),
      &CounterMap::new(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::AircraftNotFound(_)));

  let after = s.get_asset(asset.asset_id).await.unwrap().unwrap();
  assert_eq!(after.state, before.state);
  assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn install_of_unknown_asset_is_not_found() {
  let s = store().await;
  let e = engine(&s);

  let err = e
    .install(
      Uuid::new_v4(),
      InstallTarget::Aircraft("EC-ABC".into()),
      d("2024-02-01"),
      &CounterMap::new(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::AssetNotFound(_)));
}

#[tokio::test]
async fn install_into_stock_nha_is_rejected() {
  let s = store().await;
  let e = engine(&s);

  let nha = e
    .register(new_asset("P-A", "A", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let child = e
    .register(new_asset("P-B", "B", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  let err = e
    .install(
      child.asset_id,
      InstallTarget::Asset(nha.asset_id),
      d("2024-02-01"),
      &CounterMap::new(),
    )
    .await
    .unwrap_err();
  assert!(
    matches!(err, CoreError::TargetNotInstalled(id) if id == nha.asset_id)
  );
}

#[tokio::test]
async fn scrapped_asset_cannot_be_installed() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();

  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  e.install(
    asset.asset_id,
    InstallTarget::Aircraft("EC-ABC".into()),
    d("2024-01-02"),
    &counters(&[("FH", 1000.0)]),
  )
  .await
  .unwrap();
  e.remove(
    asset.asset_id,
    d("2024-03-01"),
    &counters(&[("FH", 1200.0)]),
    RemovalCondition::Scrapped,
    None,
  )
  .await
  .unwrap();

  let err = e
    .install(
      asset.asset_id,
      InstallTarget::Aircraft("EC-ABC".into()),
      d("2024-04-01"),
      &counters(&[("FH", 1200.0)]),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::AssetScrapped(_)));
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_freezes_live_counters_and_clears_snapshot() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 5000.0)]))
    .await
    .unwrap();

  let asset = e
    .register(new_asset("331-500-1010", "A1", 100.0), d("2024-01-01"))
    .await
    .unwrap();
  e.install(
    asset.asset_id,
    InstallTarget::Aircraft("EC-ABC".into()),
    d("2024-01-02"),
    &counters(&[("FH", 5000.0)]),
  )
  .await
  .unwrap();

  let removed = e
    .remove(
      asset.asset_id,
      d("2024-06-01"),
      &counters(&[("FH", 5300.0)]),
      RemovalCondition::Serviceable,
      None,
    )
    .await
    .unwrap();

  // 100 baseline + (5300 - 5000) delta.
  assert_eq!(removed.counters.get("FH"), Some(&400.0));
  assert!(matches!(
    removed.state,
    AssetState::InStock { condition: StockCondition::Serviceable, .. }
  ));
  assert!(removed.state.snapshot().is_none());

  // The removal entry carries the pre-freeze baseline.
  let removal = removed.history.last().unwrap();
  assert_eq!(removal.action, HistoryAction::Remove);
  assert_eq!(removal.details, "Removed from EC-ABC. Condition: serviceable");
  assert_eq!(removal.counters.get("FH"), Some(&100.0));
}

#[tokio::test]
async fn remove_of_uninstalled_asset_is_rejected() {
  let s = store().await;
  let e = engine(&s);

  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  let err = e
    .remove(
      asset.asset_id,
      d("2024-02-01"),
      &CounterMap::new(),
      RemovalCondition::Serviceable,
      None,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotInstalled(_)));
}

#[tokio::test]
async fn removing_an_nha_leaves_children_attached() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();
  let root = counters(&[("FH", 1000.0)]);

  let apu = e
    .register(new_asset("331-500-1010", "APU-1", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let starter = e
    .register(new_asset("380-100-2020", "ST-7", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  e.install(apu.asset_id, InstallTarget::Aircraft("EC-ABC".into()), d("2024-01-02"), &root)
    .await
    .unwrap();
  e.install(starter.asset_id, InstallTarget::Asset(apu.asset_id), d("2024-01-03"), &root)
    .await
    .unwrap();

  e.remove(
    apu.asset_id,
    d("2024-05-01"),
    &counters(&[("FH", 1200.0)]),
    RemovalCondition::Unserviceable,
    Some("Overhaul shop".into()),
  )
  .await
  .unwrap();

  // The child keeps its structural parent and its (now stale) denormalized
  // root — the flattening is deliberately not cascaded.
  let starter = s.get_asset(starter.asset_id).await.unwrap().unwrap();
  let AssetState::Installed { ref root, ref parent, .. } = starter.state
  else {
    panic!("expected installed state");
  };
  assert_eq!(*parent, ParentRef::Asset(apu.asset_id));
  assert_eq!(root, "EC-ABC");

  // But the chain no longer reaches an aircraft, so root resolution
  // degrades to unknown.
  assert!(e.resolve_root(&starter).await.unwrap().is_none());
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn maintenance_updates_counters_and_appends_entry() {
  let s = store().await;
  let e = engine(&s);

  let asset = e
    .register(new_asset("331-500-1010", "A1", 100.0), d("2024-01-01"))
    .await
    .unwrap();
  let asset = e
    .record_maintenance(
      asset.asset_id,
      d("2024-02-01"),
      "Bench check after shop visit",
      Some(counters(&[("FH", 120.0)])),
    )
    .await
    .unwrap();

  assert_eq!(asset.counters.get("FH"), Some(&120.0));
  let entry = asset.history.last().unwrap();
  assert_eq!(entry.action, HistoryAction::Maintenance);
  assert_eq!(entry.details, "Bench check after shop visit");
  assert_eq!(entry.counters.get("FH"), Some(&120.0));
}

// ─── Store queries ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_assets_at_uses_the_denormalized_root() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();
  let root = counters(&[("FH", 1000.0)]);

  let a = e
    .register(new_asset("P-A", "A", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  let b = e
    .register(new_asset("P-B", "B", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  e.register(new_asset("P-C", "C", 0.0), d("2024-01-01"))
    .await
    .unwrap();

  e.install(a.asset_id, InstallTarget::Aircraft("EC-ABC".into()), d("2024-01-02"), &root)
    .await
    .unwrap();
  // Nested: still listed under the aircraft thanks to the flattened root.
  e.install(b.asset_id, InstallTarget::Asset(a.asset_id), d("2024-01-03"), &root)
    .await
    .unwrap();

  let on_wing = s.list_assets_at("EC-ABC").await.unwrap();
  assert_eq!(on_wing.len(), 2);
  assert!(on_wing.iter().all(|x| x.state.location_reference() == "EC-ABC"));
  assert!(on_wing.iter().all(|x| !x.history.is_empty()));

  let in_stock = s.list_assets_at(DEFAULT_STOCK_LOCATION).await.unwrap();
  assert_eq!(in_stock.len(), 1);
  assert_eq!(in_stock[0].serial_number, "C");
}

#[tokio::test]
async fn append_history_to_unknown_asset_errors() {
  let s = store().await;
  let err = s
    .append_history(
      Uuid::new_v4(),
      ledger::maintenance_entry(d("2024-01-01"), "x", CounterMap::new()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AssetNotFound(_)));
}

#[tokio::test]
async fn update_of_unknown_asset_errors() {
  let s = store().await;
  let e = engine(&s);
  let mut asset = e
    .register(new_asset("P-A", "A", 0.0), d("2024-01-01"))
    .await
    .unwrap();
  asset.asset_id = Uuid::new_v4();

  let err = s.update_asset(&asset).await.unwrap_err();
  assert!(matches!(err, Error::AssetNotFound(_)));
}

// ─── Full cycle ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_service_cycle() {
  let s = store().await;
  let e = engine(&s);
  s.add_aircraft("41035", "EC-ABC", counters(&[("FH", 1000.0)]))
    .await
    .unwrap();

  // Register S/N "A1" in stock with zero hours.
  let asset = e
    .register(new_asset("331-500-1010", "A1", 0.0), d("2023-12-15"))
    .await
    .unwrap();

  // Install on EC-ABC at root FH=1000.
  let asset = e
    .install(
      asset.asset_id,
      InstallTarget::Aircraft("EC-ABC".into()),
      d("2024-01-01"),
      &counters(&[("FH", 1000.0)]),
    )
    .await
    .unwrap();

  // Live life while the aircraft is at FH=1150.
  let live = life::live_value(&asset, "FH", &counters(&[("FH", 1150.0)]));
  assert_eq!(live, 150.0);

  // Remove at root FH=1300, serviceable.
  let asset = e
    .remove(
      asset.asset_id,
      d("2024-06-01"),
      &counters(&[("FH", 1300.0)]),
      RemovalCondition::Serviceable,
      None,
    )
    .await
    .unwrap();

  assert_eq!(asset.counters.get("FH"), Some(&300.0));
  assert!(matches!(asset.state, AssetState::InStock { .. }));

  let fetched = s.get_asset(asset.asset_id).await.unwrap().unwrap();
  let actions: Vec<HistoryAction> =
    fetched.history.iter().map(|h| h.action).collect();
  assert_eq!(
    actions,
    vec![
      HistoryAction::Creation,
      HistoryAction::Install,
      HistoryAction::Remove,
    ]
  );

  // Both move entries carry the baseline at their event.
  assert_eq!(fetched.history[1].counters.get("FH"), Some(&0.0));
  assert_eq!(fetched.history[2].counters.get("FH"), Some(&0.0));

  // Log card: one closed row.
  let rows = ledger::log_card_rows(&fetched.history);
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].install.as_ref().unwrap().date, d("2024-01-01"));
  assert_eq!(rows[0].removal.as_ref().unwrap().date, d("2024-06-01"));

  // A second installation pairs into a new open row, most recent first.
  e.install(
    asset.asset_id,
    InstallTarget::Aircraft("EC-ABC".into()),
    d("2024-07-01"),
    &counters(&[("FH", 1300.0)]),
  )
  .await
  .unwrap();

  let fetched = s.get_asset(asset.asset_id).await.unwrap().unwrap();
  let rows = ledger::log_card_rows(&fetched.history);
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].install.as_ref().unwrap().date, d("2024-07-01"));
  assert!(rows[0].removal.is_none());
  assert_eq!(rows[1].removal.as_ref().unwrap().date, d("2024-06-01"));
}
