//! The move engine — validated structural moves of component assets.
//!
//! Every operation reads current store state, validates fully, and only
//! then mutates: a rejected move leaves no partial state and no history
//! entry behind.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  aircraft::Aircraft,
  asset::{
    AssetState, ComponentAsset, DEFAULT_STOCK_LOCATION, InstallSnapshot,
    NewAsset, ParentRef, RemovalCondition, StockCondition,
  },
  counters::CounterMap,
  ledger, life,
  store::{AircraftLookup, AssetStore},
};

/// Where an installation should attach an asset.
#[derive(Debug, Clone)]
pub enum InstallTarget {
  /// Directly onto an aircraft, by registration or serial number.
  Aircraft(String),
  /// Into a next-higher assembly that is itself installed.
  Asset(Uuid),
}

/// Executes structural moves against a store backend.
///
/// Cloning the backend handle is expected to be cheap (the SQLite backend
/// reference-counts its connection).
pub struct MoveEngine<S> {
  store: S,
}

impl<S> MoveEngine<S>
where
  S: AssetStore + AircraftLookup,
{
  pub fn new(store: S) -> Self { Self { store } }

  // ── Registration ──────────────────────────────────────────────────────────

  /// Register a new asset into stock and record its creation.
  pub async fn register(
    &self,
    input: NewAsset,
    date: NaiveDate,
  ) -> Result<ComponentAsset> {
    let mut asset = self.store.add_asset(input).await.map_err(store_err)?;

    let entry = ledger::creation_entry(
      date,
      asset.state.location_reference(),
      asset.counters.clone(),
    );
    let entry = self
      .store
      .append_history(asset.asset_id, entry)
      .await
      .map_err(store_err)?;
    asset.history.push(entry);

    info!(asset = %asset.asset_id, serial = %asset.serial_number, "registered asset");
    Ok(asset)
  }

  // ── Install ───────────────────────────────────────────────────────────────

  /// Install an asset onto an aircraft or into a next-higher assembly.
  ///
  /// An already-installed asset is re-parented in place: a fresh snapshot
  /// is taken from the supplied counters and the stored baseline, exactly
  /// as for an install out of stock. The asset's own counters are left
  /// untouched; they stay the baseline the live-life delta is measured
  /// from.
  ///
  /// `root_counters` is the root aircraft's counter state as of the event
  /// date — supplied by the caller, since the event may be backdated.
  pub async fn install(
    &self,
    asset_id: Uuid,
    target: InstallTarget,
    date: NaiveDate,
    root_counters: &CounterMap,
  ) -> Result<ComponentAsset> {
    let mut asset = self.load_asset(asset_id).await?;

    if asset.state.is_scrapped() {
      return Err(Error::AssetScrapped(asset_id));
    }

    let (parent, root) = self.resolve_target(asset_id, &target).await?;

    asset.state = AssetState::Installed {
      root:     root.registration.clone(),
      parent,
      snapshot: InstallSnapshot {
        date,
        parent_counters: root_counters.clone(),
        asset_counters: asset.counters.clone(),
      },
    };

    self.store.update_asset(&asset).await.map_err(store_err)?;
    let entry = self
      .store
      .append_history(
        asset_id,
        ledger::install_entry(date, &root.registration, asset.counters.clone()),
      )
      .await
      .map_err(store_err)?;
    asset.history.push(entry);

    info!(asset = %asset_id, aircraft = %root.registration, %date, "installed asset");
    Ok(asset)
  }

  // ── Remove ────────────────────────────────────────────────────────────────

  /// Remove an installed asset into stock (or scrap it), freezing its
  /// accumulated life as the new stored baseline.
  ///
  /// Sub-components stay attached to the asset structurally; only this
  /// asset's placement changes.
  pub async fn remove(
    &self,
    asset_id: Uuid,
    date: NaiveDate,
    root_counters: &CounterMap,
    condition: RemovalCondition,
    location: Option<String>,
  ) -> Result<ComponentAsset> {
    let mut asset = self.load_asset(asset_id).await?;

    let AssetState::Installed { ref root, .. } = asset.state else {
      return Err(Error::NotInstalled(asset_id));
    };
    let vacated = root.clone();

    // The history entry carries the pre-freeze baseline; the freeze then
    // becomes the stored value going forward.
    let entry =
      ledger::removal_entry(date, &vacated, condition, asset.counters.clone());
    let frozen = life::live_counters(&asset, root_counters);

    asset.counters = frozen;
    let location =
      location.unwrap_or_else(|| DEFAULT_STOCK_LOCATION.to_owned());
    asset.state = match condition {
      RemovalCondition::Serviceable => AssetState::InStock {
        location,
        condition: StockCondition::Serviceable,
      },
      RemovalCondition::Unserviceable => AssetState::InStock {
        location,
        condition: StockCondition::Unserviceable,
      },
      RemovalCondition::Scrapped => AssetState::Scrapped { location },
    };

    self.store.update_asset(&asset).await.map_err(store_err)?;
    let entry = self
      .store
      .append_history(asset_id, entry)
      .await
      .map_err(store_err)?;
    asset.history.push(entry);

    info!(asset = %asset_id, from = %vacated, condition = condition.as_str(), "removed asset");
    Ok(asset)
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  /// The explicit counters-update path outside install/remove. Overwrites
  /// the stored counters when `new_counters` is given, then records a
  /// maintenance entry carrying the counters as of the event.
  pub async fn record_maintenance(
    &self,
    asset_id: Uuid,
    date: NaiveDate,
    details: &str,
    new_counters: Option<CounterMap>,
  ) -> Result<ComponentAsset> {
    let mut asset = self.load_asset(asset_id).await?;

    if let Some(counters) = new_counters {
      asset.counters = counters;
      self.store.update_asset(&asset).await.map_err(store_err)?;
    }

    let entry = self
      .store
      .append_history(
        asset_id,
        ledger::maintenance_entry(date, details, asset.counters.clone()),
      )
      .await
      .map_err(store_err)?;
    asset.history.push(entry);

    info!(asset = %asset_id, %date, "recorded maintenance");
    Ok(asset)
  }

  // ── Resolution ────────────────────────────────────────────────────────────

  /// Resolve the root aircraft an asset hangs from by walking the parent
  /// chain. Broken chains, missing parents, and corrupt cycles all degrade
  /// to `None` — display callers treat the root as unknown rather than
  /// failing.
  pub async fn resolve_root(
    &self,
    asset: &ComponentAsset,
  ) -> Result<Option<Aircraft>> {
    let mut parent = match &asset.state {
      AssetState::Installed { parent, .. } => parent.clone(),
      _ => return Ok(None),
    };

    let mut visited: HashSet<Uuid> = HashSet::new();
    visited.insert(asset.asset_id);

    loop {
      match parent {
        ParentRef::Aircraft(serial) => {
          return self.store.get_aircraft(&serial).await.map_err(store_err);
        }
        ParentRef::Asset(parent_id) => {
          if !visited.insert(parent_id) {
            return Ok(None);
          }
          let Some(nha) =
            self.store.get_asset(parent_id).await.map_err(store_err)?
          else {
            return Ok(None);
          };
          match &nha.state {
            AssetState::Installed { parent: next, .. } => parent = next.clone(),
            _ => return Ok(None),
          }
        }
      }
    }
  }

  /// Resolve an install target to the immediate parent reference and the
  /// root aircraft, rejecting self- and descendant-targets.
  async fn resolve_target(
    &self,
    asset_id: Uuid,
    target: &InstallTarget,
  ) -> Result<(ParentRef, Aircraft)> {
    match target {
      InstallTarget::Aircraft(key) => {
        let aircraft = self.load_aircraft(key).await?;
        Ok((ParentRef::Aircraft(aircraft.serial_number.clone()), aircraft))
      }
      InstallTarget::Asset(target_id) => {
        let target_id = *target_id;
        if target_id == asset_id {
          return Err(Error::CycleViolation {
            asset:  asset_id,
            target: target_id,
          });
        }

        // Walk the parent chain upward from the target. Encountering the
        // asset anywhere on the chain means the target is its descendant.
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut current = self.load_asset(target_id).await?;
        loop {
          if current.asset_id == asset_id {
            return Err(Error::CycleViolation {
              asset:  asset_id,
              target: target_id,
            });
          }
          if !visited.insert(current.asset_id) {
            // Pre-existing corrupt cycle in stored data; refuse to extend it.
            return Err(Error::TargetNotInstalled(target_id));
          }
          match &current.state {
            AssetState::Installed {
              parent: ParentRef::Aircraft(serial),
              ..
            } => {
              let aircraft = self.load_aircraft(serial).await?;
              return Ok((ParentRef::Asset(target_id), aircraft));
            }
            AssetState::Installed {
              parent: ParentRef::Asset(parent_id),
              ..
            } => {
              current = self.load_asset(*parent_id).await?;
            }
            _ => return Err(Error::TargetNotInstalled(target_id)),
          }
        }
      }
    }
  }

  async fn load_asset(&self, id: Uuid) -> Result<ComponentAsset> {
    self
      .store
      .get_asset(id)
      .await
      .map_err(store_err)?
      .ok_or(Error::AssetNotFound(id))
  }

  async fn load_aircraft(&self, key: &str) -> Result<Aircraft> {
    self
      .store
      .get_aircraft(key)
      .await
      .map_err(store_err)?
      .ok_or_else(|| Error::AircraftNotFound(key.to_owned()))
  }
}

fn store_err<E>(err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(err))
}
