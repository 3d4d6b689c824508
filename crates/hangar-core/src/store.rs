//! The `AssetStore` and `AircraftLookup` traits.
//!
//! Implemented by storage backends (e.g. `hangar-store-sqlite`). The move
//! engine and the CLI depend on these abstractions, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  aircraft::Aircraft,
  asset::{ComponentAsset, NewAsset},
  history::{HistoryEntry, NewHistoryEntry},
};

/// Abstraction over a component-asset store backend.
///
/// Assets are persisted whole-object except for their history, which is
/// strictly append-only: [`AssetStore::update_asset`] never touches it, and
/// [`AssetStore::append_history`] is the only way to grow it.
pub trait AssetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a new asset. The id and creation timestamp are
  /// assigned by the store.
  fn add_asset(
    &self,
    input: NewAsset,
  ) -> impl Future<Output = Result<ComponentAsset, Self::Error>> + Send + '_;

  /// Retrieve an asset with its full history, ordered by recording time.
  /// Returns `None` if not found.
  fn get_asset(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ComponentAsset>, Self::Error>> + Send + '_;

  /// List all assets, history included.
  fn list_assets(
    &self,
  ) -> impl Future<Output = Result<Vec<ComponentAsset>, Self::Error>> + Send + '_;

  /// List assets whose denormalized root container matches `reference` —
  /// an aircraft registration or a stock/shop name.
  fn list_assets_at<'a>(
    &'a self,
    reference: &'a str,
  ) -> impl Future<Output = Result<Vec<ComponentAsset>, Self::Error>> + Send + 'a;

  /// Overwrite an asset's mutable fields (state, counters, life limits).
  /// The history is deliberately not written by this method.
  fn update_asset<'a>(
    &'a self,
    asset: &'a ComponentAsset,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Append one history entry and return it as persisted. Entries are
  /// immutable once appended.
  fn append_history(
    &self,
    asset_id: Uuid,
    entry: NewHistoryEntry,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send + '_;
}

/// Read-only resolution of root aircraft and their current counter state.
pub trait AircraftLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve an aircraft by registration or serial number.
  fn get_aircraft<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Aircraft>, Self::Error>> + Send + 'a;

  fn list_aircraft(
    &self,
  ) -> impl Future<Output = Result<Vec<Aircraft>, Self::Error>> + Send + '_;
}
