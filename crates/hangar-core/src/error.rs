//! Error types for `hangar-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("asset not found: {0}")]
  AssetNotFound(Uuid),

  #[error("aircraft not found: {0:?}")]
  AircraftNotFound(String),

  #[error("installing {asset} under {target} would create a structural cycle")]
  CycleViolation { asset: Uuid, target: Uuid },

  #[error("asset {0} is not installed")]
  NotInstalled(Uuid),

  #[error("asset {0} is scrapped and can no longer be moved")]
  AssetScrapped(Uuid),

  #[error("target asset {0} is not installed on an aircraft")]
  TargetNotInstalled(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
