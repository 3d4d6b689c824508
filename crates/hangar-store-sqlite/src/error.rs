//! Error type for `hangar-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("column decode error: {0}")]
  Decode(String),

  #[error("asset not found: {0}")]
  AssetNotFound(uuid::Uuid),

  #[error("aircraft not found: {0:?}")]
  AircraftNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
