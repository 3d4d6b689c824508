//! SQL schema for the hangar SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS aircraft (
    serial_number TEXT PRIMARY KEY,
    registration  TEXT NOT NULL UNIQUE,
    counters      TEXT NOT NULL DEFAULT '{}'  -- JSON factor-id map
);

CREATE TABLE IF NOT EXISTS assets (
    asset_id       TEXT PRIMARY KEY,
    part_number    TEXT NOT NULL,
    serial_number  TEXT NOT NULL,
    state          TEXT NOT NULL,              -- JSON placement union
    root_reference TEXT NOT NULL,              -- denormalized root container name
    counters       TEXT NOT NULL DEFAULT '{}',
    life_limits    TEXT NOT NULL DEFAULT '{}',
    created_at     TEXT NOT NULL               -- ISO 8601 UTC
);

-- Asset history is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS asset_history (
    entry_id    TEXT PRIMARY KEY,
    asset_id    TEXT NOT NULL REFERENCES assets(asset_id),
    date        TEXT NOT NULL,    -- ISO 8601 calendar date of the event
    action      TEXT NOT NULL,    -- 'creation' | 'install' | 'remove' | 'maintenance'
    details     TEXT NOT NULL,
    counters    TEXT NOT NULL DEFAULT '{}',
    recorded_at TEXT NOT NULL     -- ISO 8601 UTC; store-assigned
);

CREATE INDEX IF NOT EXISTS assets_root_idx      ON assets(root_reference);
CREATE INDEX IF NOT EXISTS assets_part_idx      ON assets(part_number);
CREATE INDEX IF NOT EXISTS history_asset_idx    ON asset_history(asset_id);
CREATE INDEX IF NOT EXISTS history_recorded_idx ON asset_history(recorded_at);

PRAGMA user_version = 1;
";
