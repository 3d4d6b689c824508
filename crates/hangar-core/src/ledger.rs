//! The history ledger — entry builders for the audit trail and the
//! reconstruction of paired install/remove rows for log-card display.

use chrono::NaiveDate;

use crate::{
  asset::RemovalCondition,
  counters::CounterMap,
  history::{HistoryAction, HistoryEntry, NewHistoryEntry},
};

// ─── Entry builders ──────────────────────────────────────────────────────────

/// Entry recorded when an asset is first registered into stock.
pub fn creation_entry(
  date: NaiveDate,
  location: &str,
  counters: CounterMap,
) -> NewHistoryEntry {
  NewHistoryEntry {
    date,
    action: HistoryAction::Creation,
    details: format!("Registered into stock at {location}"),
    counters,
  }
}

/// Entry recorded on a successful installation.
pub fn install_entry(
  date: NaiveDate,
  registration: &str,
  counters: CounterMap,
) -> NewHistoryEntry {
  NewHistoryEntry {
    date,
    action: HistoryAction::Install,
    details: format!("Installed on {registration}"),
    counters,
  }
}

/// Entry recorded on a successful removal. `counters` is the asset's value
/// before the freeze wrote the new baseline, so the entry reflects the
/// state this installation span started from.
pub fn removal_entry(
  date: NaiveDate,
  reference: &str,
  condition: RemovalCondition,
  counters: CounterMap,
) -> NewHistoryEntry {
  NewHistoryEntry {
    date,
    action: HistoryAction::Remove,
    details: format!(
      "Removed from {reference}. Condition: {}",
      condition.as_str()
    ),
    counters,
  }
}

/// Entry recorded by the maintenance update path.
pub fn maintenance_entry(
  date: NaiveDate,
  details: &str,
  counters: CounterMap,
) -> NewHistoryEntry {
  NewHistoryEntry {
    date,
    action: HistoryAction::Maintenance,
    details: details.to_owned(),
    counters,
  }
}

// ─── Log-card reconstruction ─────────────────────────────────────────────────

/// One display row of a component log card: an installation paired with the
/// removal that ended it. Either side may be missing — an open installation
/// has no removal yet, and anomalous histories yield orphaned entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LogCardRow {
  pub install: Option<HistoryEntry>,
  pub removal: Option<HistoryEntry>,
}

/// Pair install/remove history entries into display rows, most recent
/// first.
///
/// Entries are scanned in ascending event order holding at most one open
/// installation. A second install before any removal (data anomaly) flushes
/// the open one as an unpaired row; a removal with no open install emits a
/// removal-only row. Creation and maintenance entries do not participate.
/// The input is never mutated.
pub fn log_card_rows(history: &[HistoryEntry]) -> Vec<LogCardRow> {
  let mut ordered: Vec<&HistoryEntry> = history
    .iter()
    .filter(|e| {
      matches!(e.action, HistoryAction::Install | HistoryAction::Remove)
    })
    .collect();
  // Stable sort: same-date entries keep their recording order.
  ordered.sort_by(|a, b| (a.date, a.recorded_at).cmp(&(b.date, b.recorded_at)));

  let mut rows = Vec::new();
  let mut open: Option<&HistoryEntry> = None;

  for entry in ordered {
    match entry.action {
      HistoryAction::Install => {
        if let Some(prior) = open.take() {
          rows.push(LogCardRow { install: Some(prior.clone()), removal: None });
        }
        open = Some(entry);
      }
      HistoryAction::Remove => {
        rows.push(LogCardRow {
          install: open.take().cloned(),
          removal: Some(entry.clone()),
        });
      }
      HistoryAction::Creation | HistoryAction::Maintenance => {}
    }
  }

  if let Some(still_open) = open {
    rows.push(LogCardRow { install: Some(still_open.clone()), removal: None });
  }

  rows.reverse();
  rows
}
