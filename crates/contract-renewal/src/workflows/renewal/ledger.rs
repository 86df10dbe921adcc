use super::domain::{ContractId, DATE_FORMAT};
use super::priority::Reason;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Last notification issued for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notified_on: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reason: String,
}

impl LedgerEntry {
    pub fn new(notified_on: NaiveDate, reason: &Reason) -> Self {
        Self {
            notified_on: notified_on.format(DATE_FORMAT).to_string(),
            reason: reason.as_str().to_string(),
        }
    }

    /// `None` for legacy records written without a reason.
    pub fn previous_reason(&self) -> Option<Reason> {
        Reason::new(self.reason.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Contract id to last notification. Entries are overwritten on every new
/// notification and only removed by [`NotificationLedger::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl<'de> Deserialize<'de> for NotificationLedger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<LedgerEntry>>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(id, entry)| (id, entry.unwrap_or_default()))
            .collect();
        Ok(Self { entries })
    }
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ContractId) -> Option<&LedgerEntry> {
        self.entries.get(id.as_str())
    }

    pub fn record(&mut self, id: &ContractId, notified_on: NaiveDate, reason: &Reason) {
        self.entries
            .insert(id.as_str().to_string(), LedgerEntry::new(notified_on, reason));
    }

    pub fn insert(&mut self, id: &ContractId, entry: LedgerEntry) {
        self.entries.insert(id.as_str().to_string(), entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a persisted ledger; blank content is an empty ledger.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to access notification ledger at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("notification ledger at {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding the ledger. Reads are whole-file and writes replace the
/// file in one rename.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file loads as an empty ledger.
    pub fn load(&self) -> Result<NotificationLedger, LedgerError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no notification ledger yet");
                return Ok(NotificationLedger::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        NotificationLedger::from_json_str(&raw).map_err(|source| LedgerError::Json {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, ledger: &NotificationLedger) -> Result<(), LedgerError> {
        let body = serde_json::to_vec_pretty(ledger).map_err(|source| LedgerError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &body).map_err(|source| self.io_error(source))?;
        info!(path = %self.path.display(), entries = ledger.len(), "notification ledger saved");
        Ok(())
    }

    /// Resets the persisted ledger to an empty mapping.
    pub fn clear(&self) -> Result<(), LedgerError> {
        self.save(&NotificationLedger::default())
    }

    fn io_error(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().expect("temp dir");
        let store = LedgerStore::new(dir.path().join("absent.json"));
        assert!(store.load().expect("loads").is_empty());
    }

    #[test]
    fn blank_and_empty_object_load_empty() {
        assert!(NotificationLedger::from_json_str("  \n").expect("blank").is_empty());
        assert!(NotificationLedger::from_json_str("{}").expect("empty").is_empty());
    }

    #[test]
    fn degenerate_entries_have_no_previous_reason() {
        let ledger = NotificationLedger::from_json_str(
            r#"{"1": null, "2": {"notified_on": "2025-08-01"}, "3": {"reason": null}}"#,
        )
        .expect("legacy ledger parses");

        assert_eq!(ledger.len(), 3);
        for id in ["1", "2", "3"] {
            let entry = ledger.get(&ContractId::new(id)).expect("entry kept");
            assert!(entry.previous_reason().is_none());
        }
    }

    #[test]
    fn whitespace_reason_counts_as_previous_reason() {
        let ledger = NotificationLedger::from_json_str(
            r#"{"4": {"notified_on": "2025-08-01", "reason": " "}}"#,
        )
        .expect("ledger parses");

        let entry = ledger.get(&ContractId::new("4")).expect("entry kept");
        assert_eq!(entry.previous_reason().map(|r| r.to_string()), Some(" ".to_string()));
    }

    #[test]
    fn save_rewrites_whole_ledger() {
        let dir = tempdir().expect("temp dir");
        let store = LedgerStore::new(dir.path().join("nested").join("ledger.json"));
        let reason = Reason::new("critical").expect("reason");

        let mut ledger = NotificationLedger::new();
        ledger.record(&ContractId::from(1), date(2025, 8, 4), &reason);
        ledger.record(&ContractId::from(2), date(2025, 8, 4), &reason);
        store.save(&ledger).expect("first save");

        ledger.clear();
        ledger.record(&ContractId::from(3), date(2025, 8, 5), &reason);
        store.save(&ledger).expect("second save");

        let reloaded = store.load().expect("reload");
        assert_eq!(reloaded.len(), 1);
        let entry = reloaded.get(&ContractId::from(3)).expect("entry present");
        assert_eq!(entry.notified_on, "2025-08-05");
        assert_eq!(entry.reason, "critical");
        assert!(!dir.path().join("nested").join("ledger.tmp").exists());
    }

    #[test]
    fn clear_writes_empty_mapping() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"1": {"notified_on": "2025-08-04", "reason": "warn"}}"#)
            .expect("seed ledger");

        let store = LedgerStore::new(&path);
        store.clear().expect("clear");

        let raw = fs::read_to_string(&path).expect("read back");
        assert_eq!(raw.trim(), "{}");
        assert!(store.load().expect("reload").is_empty());
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ledger.json");
        fs::write(&path, "[1, 2").expect("seed");

        let err = LedgerStore::new(&path).load().expect_err("corrupt ledger");
        assert!(matches!(err, LedgerError::Json { .. }));
    }
}
