use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Textual calendar format shared by contracts, the ledger and user input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days-to-expiry reported for contracts without a usable renewal date.
pub const NEVER_EXPIRES: i64 = i64::MAX;

/// Stable contract identity. Numeric ids from the contracts file are kept in
/// their decimal string form so ledger lookups compare strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ContractId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContractId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(Self::from(value)),
            RawId::Text(value) => Ok(Self(value)),
        }
    }
}

/// A software license or support contract as listed in the contracts file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    #[serde(default = "default_software_name")]
    pub software_name: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default)]
    pub annual_cost_eur: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub renewal_date: Option<String>,
}

impl Contract {
    /// Annual cost truncated toward zero; fractional cents never affect rule thresholds.
    pub fn annual_cost(&self) -> i64 {
        self.annual_cost_eur.trunc() as i64
    }

    pub fn renewal_date_label(&self) -> &str {
        self.renewal_date.as_deref().unwrap_or("")
    }

    /// Whole days from `reference` until renewal; negative once expired.
    /// Missing or unparseable renewal dates never expire.
    pub fn days_to_expiry(&self, reference: NaiveDate) -> i64 {
        let Some(raw) = self.renewal_date.as_deref() else {
            return NEVER_EXPIRES;
        };

        match parse_date(raw) {
            Ok(renewal) => (renewal - reference).num_days(),
            Err(err) => {
                warn!(contract_id = %self.id, error = %err, "treating contract as non-expiring");
                NEVER_EXPIRES
            }
        }
    }

    pub fn snapshot(&self, reference: NaiveDate) -> ContractSnapshot<'_> {
        ContractSnapshot {
            contract: self,
            days_to_expiry: self.days_to_expiry(reference),
        }
    }
}

/// A contract paired with its expiry computed for one run's reference date.
#[derive(Debug, Clone, Copy)]
pub struct ContractSnapshot<'a> {
    pub contract: &'a Contract,
    pub days_to_expiry: i64,
}

impl ContractSnapshot<'_> {
    pub fn id(&self) -> &ContractId {
        &self.contract.id
    }

    pub fn annual_cost(&self) -> i64 {
        self.contract.annual_cost()
    }
}

fn default_software_name() -> String {
    "Unknown Software Name".to_string()
}

fn default_owner() -> String {
    "Unknown Owner".to_string()
}

fn default_organization() -> String {
    "Unknown Organization".to_string()
}

pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|source| DateError::InvalidDate {
        value: raw.to_string(),
        source,
    })
}

/// Resolves the reference date for a run; blank input falls back to `today`.
pub fn parse_reference_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DateError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(today),
        Some(value) => parse_date(value),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContractsLoadError {
    #[error("failed to read contracts from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid contracts data: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_contracts(path: &Path) -> Result<Vec<Contract>, ContractsLoadError> {
    let file = std::fs::File::open(path).map_err(|source| ContractsLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    contracts_from_reader(std::io::BufReader::new(file))
}

pub fn contracts_from_reader<R: Read>(reader: R) -> Result<Vec<Contract>, ContractsLoadError> {
    Ok(serde_json::from_reader(reader)?)
}
