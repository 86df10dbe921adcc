use super::domain::{load_contracts, Contract};
use super::engine::{DecisionEngine, OutcomeLabels, Verdict};
use super::ledger::{LedgerError, LedgerStore};
use super::notification::Notification;
use super::rules::RuleSet;
use crate::config::InputPaths;
use crate::error::AppError;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Summary of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub reference_date: NaiveDate,
    pub notifications: Vec<Notification>,
    pub evaluated: usize,
    pub suppressed: usize,
    pub unmatched: usize,
}

impl RunReport {
    fn empty(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            notifications: Vec::new(),
            evaluated: 0,
            suppressed: 0,
            unmatched: 0,
        }
    }
}

/// Drives a check cycle: evaluates every contract against the ledger loaded
/// for this cycle and persists the updated ledger once at the end.
#[derive(Debug, Clone)]
pub struct RenewalCoordinator {
    contracts: Vec<Contract>,
    engine: DecisionEngine,
    store: LedgerStore,
}

impl RenewalCoordinator {
    pub fn new(contracts: Vec<Contract>, engine: DecisionEngine, store: LedgerStore) -> Self {
        Self {
            contracts,
            engine,
            store,
        }
    }

    /// Loads rules and contracts; either source missing is fatal.
    pub fn from_paths(paths: &InputPaths) -> Result<Self, AppError> {
        let rules = RuleSet::load(&paths.rules)?;
        let contracts = load_contracts(&paths.contracts)?;
        info!(
            rules = rules.rules().len(),
            contracts = contracts.len(),
            "renewal inputs loaded"
        );

        Ok(Self::new(
            contracts,
            DecisionEngine::new(rules, OutcomeLabels::default()),
            LedgerStore::new(&paths.ledger),
        ))
    }

    pub fn check(&self, reference_date: NaiveDate) -> Result<RunReport, LedgerError> {
        if self.contracts.is_empty() {
            return Ok(RunReport::empty(reference_date));
        }

        let mut ledger = self.store.load()?;
        let mut report = RunReport::empty(reference_date);

        for contract in &self.contracts {
            let snapshot = contract.snapshot(reference_date);
            let decision = self.engine.evaluate(&snapshot, &ledger);
            report.evaluated += 1;

            match decision.verdict {
                Verdict::Notify(reason) => {
                    ledger.record(&contract.id, reference_date, &reason);
                    report.notifications.push(Notification::new(contract, reason));
                }
                Verdict::AlreadyNotified => {
                    debug!(contract_id = %contract.id, previous = ?decision.previous_reason, "already notified");
                    report.suppressed += 1;
                }
                Verdict::NoMatch => report.unmatched += 1,
            }
        }

        self.store.save(&ledger)?;
        info!(
            reference_date = %reference_date,
            evaluated = report.evaluated,
            notified = report.notifications.len(),
            suppressed = report.suppressed,
            unmatched = report.unmatched,
            "renewal check completed"
        );

        Ok(report)
    }

    pub fn clear_ledger(&self) -> Result<(), LedgerError> {
        self.store.clear()
    }

    pub fn ledger_path(&self) -> &Path {
        self.store.path()
    }
}
