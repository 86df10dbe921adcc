//! Renewal notification workflow: rule matching, re-notification policy and the
//! ledger that remembers what was already sent.

mod coordinator;
pub mod domain;
mod engine;
pub mod ledger;
mod notification;
pub mod priority;
pub mod rules;
pub mod session;

pub use coordinator::{RenewalCoordinator, RunReport};
pub use domain::{
    contracts_from_reader, load_contracts, parse_date, parse_reference_date, Contract,
    ContractId, ContractSnapshot, ContractsLoadError, DateError, DATE_FORMAT, NEVER_EXPIRES,
};
pub use engine::{Decision, DecisionEngine, OutcomeLabels, Verdict};
pub use ledger::{LedgerEntry, LedgerError, LedgerStore, NotificationLedger};
pub use notification::Notification;
pub use priority::{PriorityList, Rank, Reason};
pub use rules::{Rule, RuleCondition, RuleDefect, RuleSet, RulesLoadError};
pub use session::{run_session, SessionCommand};
