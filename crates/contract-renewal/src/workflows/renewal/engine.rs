use super::domain::ContractSnapshot;
use super::ledger::NotificationLedger;
use super::priority::Reason;
use super::rules::RuleSet;
use serde::{Deserialize, Serialize};

/// Labels reported for the two outcomes that carry no configured reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    pub no_match: String,
    pub already_notified: String,
}

impl Default for OutcomeLabels {
    fn default() -> Self {
        Self {
            no_match: "No Match".to_string(),
            already_notified: "Already Notified".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A fresh alert is due for this reason.
    Notify(Reason),
    /// No rule matched the contract.
    NoMatch,
    /// The ledger already holds an equal or higher priority notification.
    AlreadyNotified,
}

/// Outcome of evaluating one contract, including the reason found in the
/// ledger when one was consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub previous_reason: Option<Reason>,
}

impl Decision {
    pub fn should_notify(&self) -> bool {
        matches!(self.verdict, Verdict::Notify(_))
    }

    pub fn notify_reason(&self) -> Option<&Reason> {
        match &self.verdict {
            Verdict::Notify(reason) => Some(reason),
            Verdict::NoMatch | Verdict::AlreadyNotified => None,
        }
    }

    pub fn reason_label<'a>(&'a self, labels: &'a OutcomeLabels) -> &'a str {
        match &self.verdict {
            Verdict::Notify(reason) => reason.as_str(),
            Verdict::NoMatch => &labels.no_match,
            Verdict::AlreadyNotified => &labels.already_notified,
        }
    }
}

/// Re-notification policy: a contract is alerted the first time any rule
/// matches it, and again only when its top reason climbs in priority.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    rules: RuleSet,
    labels: OutcomeLabels,
}

impl DecisionEngine {
    pub fn new(rules: RuleSet, labels: OutcomeLabels) -> Self {
        Self { rules, labels }
    }

    pub fn evaluate(
        &self,
        snapshot: &ContractSnapshot<'_>,
        ledger: &NotificationLedger,
    ) -> Decision {
        let Some(top_reason) = self.rules.find_top_reason(snapshot) else {
            return Decision {
                verdict: Verdict::NoMatch,
                previous_reason: None,
            };
        };

        let previous_reason = ledger
            .get(snapshot.id())
            .and_then(|entry| entry.previous_reason());

        let Some(previous) = previous_reason else {
            return Decision {
                verdict: Verdict::Notify(top_reason.clone()),
                previous_reason: None,
            };
        };

        let priority = self.rules.priority();
        let verdict = if priority
            .rank(top_reason.as_str())
            .outranks(priority.rank(previous.as_str()))
        {
            Verdict::Notify(top_reason.clone())
        } else {
            Verdict::AlreadyNotified
        };

        Decision {
            verdict,
            previous_reason: Some(previous),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn labels(&self) -> &OutcomeLabels {
        &self.labels
    }
}
