use super::domain::ContractSnapshot;
use super::priority::{PriorityList, Rank, Reason};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

const KEY_REASON: &str = "reason";
const KEY_DAYS_TO_EXPIRY: &str = "days_to_expiry";
const KEY_MIN_ANNUAL_COST: &str = "min_annual_cost";

/// A single threshold a contract has to satisfy for a rule to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCondition {
    /// Holds when the contract expires within this many days (inclusive).
    MaxDaysToExpiry(i64),
    /// Holds when the truncated annual cost is at least this amount.
    MinAnnualCost(i64),
}

impl RuleCondition {
    pub fn holds(&self, snapshot: &ContractSnapshot<'_>) -> bool {
        match *self {
            RuleCondition::MaxDaysToExpiry(max_days) => snapshot.days_to_expiry <= max_days,
            RuleCondition::MinAnnualCost(min_cost) => snapshot.annual_cost() >= min_cost,
        }
    }
}

/// Problems found while validating a raw rule. Any defect disables the rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleDefect {
    #[error("rule must be an object, found {0}")]
    NotAnObject(String),
    #[error("rule has no reason")]
    MissingReason,
    #[error("rule reason must be a string, found {0}")]
    MalformedReason(String),
    #[error("condition '{field}' must be an integer, found {value}")]
    MalformedCondition { field: &'static str, value: String },
}

/// Conjunctive set of conditions tagged with the reason reported on a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    reason: Option<Reason>,
    conditions: Vec<RuleCondition>,
    defects: Vec<RuleDefect>,
}

impl Rule {
    pub fn new(reason: Reason, conditions: Vec<RuleCondition>) -> Self {
        Self {
            reason: Some(reason),
            conditions,
            defects: Vec::new(),
        }
    }

    /// Validates one raw rule object from the configuration document.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self {
                reason: None,
                conditions: Vec::new(),
                defects: vec![RuleDefect::NotAnObject(value.to_string())],
            };
        };

        let mut defects = Vec::new();
        let reason = match object.get(KEY_REASON) {
            None | Some(Value::Null) => {
                defects.push(RuleDefect::MissingReason);
                None
            }
            Some(Value::String(raw)) => {
                let reason = Reason::new(raw.as_str());
                if reason.is_none() {
                    defects.push(RuleDefect::MissingReason);
                }
                reason
            }
            Some(other) => {
                defects.push(RuleDefect::MalformedReason(other.to_string()));
                None
            }
        };

        let mut conditions = Vec::new();
        for (field, build) in [
            (
                KEY_DAYS_TO_EXPIRY,
                RuleCondition::MaxDaysToExpiry as fn(i64) -> RuleCondition,
            ),
            (KEY_MIN_ANNUAL_COST, RuleCondition::MinAnnualCost),
        ] {
            if let Some(raw) = object.get(field) {
                match raw.as_i64() {
                    Some(threshold) => conditions.push(build(threshold)),
                    None => defects.push(RuleDefect::MalformedCondition {
                        field,
                        value: raw.to_string(),
                    }),
                }
            }
        }

        Self {
            reason,
            conditions,
            defects,
        }
    }

    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    pub fn conditions(&self) -> &[RuleCondition] {
        &self.conditions
    }

    pub fn defects(&self) -> &[RuleDefect] {
        &self.defects
    }

    pub fn is_valid(&self) -> bool {
        self.reason.is_some() && self.defects.is_empty()
    }

    /// True when the rule is valid and every present condition holds. A rule
    /// without conditions matches every contract.
    pub fn matches(&self, snapshot: &ContractSnapshot<'_>) -> bool {
        self.is_valid()
            && self
                .conditions
                .iter()
                .all(|condition| condition.holds(snapshot))
    }

    fn rank(&self, priority: &PriorityList) -> Rank {
        self.reason
            .as_ref()
            .map(|reason| priority.rank(reason.as_str()))
            .unwrap_or(Rank::Unlisted)
    }
}

#[derive(Debug, Deserialize)]
struct RulesDocument {
    #[serde(default)]
    rules: Option<Vec<Value>>,
    #[serde(default)]
    priority: Option<Vec<Value>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RulesLoadError {
    #[error("failed to read rules configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rules configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rules ordered by the priority of their reasons, highest first.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    priority: PriorityList,
}

impl RuleSet {
    /// Orders `rules` by reason priority. Rules whose reason is unlisted (or
    /// missing) follow every listed one and keep their input order.
    pub fn new(mut rules: Vec<Rule>, priority: PriorityList) -> Self {
        rules.sort_by_key(|rule| rule.rank(&priority));
        Self { rules, priority }
    }

    pub fn load(path: &Path) -> Result<Self, RulesLoadError> {
        let file = std::fs::File::open(path).map_err(|source| RulesLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulesLoadError> {
        let document: RulesDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_document(document))
    }

    pub fn from_json(value: Value) -> Result<Self, RulesLoadError> {
        let document: RulesDocument = serde_json::from_value(value)?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: RulesDocument) -> Self {
        let priority = PriorityList::from_values(&document.priority.unwrap_or_default());
        let rules = document
            .rules
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                let rule = Rule::from_value(raw);
                for defect in rule.defects() {
                    warn!(rule = position, %defect, "rule will never match");
                }
                rule
            })
            .collect();

        Self::new(rules, priority)
    }

    /// Reason of the first matching rule in priority order, which is the
    /// highest-priority reason any rule assigns to this contract.
    pub fn find_top_reason(&self, snapshot: &ContractSnapshot<'_>) -> Option<&Reason> {
        self.rules
            .iter()
            .find(|rule| rule.matches(snapshot))
            .and_then(Rule::reason)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn priority(&self) -> &PriorityList {
        &self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::renewal::domain::{Contract, ContractId, NEVER_EXPIRES};
    use serde_json::json;

    fn contract(cost: f64) -> Contract {
        Contract {
            id: ContractId::from(1),
            software_name: "Atlas".to_string(),
            owner: "Ops".to_string(),
            organization: "Acme".to_string(),
            annual_cost_eur: cost,
            renewal_date: None,
        }
    }

    fn snapshot(contract: &Contract, days_to_expiry: i64) -> ContractSnapshot<'_> {
        ContractSnapshot {
            contract,
            days_to_expiry,
        }
    }

    fn reasons(set: &RuleSet) -> Vec<&str> {
        set.rules()
            .iter()
            .map(|rule| rule.reason().map(Reason::as_str).unwrap_or("-"))
            .collect()
    }

    #[test]
    fn sorts_by_priority_and_keeps_unlisted_order_stable() {
        let set = RuleSet::from_json(json!({
            "rules": [
                {"reason": "zeta", "days_to_expiry": 90},
                {"reason": "warn", "days_to_expiry": 30},
                {"reason": "alpha", "days_to_expiry": 60},
                {"reason": "critical", "days_to_expiry": 7},
                {"reason": "beta"}
            ],
            "priority": ["critical", "warn"]
        }))
        .expect("rules load");

        assert_eq!(reasons(&set), vec!["critical", "warn", "zeta", "alpha", "beta"]);
    }

    #[test]
    fn first_matching_rule_wins() {
        let set = RuleSet::from_json(json!({
            "rules": [
                {"reason": "warn", "days_to_expiry": 30},
                {"reason": "critical", "days_to_expiry": 7}
            ],
            "priority": ["critical", "warn"]
        }))
        .expect("rules load");
        let contract = contract(100.0);

        let top = set.find_top_reason(&snapshot(&contract, 5));
        assert_eq!(top.map(Reason::as_str), Some("critical"));

        let top = set.find_top_reason(&snapshot(&contract, 20));
        assert_eq!(top.map(Reason::as_str), Some("warn"));

        assert!(set.find_top_reason(&snapshot(&contract, 31)).is_none());
    }

    #[test]
    fn conditions_are_conjunctive_with_inclusive_bounds() {
        let set = RuleSet::new(
            vec![Rule::new(
                Reason::new("expensive").expect("reason"),
                vec![
                    RuleCondition::MaxDaysToExpiry(30),
                    RuleCondition::MinAnnualCost(5000),
                ],
            )],
            ["expensive"].into_iter().collect(),
        );

        let cheap = contract(4999.99);
        let pricey = contract(5000.0);
        assert!(set.find_top_reason(&snapshot(&cheap, 10)).is_none());
        assert!(set.find_top_reason(&snapshot(&pricey, 30)).is_some());
        assert!(set.find_top_reason(&snapshot(&pricey, 31)).is_none());
    }

    #[test]
    fn cost_only_rule_matches_non_expiring_contract() {
        let set = RuleSet::from_json(json!({
            "rules": [
                {"reason": "critical", "days_to_expiry": 7},
                {"reason": "budget", "min_annual_cost": 10000}
            ],
            "priority": ["critical", "budget"]
        }))
        .expect("rules load");
        let contract = contract(25000.0);

        let top = set.find_top_reason(&snapshot(&contract, NEVER_EXPIRES));
        assert_eq!(top.map(Reason::as_str), Some("budget"));
    }

    #[test]
    fn malformed_rules_are_skipped_not_fatal() {
        let set = RuleSet::from_json(json!({
            "rules": [
                {"reason": "critical", "days_to_expiry": "seven"},
                {"reason": "urgent", "days_to_expiry": 7.5},
                {"days_to_expiry": 90},
                {"reason": "", "days_to_expiry": 90},
                {"reason": 12},
                "not-a-rule",
                {"reason": "warn", "days_to_expiry": 30}
            ],
            "priority": ["critical", "urgent", "warn"]
        }))
        .expect("rules load");
        let contract = contract(0.0);

        let defective = set.rules().iter().filter(|rule| !rule.is_valid()).count();
        assert_eq!(defective, 6);
        assert!(matches!(
            set.rules()[0].defects(),
            [RuleDefect::MalformedCondition { field: "days_to_expiry", .. }]
        ));

        let top = set.find_top_reason(&snapshot(&contract, 3));
        assert_eq!(top.map(Reason::as_str), Some("warn"));
    }

    #[test]
    fn missing_sections_load_as_empty() {
        let set = RuleSet::from_json(json!({})).expect("empty document loads");
        let contract = contract(0.0);
        assert!(set.rules().is_empty());
        assert!(set.priority().is_empty());
        assert!(set.find_top_reason(&snapshot(&contract, 0)).is_none());
    }

    #[test]
    fn null_sections_load_as_empty() {
        let set = RuleSet::from_json(json!({
            "rules": [{"reason": "always"}],
            "priority": null
        }))
        .expect("null priority loads");
        let contract = contract(0.0);
        assert!(set.priority().is_empty());
        let top = set.find_top_reason(&snapshot(&contract, 0));
        assert_eq!(top.map(Reason::as_str), Some("always"));

        let set = RuleSet::from_json(json!({"rules": null, "priority": ["critical"]}))
            .expect("null rules load");
        assert!(set.rules().is_empty());
        assert_eq!(set.priority().len(), 1);
    }

    #[test]
    fn whitespace_reason_is_a_valid_label() {
        let set = RuleSet::from_json(json!({
            "rules": [{"reason": " ", "days_to_expiry": 30}],
            "priority": [" "]
        }))
        .expect("rules load");
        let contract = contract(0.0);

        assert!(set.rules()[0].defects().is_empty());
        assert_eq!(
            set.rules()[0].conditions(),
            &[RuleCondition::MaxDaysToExpiry(30)]
        );
        let top = set.find_top_reason(&snapshot(&contract, 5));
        assert_eq!(top.map(Reason::as_str), Some(" "));
    }

    #[test]
    fn rule_without_conditions_matches_everything() {
        let set = RuleSet::from_json(json!({
            "rules": [{"reason": "always"}],
            "priority": []
        }))
        .expect("rules load");
        let contract = contract(0.0);
        let top = set.find_top_reason(&snapshot(&contract, NEVER_EXPIRES));
        assert_eq!(top.map(Reason::as_str), Some("always"));
    }
}
