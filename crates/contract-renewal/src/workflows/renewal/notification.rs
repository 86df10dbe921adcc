use super::domain::{Contract, ContractId};
use super::priority::Reason;
use serde::Serialize;
use std::fmt;

/// One alert produced by a check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub contract_id: ContractId,
    pub software_name: String,
    pub organization: String,
    pub annual_cost: i64,
    pub renewal_date: String,
    pub reason: Reason,
}

impl Notification {
    pub fn new(contract: &Contract, reason: Reason) -> Self {
        Self {
            contract_id: contract.id.clone(),
            software_name: contract.software_name.clone(),
            organization: contract.organization.clone(),
            annual_cost: contract.annual_cost(),
            renewal_date: contract.renewal_date_label().to_string(),
            reason,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Software: {}, Organization: {}, Annual Cost: {}, Renewal Date: {}, Reason: {}",
            self.software_name, self.organization, self.annual_cost, self.renewal_date, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_single_output_line() {
        let contract = Contract {
            id: ContractId::from(3),
            software_name: "Atlas".to_string(),
            owner: "Ops".to_string(),
            organization: "Acme".to_string(),
            annual_cost_eur: 12_500.75,
            renewal_date: Some("2025-08-09".to_string()),
        };
        let notification = Notification::new(&contract, Reason::new("critical").expect("reason"));

        assert_eq!(
            notification.to_string(),
            "Software: Atlas, Organization: Acme, Annual Cost: 12500, Renewal Date: 2025-08-09, Reason: critical"
        );
    }
}
