use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Pharmacy,
    Supervisor,
    Practitioner,
    Patient,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Pharmacy => "pharmacy",
            Role::Supervisor => "supervisor",
            Role::Practitioner => "practitioner",
            Role::Patient => "patient",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "administrator" => Some(Role::Administrator),
            "pharmacy" => Some(Role::Pharmacy),
            "supervisor" => Some(Role::Supervisor),
            "practitioner" => Some(Role::Practitioner),
            "patient" => Some(Role::Patient),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
}

impl PersonName {
    pub fn full(&self) -> String {
        match self.middle.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(middle) => format!("{} {} {}", self.first, middle, self.last),
            None => format!("{} {}", self.first, self.last),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Assigned,
}

impl AssignmentStatus {
    pub fn from_flag(assigned: bool) -> Self {
        if assigned {
            AssignmentStatus::Assigned
        } else {
            AssignmentStatus::Pending
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "Pending",
            AssignmentStatus::Assigned => "Assigned",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "red",
            AssignmentStatus::Assigned => "green",
        }
    }

    // Assigned is terminal; the row action must not render for it.
    pub fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Assigned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Complete,
}

impl PaymentStatus {
    pub fn from_flag(payment_complete: bool) -> Self {
        if payment_complete {
            PaymentStatus::Complete
        } else {
            PaymentStatus::Pending
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Complete => "Complete",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "red",
            PaymentStatus::Complete => "green",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveStatus {
    Inactive,
    Active,
}

impl ActiveStatus {
    pub fn from_flag(active: bool) -> Self {
        if active {
            ActiveStatus::Active
        } else {
            ActiveStatus::Inactive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActiveStatus::Inactive => "Inactive",
            ActiveStatus::Active => "Active",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ActiveStatus::Inactive => "red",
            ActiveStatus::Active => "green",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionRow {
    pub prescription_id: i64,
    pub practitioner_id: i64,
    pub practitioner: PersonName,
    pub patient_id: i64,
    pub patient: PersonName,
    pub supply_item_id: i64,
    pub tradename: String,
    pub quantity: i32,
    pub frequency: String,
    pub assignment: AssignmentStatus,
    pub date_created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractHeader {
    pub contract_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pharmacy_id: i64,
    pub pharmacy_title: String,
    pub pharmaceutical_id: i64,
    pub pharmaceutical_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSupplyTotals {
    pub contract_supply_id: i64,
    pub cost_cents: i64,
    pub selling_cents: i64,
    pub payment: PaymentStatus,
    pub date_created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ContractSupplyTotals {
    pub fn profit_cents(&self) -> i64 {
        self.selling_cents - self.cost_cents
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorRow {
    pub supervisor_id: i64,
    pub name: PersonName,
    pub email_address: String,
    pub phone_number: String,
    pub status: ActiveStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trips_every_variant() {
        for role in [
            Role::Administrator,
            Role::Pharmacy,
            Role::Supervisor,
            Role::Practitioner,
            Role::Patient,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("pharmaceutical"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn person_name_skips_missing_middle_name() {
        let with_middle = PersonName {
            first: "Jane".to_string(),
            middle: Some("Q".to_string()),
            last: "Doe".to_string(),
        };
        assert_eq!(with_middle.full(), "Jane Q Doe");

        let without_middle = PersonName {
            first: "Jane".to_string(),
            middle: None,
            last: "Doe".to_string(),
        };
        assert_eq!(without_middle.full(), "Jane Doe");

        let blank_middle = PersonName {
            first: "Jane".to_string(),
            middle: Some("  ".to_string()),
            last: "Doe".to_string(),
        };
        assert_eq!(blank_middle.full(), "Jane Doe");
    }

    #[test]
    fn payment_status_is_a_two_way_mapping() {
        assert_eq!(PaymentStatus::from_flag(true).label(), "Complete");
        assert_eq!(PaymentStatus::from_flag(true).color(), "green");
        assert_eq!(PaymentStatus::from_flag(false).label(), "Pending");
        assert_eq!(PaymentStatus::from_flag(false).color(), "red");
    }

    #[test]
    fn assignment_status_disables_action_only_when_assigned() {
        assert!(AssignmentStatus::from_flag(true).is_terminal());
        assert!(!AssignmentStatus::from_flag(false).is_terminal());
        assert_eq!(AssignmentStatus::from_flag(true).label(), "Assigned");
        assert_eq!(AssignmentStatus::from_flag(false).label(), "Pending");
    }

    #[test]
    fn active_status_maps_both_flags() {
        assert_eq!(ActiveStatus::from_flag(true).label(), "Active");
        assert_eq!(ActiveStatus::from_flag(false).label(), "Inactive");
    }

    #[test]
    fn profit_is_selling_minus_cost() {
        let totals = ContractSupplyTotals {
            contract_supply_id: 1,
            cost_cents: 125_00,
            selling_cents: 100_00,
            payment: PaymentStatus::Pending,
            date_created: DateTime::<Utc>::UNIX_EPOCH,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert_eq!(totals.profit_cents(), -25_00);
    }
}
