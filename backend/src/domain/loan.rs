//! Loan Entity
//!
//! Tracks items lent out to someone outside the household.

use serde::{Deserialize, Serialize};

use super::document::Collection;
use super::entity::{Entity, HouseholdScoped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanContact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub household_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    pub loaned_to: LoanContact,
    pub loan_date: i64,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub returned_date: Option<i64>,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub reminder_sent: bool,
    pub created_by: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Loan {
    /// Active loan whose due date has passed
    pub fn is_overdue_at(&self, now_ms: i64) -> bool {
        self.status == LoanStatus::Active && matches!(self.due_date, Some(due) if due < now_ms)
    }
}

impl Entity for Loan {
    const COLLECTION: Collection = Collection::Loans;

    fn id(&self) -> &str {
        &self.id
    }
}

impl HouseholdScoped for Loan {
    fn household_id(&self) -> &str {
        &self.household_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    pub loaned_to: LoanContact,
    pub loan_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_sent: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_only_when_active_and_past_due() {
        let mut loan = Loan {
            id: "l1".into(),
            household_id: "h1".into(),
            item_id: "i1".into(),
            item_name: "Drill".into(),
            quantity: 1,
            unit: "stk".into(),
            loaned_to: LoanContact {
                name: "Kari".into(),
                ..Default::default()
            },
            loan_date: 0,
            due_date: Some(1_000),
            returned_date: None,
            status: LoanStatus::Active,
            notes: None,
            reminder_sent: false,
            created_by: "u1".into(),
            created_at: 0,
            updated_at: 0,
        };
        assert!(loan.is_overdue_at(2_000));
        assert!(!loan.is_overdue_at(500));

        loan.status = LoanStatus::Returned;
        assert!(!loan.is_overdue_at(2_000));

        loan.status = LoanStatus::Active;
        loan.due_date = None;
        assert!(!loan.is_overdue_at(2_000));
    }
}
