//! Loan Service
//!
//! Loans start `active`, become `returned` through `return_loan`. Overdue
//! is derived from the due date rather than stored.

use std::sync::Arc;

use crate::domain::{now_ms, Direction, ListQuery, Loan, LoanPatch, LoanStatus, NewLoan};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

impl LoanService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    fn repo(&self, household_id: &str) -> Repository<Loan> {
        Repository::in_household(self.store.clone(), household_id)
    }

    pub async fn create_loan(
        &self,
        household_id: &str,
        user_id: &str,
        data: NewLoan,
    ) -> Result<Loan, String> {
        let repo = self.repo(household_id);
        let loan = Loan {
            id: repo.new_id(),
            household_id: household_id.to_string(),
            item_id: data.item_id,
            item_name: data.item_name,
            quantity: data.quantity,
            unit: data.unit,
            loaned_to: data.loaned_to,
            loan_date: data.loan_date,
            due_date: data.due_date,
            returned_date: None,
            status: LoanStatus::Active,
            notes: data.notes,
            reminder_sent: false,
            created_by: user_id.to_string(),
            created_at: 0,
            updated_at: 0,
        };
        repo.create(&loan)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateLoan, e))
    }

    pub async fn get_loan(&self, household_id: &str, loan_id: &str) -> Result<Loan, String> {
        self.repo(household_id)
            .find_by_id(loan_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetLoan, e))?
            .ok_or_else(|| self.messages.text(Failure::LoanNotFound))
    }

    /// Loans by loan date (newest first), optionally restricted to one status
    pub async fn get_loans(
        &self,
        household_id: &str,
        status: Option<LoanStatus>,
    ) -> Result<Vec<Loan>, String> {
        let mut query = ListQuery::new().order_by("loan_date", Direction::Desc);
        if let Some(status) = status {
            query = query.filter("status", status.as_str());
        }
        self.repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::ListLoans, e))
    }

    pub async fn update_loan(
        &self,
        household_id: &str,
        loan_id: &str,
        patch: &LoanPatch,
    ) -> Result<Loan, String> {
        self.repo(household_id)
            .update(loan_id, patch)
            .await
            .map_err(|e| {
                self.messages
                    .fail_lookup(Failure::UpdateLoan, Failure::LoanNotFound, e)
            })
    }

    pub async fn return_loan(&self, household_id: &str, loan_id: &str) -> Result<Loan, String> {
        let patch = serde_json::json!({
            "status": LoanStatus::Returned,
            "returned_date": now_ms(),
        });
        let loan = self
            .repo(household_id)
            .update(loan_id, &patch)
            .await
            .map_err(|e| {
                self.messages
                    .fail_lookup(Failure::ReturnLoan, Failure::LoanNotFound, e)
            })?;
        log::info!("loan {} returned", loan_id);
        Ok(loan)
    }

    pub async fn delete_loan(&self, household_id: &str, loan_id: &str) -> Result<(), String> {
        self.repo(household_id)
            .delete(loan_id)
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteLoan, e))
    }

    /// Active loans whose due date lies before `now`
    pub async fn get_overdue_loans(&self, household_id: &str, now: i64) -> Result<Vec<Loan>, String> {
        let query = ListQuery::new()
            .filter("status", LoanStatus::Active.as_str())
            .order_by("due_date", Direction::Asc);
        let loans = self
            .repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::ListOverdueLoans, e))?;
        Ok(loans.into_iter().filter(|l| l.is_overdue_at(now)).collect())
    }
}
