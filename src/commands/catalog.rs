//! Category, Project and Loan Commands

use hms_backend::domain::now_ms;

use super::{ClientResult, InventoryClient};
use crate::models::{
    Category, Loan, LoanStatus, NewCategory, NewLoan, NewProject, Project, ProjectStatus,
};
use crate::query::{EntityKind, QueryKey, QueryPrefix};
use crate::validation::validate_new_category;

impl InventoryClient {
    // ========================
    // Categories
    // ========================

    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        let hid = self.household_id()?;
        let key = QueryKey::list(EntityKind::Categories, &hid);
        let stale_time = self.queries.config().stale_time();
        let categories = self
            .queries
            .fetch(&key, stale_time, || self.services.categories.get_categories(&hid))
            .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, data: NewCategory) -> ClientResult<Category> {
        validate_new_category(&data, self.language)?;
        let hid = self.household_id()?;
        let prefix = QueryPrefix::new(EntityKind::Categories, &hid);
        let category = self
            .mutations
            .commit(&prefix, || self.services.categories.create_category(&hid, data))
            .await?;
        Ok(category)
    }

    // ========================
    // Projects
    // ========================

    pub async fn list_projects(&self, status: Option<ProjectStatus>) -> ClientResult<Vec<Project>> {
        let hid = self.household_id()?;
        let key = QueryKey::filtered(EntityKind::Projects, &hid, &status);
        let stale_time = self.queries.config().stale_time();
        let projects = self
            .queries
            .fetch(&key, stale_time, || self.services.projects.get_projects(&hid, status))
            .await?;
        Ok(projects)
    }

    pub async fn create_project(&self, data: NewProject) -> ClientResult<Project> {
        let uid = self.user_id()?;
        let hid = self.household_id()?;
        let prefix = QueryPrefix::new(EntityKind::Projects, &hid);
        let project = self
            .mutations
            .commit(&prefix, || self.services.projects.create_project(&hid, &uid, data))
            .await?;
        Ok(project)
    }

    // ========================
    // Loans
    // ========================

    pub async fn list_loans(&self, status: Option<LoanStatus>) -> ClientResult<Vec<Loan>> {
        let hid = self.household_id()?;
        let key = QueryKey::filtered(EntityKind::Loans, &hid, &status);
        let stale_time = self.queries.config().stale_time();
        let loans = self
            .queries
            .fetch(&key, stale_time, || self.services.loans.get_loans(&hid, status))
            .await?;
        Ok(loans)
    }

    /// Active loans past their due date, as of now
    pub async fn overdue_loans(&self) -> ClientResult<Vec<Loan>> {
        let hid = self.household_id()?;
        Ok(self.services.loans.get_overdue_loans(&hid, now_ms()).await?)
    }

    pub async fn create_loan(&self, data: NewLoan) -> ClientResult<Loan> {
        let uid = self.user_id()?;
        let hid = self.household_id()?;
        let prefix = QueryPrefix::new(EntityKind::Loans, &hid);
        let loan = self
            .mutations
            .commit(&prefix, || self.services.loans.create_loan(&hid, &uid, data))
            .await?;
        self.invalidate_stats(&hid);
        Ok(loan)
    }

    pub async fn return_loan(&self, loan_id: &str) -> ClientResult<Loan> {
        let hid = self.household_id()?;
        let prefix = QueryPrefix::new(EntityKind::Loans, &hid);
        let loan = self
            .mutations
            .commit(&prefix, || self.services.loans.return_loan(&hid, loan_id))
            .await?;
        self.invalidate_stats(&hid);
        Ok(loan)
    }
}
