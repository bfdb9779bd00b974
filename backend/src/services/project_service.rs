//! Project Service

use std::sync::Arc;

use crate::domain::{Direction, ListQuery, NewProject, Project, ProjectPatch, ProjectStatus};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

impl ProjectService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    fn repo(&self, household_id: &str) -> Repository<Project> {
        Repository::in_household(self.store.clone(), household_id)
    }

    pub async fn create_project(
        &self,
        household_id: &str,
        user_id: &str,
        data: NewProject,
    ) -> Result<Project, String> {
        let repo = self.repo(household_id);
        let project = Project {
            id: repo.new_id(),
            household_id: household_id.to_string(),
            name: data.name,
            description: data.description,
            status: data.status,
            priority: data.priority,
            start_date: data.start_date,
            deadline: data.deadline,
            completed_at: None,
            budget: data.budget,
            actual_cost: None,
            materials: data.materials,
            tasks: data.tasks,
            notes: data.notes,
            created_by: user_id.to_string(),
            created_at: 0,
            updated_at: 0,
        };
        repo.create(&project)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateProject, e))
    }

    pub async fn get_project(
        &self,
        household_id: &str,
        project_id: &str,
    ) -> Result<Project, String> {
        self.repo(household_id)
            .find_by_id(project_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetProject, e))?
            .ok_or_else(|| self.messages.text(Failure::ProjectNotFound))
    }

    /// Projects newest first, optionally restricted to one status
    pub async fn get_projects(
        &self,
        household_id: &str,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, String> {
        let mut query = ListQuery::new().order_by("created_at", Direction::Desc);
        if let Some(status) = status {
            query = query.filter("status", status.as_str());
        }
        self.repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::ListProjects, e))
    }

    pub async fn update_project(
        &self,
        household_id: &str,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> Result<Project, String> {
        self.repo(household_id)
            .update(project_id, patch)
            .await
            .map_err(|e| {
                self.messages
                    .fail_lookup(Failure::UpdateProject, Failure::ProjectNotFound, e)
            })
    }

    pub async fn delete_project(&self, household_id: &str, project_id: &str) -> Result<(), String> {
        self.repo(household_id)
            .delete(project_id)
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteProject, e))
    }
}
