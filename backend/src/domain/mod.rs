//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies; entities cross the store
//! boundary as JSON documents.

mod category;
mod document;
mod entity;
mod household;
mod item;
mod loan;
mod location;
mod project;
mod user;

pub use category::{Category, CategoryPatch, CustomField, CustomFieldType, NewCategory};
pub use document::{
    compare_values, from_document, merge_fields, to_document, Collection, Direction, Document,
    FieldFilter, ListQuery, OrderBy, Scope,
};
pub use entity::{now_ms, DomainError, DomainResult, Entity, HouseholdScoped};
pub use household::{
    Household, HouseholdMember, HouseholdPatch, HouseholdRole, HouseholdSettings, NewHousehold,
};
pub use item::{Item, ItemListOptions, ItemOrderField, ItemPatch, NewItem, MAX_LIST_LIMIT};
pub use loan::{Loan, LoanContact, LoanPatch, LoanStatus, NewLoan};
pub use location::{compute_path, Location, LocationPatch, NewLocation};
pub use project::{
    NewProject, Project, ProjectMaterial, ProjectPatch, ProjectPriority, ProjectStatus,
    ProjectTask,
};
pub use user::{
    Currency, Language, NotificationSettings, SubscriptionTier, Theme, User, UserSettings,
    UserSettingsPatch,
};
