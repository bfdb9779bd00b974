//! User-facing failure messages
//!
//! Every failure leaving the service boundary is one of these, rendered in
//! the configured language. Raw store errors are only logged.

use crate::domain::{DomainError, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    CreateUser,
    GetUser,
    UpdateUser,
    UserNotFound,
    CreateHousehold,
    GetHousehold,
    ListHouseholds,
    UpdateHousehold,
    HouseholdNotFound,
    RemoveOwner,
    CreateItem,
    GetItem,
    ListItems,
    UpdateItem,
    DeleteItem,
    SearchItems,
    ItemNotFound,
    CreateLocation,
    GetLocation,
    ListLocations,
    ListChildLocations,
    UpdateLocation,
    DeleteLocation,
    LocationNotFound,
    LocationHasChildren,
    LocationCycle,
    CreateCategory,
    GetCategory,
    ListCategories,
    UpdateCategory,
    DeleteCategory,
    CategoryNotFound,
    CreateProject,
    GetProject,
    ListProjects,
    UpdateProject,
    DeleteProject,
    ProjectNotFound,
    CreateLoan,
    GetLoan,
    ListLoans,
    UpdateLoan,
    ReturnLoan,
    DeleteLoan,
    ListOverdueLoans,
    LoanNotFound,
    SeedDemoData,
    InvalidQuery,
}

impl Failure {
    fn norwegian(self) -> &'static str {
        use Failure::*;
        match self {
            CreateUser => "Kunne ikke opprette bruker",
            GetUser => "Kunne ikke hente bruker",
            UpdateUser => "Kunne ikke oppdatere bruker",
            UserNotFound => "Bruker ikke funnet",
            CreateHousehold => "Kunne ikke opprette husholdning",
            GetHousehold => "Kunne ikke hente husholdning",
            ListHouseholds => "Kunne ikke hente husholdninger",
            UpdateHousehold => "Kunne ikke oppdatere husholdning",
            HouseholdNotFound => "Husholdning ikke funnet",
            RemoveOwner => "Eieren kan ikke fjernes fra husholdningen",
            CreateItem => "Kunne ikke opprette gjenstand",
            GetItem => "Kunne ikke hente gjenstand",
            ListItems => "Kunne ikke hente gjenstander",
            UpdateItem => "Kunne ikke oppdatere gjenstand",
            DeleteItem => "Kunne ikke slette gjenstand",
            SearchItems => "Kunne ikke søke i gjenstander",
            ItemNotFound => "Gjenstand ikke funnet",
            CreateLocation => "Kunne ikke opprette lokasjon",
            GetLocation => "Kunne ikke hente lokasjon",
            ListLocations => "Kunne ikke hente lokasjoner",
            ListChildLocations => "Kunne ikke hente underlokasjoner",
            UpdateLocation => "Kunne ikke oppdatere lokasjon",
            DeleteLocation => "Kunne ikke slette lokasjon",
            LocationNotFound => "Lokasjon ikke funnet",
            LocationHasChildren => "Kan ikke slette lokasjon med underlokasjoner",
            LocationCycle => "En lokasjon kan ikke flyttes inn i seg selv",
            CreateCategory => "Kunne ikke opprette kategori",
            GetCategory => "Kunne ikke hente kategori",
            ListCategories => "Kunne ikke hente kategorier",
            UpdateCategory => "Kunne ikke oppdatere kategori",
            DeleteCategory => "Kunne ikke slette kategori",
            CategoryNotFound => "Kategori ikke funnet",
            CreateProject => "Kunne ikke opprette prosjekt",
            GetProject => "Kunne ikke hente prosjekt",
            ListProjects => "Kunne ikke hente prosjekter",
            UpdateProject => "Kunne ikke oppdatere prosjekt",
            DeleteProject => "Kunne ikke slette prosjekt",
            ProjectNotFound => "Prosjekt ikke funnet",
            CreateLoan => "Kunne ikke opprette utlån",
            GetLoan => "Kunne ikke hente utlån",
            ListLoans => "Kunne ikke hente utlån",
            UpdateLoan => "Kunne ikke oppdatere utlån",
            ReturnLoan => "Kunne ikke markere utlån som returnert",
            DeleteLoan => "Kunne ikke slette utlån",
            ListOverdueLoans => "Kunne ikke hente forfalte utlån",
            LoanNotFound => "Utlån ikke funnet",
            SeedDemoData => "Kunne ikke opprette demodata",
            InvalidQuery => "Ugyldig søk",
        }
    }

    fn english(self) -> &'static str {
        use Failure::*;
        match self {
            CreateUser => "Could not create user",
            GetUser => "Could not load user",
            UpdateUser => "Could not update user",
            UserNotFound => "User not found",
            CreateHousehold => "Could not create household",
            GetHousehold => "Could not load household",
            ListHouseholds => "Could not load households",
            UpdateHousehold => "Could not update household",
            HouseholdNotFound => "Household not found",
            RemoveOwner => "The owner cannot be removed from the household",
            CreateItem => "Could not create item",
            GetItem => "Could not load item",
            ListItems => "Could not load items",
            UpdateItem => "Could not update item",
            DeleteItem => "Could not delete item",
            SearchItems => "Could not search items",
            ItemNotFound => "Item not found",
            CreateLocation => "Could not create location",
            GetLocation => "Could not load location",
            ListLocations => "Could not load locations",
            ListChildLocations => "Could not load sub-locations",
            UpdateLocation => "Could not update location",
            DeleteLocation => "Could not delete location",
            LocationNotFound => "Location not found",
            LocationHasChildren => "Cannot delete a location that has sub-locations",
            LocationCycle => "A location cannot be moved inside itself",
            CreateCategory => "Could not create category",
            GetCategory => "Could not load category",
            ListCategories => "Could not load categories",
            UpdateCategory => "Could not update category",
            DeleteCategory => "Could not delete category",
            CategoryNotFound => "Category not found",
            CreateProject => "Could not create project",
            GetProject => "Could not load project",
            ListProjects => "Could not load projects",
            UpdateProject => "Could not update project",
            DeleteProject => "Could not delete project",
            ProjectNotFound => "Project not found",
            CreateLoan => "Could not create loan",
            GetLoan => "Could not load loan",
            ListLoans => "Could not load loans",
            UpdateLoan => "Could not update loan",
            ReturnLoan => "Could not mark loan as returned",
            DeleteLoan => "Could not delete loan",
            ListOverdueLoans => "Could not load overdue loans",
            LoanNotFound => "Loan not found",
            SeedDemoData => "Could not create demo data",
            InvalidQuery => "Invalid query",
        }
    }

    /// Message text; Swedish and Danish fall back to English
    pub fn text(self, language: Language) -> &'static str {
        match language {
            Language::NbNo => self.norwegian(),
            _ => self.english(),
        }
    }
}

/// Renders failures for one language and logs the underlying cause
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    language: Language,
}

impl Messages {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self, failure: Failure) -> String {
        failure.text(self.language).to_string()
    }

    /// Log the domain error and return the user-facing message
    pub fn fail(&self, failure: Failure, err: DomainError) -> String {
        match &err {
            DomainError::NotFound(_) | DomainError::InvalidInput(_) => {
                log::warn!("{:?}: {}", failure, err)
            }
            _ => log::error!("{:?}: {}", failure, err),
        }
        self.text(failure)
    }

    /// Like `fail`, but a missing document yields the not-found message
    pub fn fail_lookup(&self, failure: Failure, not_found: Failure, err: DomainError) -> String {
        match err {
            DomainError::NotFound(_) => self.fail(not_found, err),
            err => self.fail(failure, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_follow_language() {
        let nb = Messages::new(Language::NbNo);
        let en = Messages::new(Language::EnUs);
        assert_eq!(nb.text(Failure::ItemNotFound), "Gjenstand ikke funnet");
        assert_eq!(en.text(Failure::ItemNotFound), "Item not found");
        assert_eq!(
            Failure::LocationHasChildren.text(Language::SvSe),
            "Cannot delete a location that has sub-locations"
        );
    }

    #[test]
    fn test_fail_hides_raw_error() {
        let en = Messages::new(Language::EnUs);
        let msg = en.fail(
            Failure::UpdateItem,
            DomainError::Internal("sqlite: disk I/O error".into()),
        );
        assert_eq!(msg, "Could not update item");
        assert!(!msg.contains("sqlite"));
    }
}
