//! Form Validation
//!
//! Field-level checks run before any remote call. Errors are collected per
//! field so every problem can be shown at once.

use std::collections::BTreeMap;
use std::fmt;

use hms_backend::auth::{validate_email, validate_password, PasswordHint};

use crate::models::{ItemPatch, Language, NewCategory, NewHousehold, NewItem, NewLocation};

const ITEM_NAME_MAX: usize = 100;
const HOUSEHOLD_NAME_MIN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    NameRequired,
    NameTooLong,
    QuantityTooLow,
    QuantityNegative,
    HouseholdNameTooShort,
    InvalidEmail,
    PasswordTooShort,
    DisplayNameRequired,
}

impl Rule {
    fn message(self, language: Language) -> &'static str {
        let nb = language == Language::NbNo;
        match (self, nb) {
            (Rule::NameRequired, true) => "Navn er påkrevd",
            (Rule::NameRequired, false) => "Name is required",
            (Rule::NameTooLong, true) => "Navnet er for langt",
            (Rule::NameTooLong, false) => "The name is too long",
            (Rule::QuantityTooLow, true) => "Antall må være minst 1",
            (Rule::QuantityTooLow, false) => "Quantity must be at least 1",
            (Rule::QuantityNegative, true) => "Antall kan ikke være negativt",
            (Rule::QuantityNegative, false) => "Quantity cannot be negative",
            (Rule::HouseholdNameTooShort, true) => "Navn må være minst 2 tegn",
            (Rule::HouseholdNameTooShort, false) => "Name must be at least 2 characters",
            (Rule::InvalidEmail, true) => "Ugyldig e-postadresse",
            (Rule::InvalidEmail, false) => "Invalid email address",
            (Rule::PasswordTooShort, _) => PasswordHint::TooShort.message(language),
            (Rule::DisplayNameRequired, true) => "Visningsnavn er påkrevd",
            (Rule::DisplayNameRequired, false) => "Display name is required",
        }
    }
}

/// Messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    fn add(&mut self, field: &'static str, rule: Rule, language: Language) {
        self.fields
            .entry(field)
            .or_insert_with(|| rule.message(language).to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", joined.join(", "))
    }
}

fn check_required(errors: &mut FieldErrors, field: &'static str, value: &str, language: Language) {
    if value.trim().is_empty() {
        errors.add(field, Rule::NameRequired, language);
    }
}

fn check_item_name(errors: &mut FieldErrors, name: &str, language: Language) {
    check_required(errors, "name", name, language);
    if name.chars().count() > ITEM_NAME_MAX {
        errors.add("name", Rule::NameTooLong, language);
    }
}

pub fn validate_new_item(item: &NewItem, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    check_item_name(&mut errors, &item.name, language);
    if item.quantity < 1 {
        errors.add("quantity", Rule::QuantityTooLow, language);
    }
    errors.into_result()
}

/// Only the fields present in the patch are checked. Stock may be drawn
/// down to zero, so quantity only has to be non-negative here.
pub fn validate_item_patch(patch: &ItemPatch, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if let Some(name) = &patch.name {
        check_item_name(&mut errors, name, language);
    }
    if matches!(patch.quantity, Some(q) if q < 0) {
        errors.add("quantity", Rule::QuantityNegative, language);
    }
    errors.into_result()
}

pub fn validate_new_household(household: &NewHousehold, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if household.name.trim().chars().count() < HOUSEHOLD_NAME_MIN {
        errors.add("name", Rule::HouseholdNameTooShort, language);
    }
    errors.into_result()
}

pub fn validate_new_location(location: &NewLocation, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    check_required(&mut errors, "name", &location.name, language);
    errors.into_result()
}

pub fn validate_new_category(category: &NewCategory, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    check_required(&mut errors, "name", &category.name, language);
    errors.into_result()
}

pub fn validate_sign_in(email: &str, password: &str, language: Language) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !validate_email(email.trim()) {
        errors.add("email", Rule::InvalidEmail, language);
    }
    if !validate_password(password).valid {
        errors.add("password", Rule::PasswordTooShort, language);
    }
    errors.into_result()
}

pub fn validate_sign_up(
    email: &str,
    password: &str,
    display_name: &str,
    language: Language,
) -> Result<(), FieldErrors> {
    let mut errors = validate_sign_in(email, password, language)
        .err()
        .unwrap_or_default();
    if display_name.trim().is_empty() {
        errors.add("display_name", Rule::DisplayNameRequired, language);
    }
    errors.into_result()
}
