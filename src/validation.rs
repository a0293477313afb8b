//! Form validation.
//!
//! Errors are collected per field into [`FieldErrors`] so a form can be
//! re-rendered with a message next to each offending input.

use crate::model::{Owner, Pet, Visit};
use chrono::NaiveDate;

pub const REQUIRED: &str = "required";
pub const NOT_BLANK: &str = "must not be blank";
pub const TELEPHONE_DIGITS: &str = "numeric value out of bounds (<10 digits>.<0 digits> expected)";
pub const ALREADY_EXISTS: &str = "already exists";
pub const INVALID_DATE: &str = "invalid date";

const TELEPHONE_MAX_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

/// Field errors in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// First error raised for `field`.
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_error(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

fn not_blank(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if !has_text(value) {
        errors.reject(field, "NotBlank", NOT_BLANK);
    }
}

/// Required fields of a pet form.
pub struct PetValidator;

impl PetValidator {
    pub fn validate(&self, pet: &Pet, errors: &mut FieldErrors) {
        if !has_text(&pet.name) {
            errors.reject("name", REQUIRED, REQUIRED);
        }
        // Stored pets keep their type even when the form omits it.
        if pet.is_new() && pet.pet_type.is_none() {
            errors.reject("type", REQUIRED, REQUIRED);
        }
        if pet.birth_date.is_none() {
            errors.reject("birthDate", REQUIRED, REQUIRED);
        }
    }
}

/// Name clash and birth date checks done when a pet form is submitted.
///
/// `owner` is the stored owner the pet belongs to; `pet.id` is `None` when
/// creating.
pub fn check_pet_against_owner(owner: &Owner, pet: &Pet, today: NaiveDate, errors: &mut FieldErrors) {
    if has_text(&pet.name) {
        let clash = if pet.is_new() {
            owner.pet_by_name(&pet.name, true).is_some()
        } else {
            owner
                .pet_by_name(&pet.name, false)
                .is_some_and(|existing| existing.id != pet.id)
        };
        if clash {
            errors.reject("name", "duplicate", ALREADY_EXISTS);
        }
    }

    if pet.birth_date.is_some_and(|born| born > today) {
        errors.reject("birthDate", "typeMismatch", INVALID_DATE);
    }
}

/// Up to ten ASCII digits and nothing else, surrounding spaces included.
fn is_valid_telephone(telephone: &str) -> bool {
    !telephone.is_empty()
        && telephone.len() <= TELEPHONE_MAX_DIGITS
        && telephone.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_owner(owner: &Owner) -> FieldErrors {
    let mut errors = FieldErrors::new();
    not_blank(&mut errors, "firstName", &owner.first_name);
    not_blank(&mut errors, "lastName", &owner.last_name);
    not_blank(&mut errors, "address", &owner.address);
    not_blank(&mut errors, "city", &owner.city);
    if !has_text(&owner.telephone) {
        errors.reject("telephone", "NotBlank", NOT_BLANK);
    } else if !is_valid_telephone(&owner.telephone) {
        errors.reject("telephone", "Digits", TELEPHONE_DIGITS);
    }
    errors
}

pub fn validate_visit(visit: &Visit) -> FieldErrors {
    let mut errors = FieldErrors::new();
    not_blank(&mut errors, "description", &visit.description);
    errors
}
