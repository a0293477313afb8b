//! Adding and editing an owner's pets.

use super::owners::load_owner;
use super::request::{Params, WebRequest};
use super::response::{Reply, WebResponse};
use super::router::Clinic;
use super::views::{self, PetFields};
use crate::error::ClinicError;
use crate::formatting::{parse_date, PetTypeFormatter};
use crate::model::{self, Owner, Pet};
use crate::validation::{check_pet_against_owner, FieldErrors, PetValidator, INVALID_DATE};

/// Copy submitted values onto `pet`.
///
/// Only fields present in the form are touched. An empty type keeps the
/// stored one, so it only matters for new pets. Conversion failures are
/// recorded as `typeMismatch` errors.
fn bind_pet(clinic: &Clinic, form: &Params, pet: &mut Pet, errors: &mut FieldErrors) -> Result<(), ClinicError> {
    if let Some(name) = form.get("name") {
        pet.name = name.to_string();
    }

    if let Some(raw) = form.get("birthDate") {
        pet.birth_date = if raw.trim().is_empty() {
            None
        } else {
            match parse_date(raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    log::debug!("rejecting birth date: {e}");
                    errors.reject("birthDate", "typeMismatch", INVALID_DATE);
                    None
                }
            }
        };
    }

    match form.get("type") {
        Some(name) if !name.is_empty() => match PetTypeFormatter::new(clinic.owners()).parse(name)? {
            Ok(pet_type) => pet.pet_type = Some(pet_type),
            Err(e) => errors.reject("type", "typeMismatch", e.to_string()),
        },
        _ => {}
    }
    Ok(())
}

fn render_form(
    clinic: &Clinic,
    owner: &Owner,
    pet: &Pet,
    submitted: Option<&Params>,
    errors: &FieldErrors,
) -> Result<Reply, ClinicError> {
    let types = clinic.owners().find_pet_types()?;
    let mut fields = PetFields::of(pet);
    if let Some(form) = submitted {
        // Echo what was typed, even when it did not convert.
        if let Some(name) = form.get("name") {
            fields.name = name.to_string();
        }
        if let Some(birth_date) = form.get("birthDate") {
            fields.birth_date = birth_date.to_string();
        }
    }
    Ok(WebResponse::html(views::pet_form(owner, pet.id, &fields, &types, errors)).into())
}

pub fn init_creation_form(clinic: &Clinic, owner_id: i32) -> Result<Reply, ClinicError> {
    let owner = load_owner(clinic, owner_id)?;
    render_form(clinic, &owner, &Pet::new(), None, &FieldErrors::new())
}

pub fn process_creation_form(clinic: &Clinic, req: &WebRequest, owner_id: i32) -> Result<Reply, ClinicError> {
    let mut owner = load_owner(clinic, owner_id)?;
    let mut pet = Pet::new();
    let mut errors = FieldErrors::new();
    bind_pet(clinic, req.form(), &mut pet, &mut errors)?;
    PetValidator.validate(&pet, &mut errors);
    check_pet_against_owner(&owner, &pet, model::today(), &mut errors);

    if errors.has_errors() {
        return render_form(clinic, &owner, &pet, Some(req.form()), &errors);
    }

    owner.add_pet(pet);
    clinic.owners().save(&mut owner)?;
    Ok(Reply::redirect_with_message(format!("/owners/{owner_id}"), "New Pet has been Added"))
}

pub fn init_update_form(clinic: &Clinic, owner_id: i32, pet_id: i32) -> Result<Reply, ClinicError> {
    let owner = load_owner(clinic, owner_id)?;
    let pet = owner.pet_by_id(pet_id).ok_or_else(|| ClinicError::pet_not_found(pet_id))?;
    render_form(clinic, &owner, pet, None, &FieldErrors::new())
}

pub fn process_update_form(
    clinic: &Clinic,
    req: &WebRequest,
    owner_id: i32,
    pet_id: i32,
) -> Result<Reply, ClinicError> {
    let mut owner = load_owner(clinic, owner_id)?;
    let mut pet = owner
        .pet_by_id(pet_id)
        .cloned()
        .ok_or_else(|| ClinicError::pet_not_found(pet_id))?;

    let mut errors = FieldErrors::new();
    bind_pet(clinic, req.form(), &mut pet, &mut errors)?;
    PetValidator.validate(&pet, &mut errors);
    check_pet_against_owner(&owner, &pet, model::today(), &mut errors);

    if errors.has_errors() {
        return render_form(clinic, &owner, &pet, Some(req.form()), &errors);
    }

    owner.update_pet(pet)?;
    clinic.owners().save(&mut owner)?;
    Ok(Reply::redirect_with_message(format!("/owners/{owner_id}"), "pet details has been edited"))
}
