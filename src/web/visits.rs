//! Booking a visit for a pet.

use super::owners::load_owner;
use super::request::WebRequest;
use super::response::{Reply, WebResponse};
use super::router::Clinic;
use super::views;
use crate::error::ClinicError;
use crate::formatting::{parse_date, print_date};
use crate::model::{Owner, Pet, Visit};
use crate::validation::{validate_visit, FieldErrors, INVALID_DATE};

fn load_pet(owner: &Owner, pet_id: i32) -> Result<&Pet, ClinicError> {
    owner.pet_by_id(pet_id).ok_or_else(|| ClinicError::pet_not_found(pet_id))
}

pub fn init_new_visit_form(clinic: &Clinic, owner_id: i32, pet_id: i32) -> Result<Reply, ClinicError> {
    let owner = load_owner(clinic, owner_id)?;
    let pet = load_pet(&owner, pet_id)?;
    let visit = Visit::new();
    let html = views::visit_form(&owner, pet, &print_date(&visit.date), "", &FieldErrors::new());
    Ok(WebResponse::html(html).into())
}

/// A blank or missing date books the visit for today.
pub fn process_new_visit_form(
    clinic: &Clinic,
    req: &WebRequest,
    owner_id: i32,
    pet_id: i32,
) -> Result<Reply, ClinicError> {
    let mut owner = load_owner(clinic, owner_id)?;
    load_pet(&owner, pet_id)?;

    let form = req.form();
    let mut visit = Visit::new();
    visit.description = form.text("description");

    let mut errors = FieldErrors::new();
    let raw_date = form.text("date");
    if !raw_date.trim().is_empty() {
        match parse_date(&raw_date) {
            Ok(date) => visit.date = date,
            Err(_) => errors.reject("date", "typeMismatch", INVALID_DATE),
        }
    }
    for error in validate_visit(&visit).iter() {
        errors.reject(error.field, error.code, error.message.clone());
    }

    if errors.has_errors() {
        let pet = load_pet(&owner, pet_id)?;
        let html = views::visit_form(&owner, pet, &raw_date, &visit.description, &errors);
        return Ok(WebResponse::html(html).into());
    }

    owner.add_visit(pet_id, visit)?;
    clinic.owners().save(&mut owner)?;
    Ok(Reply::redirect_with_message(format!("/owners/{owner_id}"), "Your visit has been booked"))
}
