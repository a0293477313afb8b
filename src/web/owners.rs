//! Owner create, search, show and update.

use super::request::{Params, WebRequest};
use super::response::{Flash, Reply, WebResponse};
use super::router::Clinic;
use super::vets::page_param;
use super::views;
use crate::error::ClinicError;
use crate::model::Owner;
use crate::page::PageRequest;
use crate::validation::{validate_owner, FieldErrors};

const CREATE_ERROR: &str = "There was an error in creating the owner";
const UPDATE_ERROR: &str = "There was an error in updating the owner";

/// Bind the editable owner fields. `id` is never taken from the form.
fn bind_owner(form: &Params) -> Owner {
    Owner {
        first_name: form.text("firstName"),
        last_name: form.text("lastName"),
        address: form.text("address"),
        city: form.text("city"),
        telephone: form.text("telephone"),
        ..Owner::default()
    }
}

pub(super) fn load_owner(clinic: &Clinic, owner_id: i32) -> Result<Owner, ClinicError> {
    clinic
        .owners()
        .find_by_id(owner_id)?
        .ok_or_else(|| ClinicError::owner_not_found(owner_id))
}

pub fn init_creation_form() -> Reply {
    WebResponse::html(views::owner_form(&Owner::new(), &FieldErrors::new(), None)).into()
}

pub fn process_creation_form(clinic: &Clinic, req: &WebRequest) -> Result<Reply, ClinicError> {
    let mut owner = bind_owner(req.form());
    let errors = validate_owner(&owner);
    if errors.has_errors() {
        let flash = Flash::Error(CREATE_ERROR.to_string());
        return Ok(WebResponse::html(views::owner_form(&owner, &errors, Some(&flash))).into());
    }

    clinic.owners().save(&mut owner)?;
    let owner_id = owner.id.ok_or_else(|| ClinicError::Internal("saved owner has no id".to_string()))?;
    log::info!("created owner {owner_id}");
    Ok(Reply::redirect_with_message(format!("/owners/{owner_id}"), "New Owner created"))
}

pub fn init_find_form() -> Reply {
    WebResponse::html(views::find_owners("", &FieldErrors::new())).into()
}

/// `GET /owners?lastName=&page=`
///
/// No match re-renders the find form, a single match redirects to that
/// owner, several matches render one page of the list.
pub fn process_find_form(clinic: &Clinic, req: &WebRequest) -> Result<Reply, ClinicError> {
    let last_name = req.query().text("lastName");
    let page = PageRequest::new(page_param(req)?, clinic.page_size());
    let results = clinic.owners().find_by_last_name(&last_name, page)?;

    if results.is_empty() {
        let mut errors = FieldErrors::new();
        errors.reject("lastName", "notFound", "not found");
        return Ok(WebResponse::html(views::find_owners(&last_name, &errors)).into());
    }

    if results.total_elements() == 1 {
        if let Some(id) = results.content().first().and_then(|o| o.id) {
            return Ok(Reply::redirect(format!("/owners/{id}")));
        }
    }

    Ok(WebResponse::html(views::owners_list(&results, &last_name)).into())
}

pub fn init_update_form(clinic: &Clinic, owner_id: i32) -> Result<Reply, ClinicError> {
    let owner = load_owner(clinic, owner_id)?;
    Ok(WebResponse::html(views::owner_form(&owner, &FieldErrors::new(), None)).into())
}

pub fn process_update_form(clinic: &Clinic, req: &WebRequest, owner_id: i32) -> Result<Reply, ClinicError> {
    let mut submitted = bind_owner(req.form());
    submitted.id = Some(owner_id);
    let errors = validate_owner(&submitted);
    if errors.has_errors() {
        let flash = Flash::Error(UPDATE_ERROR.to_string());
        return Ok(WebResponse::html(views::owner_form(&submitted, &errors, Some(&flash))).into());
    }

    // Pets stay as stored; only the contact details change.
    let mut owner = load_owner(clinic, owner_id)?;
    owner.first_name = submitted.first_name;
    owner.last_name = submitted.last_name;
    owner.address = submitted.address;
    owner.city = submitted.city;
    owner.telephone = submitted.telephone;
    clinic.owners().save(&mut owner)?;
    Ok(Reply::redirect_with_message(format!("/owners/{owner_id}"), "Owner Values Updated"))
}

pub fn show_owner(clinic: &Clinic, req: &WebRequest, owner_id: i32) -> Result<Reply, ClinicError> {
    let owner = load_owner(clinic, owner_id)?;
    Ok(WebResponse::html(views::owner_details(&owner, req.flash())).into())
}
