//! Vet list as an HTML page and as JSON/XML.

use super::request::WebRequest;
use super::response::{Reply, WebResponse};
use super::router::Clinic;
use super::{views, xml};
use crate::error::ClinicError;
use crate::model::Vets;
use crate::page::PageRequest;

/// Parse the optional 1-based `page` query parameter.
pub(super) fn page_param(req: &WebRequest) -> Result<i64, ClinicError> {
    match req.query().get("page") {
        None | Some("") => Ok(1),
        Some(raw) => raw
            .parse()
            .map_err(|_| ClinicError::BadRequest(format!("'{raw}' is not a valid page number"))),
    }
}

/// `GET /vets.html?page=N`
pub fn show_vet_list(clinic: &Clinic, req: &WebRequest) -> Result<Reply, ClinicError> {
    let page = PageRequest::new(page_param(req)?, clinic.page_size());
    let vets = clinic.vets().find_all_paged(page)?;
    Ok(WebResponse::html(views::vet_list(&vets)).into())
}

/// `GET /vets`: JSON by default, XML when the client asks for it.
pub fn show_resources_vet_list(clinic: &Clinic, req: &WebRequest) -> Result<Reply, ClinicError> {
    let vets = Vets::new(clinic.vets().find_all()?);
    if req.accepts_xml() {
        return Ok(WebResponse::xml(xml::vets_to_xml(&vets)).into());
    }
    let body = serde_json::to_string(&vets)
        .map_err(|e| ClinicError::Internal(format!("failed to serialize vets: {e}")))?;
    Ok(WebResponse::json(body).into())
}
