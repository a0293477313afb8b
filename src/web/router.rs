//! Path routing and dispatch to the handlers.

use super::request::{Method, WebRequest};
use super::response::{ContentType, Reply, WebResponse};
use super::{owners, pets, system, vets, views, visits};
use crate::error::ClinicError;
use crate::repository::{OwnerRepository, VetRepository};
use std::sync::Arc;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Crash,
    NewOwner,
    FindOwners,
    OwnerSearch,
    ShowOwner(i32),
    EditOwner(i32),
    NewPet(i32),
    EditPet(i32, i32),
    NewVisit(i32, i32),
    VetPage,
    VetResources,
    Metrics,
    NotFound,
}

fn id(segment: &str) -> Result<i32, ClinicError> {
    segment
        .parse()
        .map_err(|_| ClinicError::BadRequest(format!("'{segment}' is not a valid id")))
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, ClinicError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Welcome,
            ["oups"] => Route::Crash,
            ["owners"] => Route::OwnerSearch,
            ["owners", "new"] => Route::NewOwner,
            ["owners", "find"] => Route::FindOwners,
            ["owners", owner] => Route::ShowOwner(id(owner)?),
            ["owners", owner, "edit"] => Route::EditOwner(id(owner)?),
            ["owners", owner, "pets", "new"] => Route::NewPet(id(owner)?),
            ["owners", owner, "pets", pet, "edit"] => Route::EditPet(id(owner)?, id(pet)?),
            ["owners", owner, "pets", pet, "visits", "new"] => Route::NewVisit(id(owner)?, id(pet)?),
            ["vets.html"] => Route::VetPage,
            ["vets"] => Route::VetResources,
            ["metrics"] => Route::Metrics,
            _ => Route::NotFound,
        };
        Ok(route)
    }

    /// Low-cardinality name used as the metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Welcome => "/",
            Route::Crash => "/oups",
            Route::NewOwner => "/owners/new",
            Route::FindOwners => "/owners/find",
            Route::OwnerSearch => "/owners",
            Route::ShowOwner(_) => "/owners/{ownerId}",
            Route::EditOwner(_) => "/owners/{ownerId}/edit",
            Route::NewPet(_) => "/owners/{ownerId}/pets/new",
            Route::EditPet(..) => "/owners/{ownerId}/pets/{petId}/edit",
            Route::NewVisit(..) => "/owners/{ownerId}/pets/{petId}/visits/new",
            Route::VetPage => "/vets.html",
            Route::VetResources => "/vets",
            Route::Metrics => "/metrics",
            Route::NotFound => "unmatched",
        }
    }
}

/// The clinic web application: repositories plus request dispatch.
#[derive(Clone)]
pub struct Clinic {
    owners: Arc<dyn OwnerRepository>,
    vets: Arc<dyn VetRepository>,
    page_size: u32,
}

impl Clinic {
    pub fn new(owners: Arc<dyn OwnerRepository>, vets: Arc<dyn VetRepository>, page_size: u32) -> Self {
        Self {
            owners,
            vets,
            page_size: page_size.max(1),
        }
    }

    pub fn owners(&self) -> &dyn OwnerRepository {
        self.owners.as_ref()
    }

    pub fn vets(&self) -> &dyn VetRepository {
        self.vets.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Metrics label for a request path.
    pub fn route_label(path: &str) -> &'static str {
        Route::parse(path).map_or("invalid", |route| route.label())
    }

    /// Handle one request, following redirects server-side.
    pub fn handle(&self, request: WebRequest) -> WebResponse {
        let mut request = request;
        let mut location: Option<String> = None;
        for _ in 0..=MAX_REDIRECTS {
            match self.dispatch(&request) {
                Ok(Reply::Page(mut response)) => {
                    if let Some(location) = location.as_deref() {
                        if response.content_type == ContentType::Html {
                            views::set_location(&mut response.body, location);
                        }
                    }
                    return response;
                }
                Ok(Reply::Redirect { to, flash }) => {
                    log::debug!("redirect {} -> {to}", request.path());
                    request = WebRequest::get(&to).with_flash(flash);
                    location = Some(to);
                }
                Err(err) => return error_response(&err),
            }
        }
        error_response(&ClinicError::Internal(format!(
            "too many redirects ending at {}",
            request.path()
        )))
    }

    fn dispatch(&self, req: &WebRequest) -> Result<Reply, ClinicError> {
        use Method::{Get, Post};

        let route = Route::parse(req.path())?;
        match (route, req.method()) {
            (Route::Welcome, Get) => Ok(system::welcome()),
            (Route::Crash, Get) => system::crash(),
            (Route::Metrics, Get) => system::metrics(),

            (Route::NewOwner, Get) => Ok(owners::init_creation_form()),
            (Route::NewOwner, Post) => owners::process_creation_form(self, req),
            (Route::FindOwners, Get) => Ok(owners::init_find_form()),
            (Route::OwnerSearch, Get) => owners::process_find_form(self, req),
            (Route::ShowOwner(owner_id), Get) => owners::show_owner(self, req, owner_id),
            (Route::EditOwner(owner_id), Get) => owners::init_update_form(self, owner_id),
            (Route::EditOwner(owner_id), Post) => owners::process_update_form(self, req, owner_id),

            (Route::NewPet(owner_id), Get) => pets::init_creation_form(self, owner_id),
            (Route::NewPet(owner_id), Post) => pets::process_creation_form(self, req, owner_id),
            (Route::EditPet(owner_id, pet_id), Get) => pets::init_update_form(self, owner_id, pet_id),
            (Route::EditPet(owner_id, pet_id), Post) => {
                pets::process_update_form(self, req, owner_id, pet_id)
            }

            (Route::NewVisit(owner_id, pet_id), Get) => visits::init_new_visit_form(self, owner_id, pet_id),
            (Route::NewVisit(owner_id, pet_id), Post) => {
                visits::process_new_visit_form(self, req, owner_id, pet_id)
            }

            (Route::VetPage, Get) => vets::show_vet_list(self, req),
            (Route::VetResources, Get) => vets::show_resources_vet_list(self, req),

            (Route::NotFound, _) => Ok(page(404, &format!("No page at {}", req.path()))),
            (_, _) => Ok(page(405, &format!("Method not allowed for {}", req.path()))),
        }
    }
}

fn page(status: u16, message: &str) -> Reply {
    WebResponse::with_status(status, ContentType::Html, views::error_page(status, message)).into()
}

/// Render a handler failure as the error page.
pub fn error_response(err: &ClinicError) -> WebResponse {
    let status = match err {
        ClinicError::NotFound { .. } => 404,
        ClinicError::BadRequest(_) => 400,
        _ => 500,
    };
    if status == 500 {
        log::error!("request failed: {err}");
    } else {
        log::debug!("request rejected ({status}): {err}");
    }
    WebResponse::with_status(status, ContentType::Html, views::error_page(status, &err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parsing() {
        assert_eq!(Route::parse("/").expect("route"), Route::Welcome);
        assert_eq!(Route::parse("/owners/new").expect("route"), Route::NewOwner);
        assert_eq!(Route::parse("/owners/7").expect("route"), Route::ShowOwner(7));
        assert_eq!(Route::parse("/owners/7/").expect("route"), Route::ShowOwner(7));
        assert_eq!(
            Route::parse("/owners/7/pets/3/visits/new").expect("route"),
            Route::NewVisit(7, 3)
        );
        assert_eq!(Route::parse("/vets.html").expect("route"), Route::VetPage);
        assert_eq!(Route::parse("/nope/at/all").expect("route"), Route::NotFound);
    }

    #[test]
    fn test_non_numeric_id_is_bad_request() {
        assert!(matches!(
            Route::parse("/owners/abc/edit"),
            Err(ClinicError::BadRequest(_))
        ));
        assert_eq!(Clinic::route_label("/owners/abc"), "invalid");
    }

    #[test]
    fn test_labels_hide_ids() {
        assert_eq!(Clinic::route_label("/owners/12/pets/4/edit"), "/owners/{ownerId}/pets/{petId}/edit");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_response(&ClinicError::owner_not_found(1)).status, 404);
        assert_eq!(error_response(&ClinicError::BadRequest("x".into())).status, 400);
        assert_eq!(error_response(&ClinicError::Crash("boom".into())).status, 500);
    }
}
