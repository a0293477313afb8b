//! Router-level tests against the seeded in-memory store.

use petclinic::model::Owner;
use petclinic::repository::{MemoryStore, OwnerRepository};
use petclinic::web::{Clinic, Method, WebRequest, WebResponse, CRASH_MESSAGE};
use std::sync::Arc;

fn clinic() -> (Clinic, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::seeded());
    let clinic = Clinic::new(store.clone(), store.clone(), 5);
    (clinic, store)
}

fn get(clinic: &Clinic, target: &str) -> WebResponse {
    clinic.handle(WebRequest::get(target))
}

fn post(clinic: &Clinic, target: &str, body: &str) -> WebResponse {
    clinic.handle(WebRequest::post(target, body))
}

fn owner(store: &MemoryStore, id: i32) -> Owner {
    store
        .find_by_id(id)
        .expect("lookup")
        .unwrap_or_else(|| panic!("owner {id} missing"))
}

const NEW_OWNER: &str =
    "firstName=Jane&lastName=Doe&address=12+Elm+St.&city=Springfield&telephone=6085550000";

#[test]
fn test_welcome_page() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/");
    assert_eq!(response.status, 200);
    assert!(response.body.contains("Welcome"));
}

#[test]
fn test_create_owner_redirects_to_details_with_flash() {
    let (clinic, store) = clinic();
    let response = post(&clinic, "/owners/new", NEW_OWNER);

    assert_eq!(response.status, 200);
    assert!(response.body.contains("id=\"success-message\">New Owner created"));
    assert!(response.body.contains("Owner Information"));
    assert!(response.body.contains("<b>Jane Doe</b>"));

    let saved = owner(&store, 11);
    assert_eq!(saved.city, "Springfield");
    assert!(saved.pets().is_empty());
}

#[test]
fn test_create_owner_never_binds_id() {
    let (clinic, store) = clinic();
    post(&clinic, "/owners/new", &format!("id=1&{NEW_OWNER}"));

    assert_eq!(owner(&store, 1).first_name, "George");
    assert_eq!(owner(&store, 11).first_name, "Jane");
}

#[test]
fn test_create_owner_with_errors_rerenders_form() {
    let (clinic, store) = clinic();
    let response = post(
        &clinic,
        "/owners/new",
        "firstName=Jane&lastName=&address=x&city=y&telephone=12ab",
    );

    assert_eq!(response.status, 200);
    assert!(response
        .body
        .contains("id=\"error-message\">There was an error in creating the owner"));
    assert!(response.body.contains("has-error"));
    assert!(response.body.contains("must not be blank"));
    assert!(response.body.contains("numeric value out of bounds"));
    assert!(store.find_by_id(11).expect("lookup").is_none());
}

#[test]
fn test_find_owners_form() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners/find");
    assert_eq!(response.status, 200);
    assert!(response.body.contains("id=\"search-owner-form\""));
}

#[test]
fn test_search_with_several_matches_lists_them() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners?lastName=Davis");

    assert_eq!(response.status, 200);
    assert!(response.body.contains("Betty Davis"));
    assert!(response.body.contains("Harold Davis"));
    assert!(response.body.contains("data-total-items=\"2\""));
    assert!(response.body.contains("data-total-pages=\"1\""));
}

#[test]
fn test_search_with_single_match_shows_owner() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners?lastName=Franklin");

    assert_eq!(response.status, 200);
    assert!(response.body.contains("<b>George Franklin</b>"));
    assert!(response.body.contains("Leo"));
}

#[test]
fn test_search_without_match_reports_not_found() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners?lastName=Nobody");

    assert_eq!(response.status, 200);
    assert!(response.body.contains("id=\"search-owner-form\""));
    assert!(response.body.contains("not found"));
}

#[test]
fn test_search_with_empty_name_pages_everyone() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners?lastName=&page=2");

    assert!(response.body.contains("data-current-page=\"2\""));
    assert!(response.body.contains("data-total-pages=\"2\""));
    assert!(response.body.contains("data-total-items=\"10\""));
    assert!(response.body.contains("Jeff Black"));
    assert!(!response.body.contains("George Franklin"));
}

#[test]
fn test_update_owner_keeps_pets() {
    let (clinic, store) = clinic();
    let response = post(
        &clinic,
        "/owners/1/edit",
        "firstName=George&lastName=Franklin&address=1+New+Rd.&city=Madison&telephone=6085551023",
    );

    assert!(response.body.contains("id=\"success-message\">Owner Values Updated"));
    let saved = owner(&store, 1);
    assert_eq!(saved.address, "1 New Rd.");
    assert_eq!(saved.pets().len(), 1);
    assert_eq!(saved.pets()[0].name, "Leo");
}

#[test]
fn test_update_owner_with_errors_flashes_error() {
    let (clinic, store) = clinic();
    let response = post(
        &clinic,
        "/owners/1/edit",
        "firstName=George&lastName=Franklin&address=&city=Madison&telephone=6085551023",
    );

    assert!(response
        .body
        .contains("id=\"error-message\">There was an error in updating the owner"));
    assert_eq!(owner(&store, 1).address, "110 W. Liberty St.");
}

#[test]
fn test_edit_form_is_prefilled() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners/2/edit");
    assert!(response.body.contains("value=\"Betty\""));
    assert!(response.body.contains("action=\"/owners/2/edit\""));
}

#[test]
fn test_add_pet() {
    let (clinic, store) = clinic();
    let form = get(&clinic, "/owners/1/pets/new");
    assert!(form.body.contains("<option value=\"hamster\">"));

    let response = post(
        &clinic,
        "/owners/1/pets/new",
        "name=Rex&birthDate=2020-05-01&type=dog",
    );
    assert!(response.body.contains("id=\"success-message\">New Pet has been Added"));

    let saved = owner(&store, 1);
    let rex = saved.pet_by_name("Rex", true).expect("saved pet");
    assert!(rex.id.is_some());
    assert_eq!(rex.pet_type.as_ref().map(|t| t.name.as_str()), Some("dog"));
}

#[test]
fn test_add_pet_rejects_blank_name_missing_type_and_birth_date() {
    let (clinic, store) = clinic();
    let response = post(&clinic, "/owners/1/pets/new", "name=&birthDate=&type=");

    assert_eq!(response.status, 200);
    assert_eq!(response.body.matches("<span class=\"help-inline\">required</span>").count(), 3);
    assert_eq!(owner(&store, 1).pets().len(), 1);
}

#[test]
fn test_add_pet_rejects_duplicate_name() {
    let (clinic, store) = clinic();
    let response = post(
        &clinic,
        "/owners/1/pets/new",
        "name=leo&birthDate=2020-05-01&type=cat",
    );

    assert!(response.body.contains("already exists"));
    assert_eq!(owner(&store, 1).pets().len(), 1);
}

#[test]
fn test_add_pet_rejects_future_birth_date() {
    let (clinic, _) = clinic();
    let response = post(
        &clinic,
        "/owners/1/pets/new",
        "name=Tomorrow&birthDate=2999-01-01&type=cat",
    );
    assert!(response.body.contains("invalid date"));
    assert!(response.body.contains("value=\"2999-01-01\""));
}

#[test]
fn test_add_pet_rejects_unknown_type() {
    let (clinic, _) = clinic();
    let response = post(
        &clinic,
        "/owners/1/pets/new",
        "name=Nessie&birthDate=2020-01-01&type=dragon",
    );
    assert!(response.body.contains("type not found: dragon"));
}

#[test]
fn test_edit_pet() {
    let (clinic, store) = clinic();
    let form = get(&clinic, "/owners/6/pets/8/edit");
    assert!(form.body.contains("value=\"Max\""));

    let response = post(
        &clinic,
        "/owners/6/pets/8/edit",
        "name=Maximus&birthDate=2012-09-04&type=cat",
    );
    assert!(response.body.contains("id=\"success-message\">pet details has been edited"));

    let saved = owner(&store, 6);
    let names: Vec<_> = saved.pets().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Maximus", "Samantha"]);
    assert_eq!(saved.pet_by_id(8).map(|p| p.visits().len()), Some(2));
}

#[test]
fn test_edit_pet_rejects_name_of_sibling() {
    let (clinic, store) = clinic();
    let response = post(
        &clinic,
        "/owners/6/pets/8/edit",
        "name=Samantha&birthDate=2012-09-04&type=cat",
    );
    assert!(response.body.contains("already exists"));
    assert_eq!(owner(&store, 6).pet_by_id(8).map(|p| p.name.clone()), Some("Max".to_string()));
}

#[test]
fn test_book_visit() {
    let (clinic, store) = clinic();
    let form = get(&clinic, "/owners/6/pets/7/visits/new");
    assert!(form.body.contains("rabies shot"));

    let response = post(
        &clinic,
        "/owners/6/pets/7/visits/new",
        "date=2024-02-02&description=annual+checkup",
    );
    assert!(response.body.contains("id=\"success-message\">Your visit has been booked"));
    assert!(response.body.contains("annual checkup"));

    let saved = owner(&store, 6);
    let visits = saved.pet_by_id(7).expect("pet").visits();
    assert_eq!(visits.len(), 3);
    assert!(visits.iter().all(|v| v.id.is_some()));
}

#[test]
fn test_book_visit_requires_description() {
    let (clinic, store) = clinic();
    let response = post(&clinic, "/owners/6/pets/7/visits/new", "date=2024-02-02&description=");
    assert!(response.body.contains("must not be blank"));
    assert_eq!(owner(&store, 6).pet_by_id(7).expect("pet").visits().len(), 2);
}

#[test]
fn test_vet_page_is_paged() {
    let (clinic, _) = clinic();
    let first = get(&clinic, "/vets.html");
    assert!(first.body.contains("James Carter"));
    assert!(!first.body.contains("Sharon Jenkins"));
    assert!(first.body.contains("dentistry surgery"));

    let second = get(&clinic, "/vets.html?page=2");
    assert!(second.body.contains("Sharon Jenkins"));
    assert!(second.body.contains("none"));
}

#[test]
fn test_vets_as_json() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/vets");
    assert_eq!(response.content_type.header(), "Content-Type: application/json");

    let json: serde_json::Value = serde_json::from_str(&response.body).expect("json body");
    let vets = json["vetList"].as_array().expect("vetList");
    assert_eq!(vets.len(), 6);
    assert_eq!(vets[2]["lastName"], "Douglas");
    assert_eq!(vets[2]["specialties"][0]["name"], "dentistry");
    assert_eq!(vets[2]["specialties"][0]["new"], false);
    assert_eq!(vets[2]["nrOfSpecialties"], 2);
}

#[test]
fn test_vets_as_xml() {
    let (clinic, _) = clinic();
    let response = clinic.handle(WebRequest::get("/vets").with_accept("application/xml"));
    assert!(response.body.contains("<vets><vetList><id>1</id><firstName>James</firstName>"));
}

#[test]
fn test_crash_renders_error_page() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/oups");
    assert_eq!(response.status, 500);
    assert!(response.body.contains(CRASH_MESSAGE));
}

#[test]
fn test_unknown_owner_is_not_found() {
    let (clinic, _) = clinic();
    let response = get(&clinic, "/owners/999");
    assert_eq!(response.status, 404);
    assert!(response.body.contains("Owner Id not found: 999"));

    let pet = get(&clinic, "/owners/1/pets/999/edit");
    assert_eq!(pet.status, 404);
}

#[test]
fn test_routing_errors() {
    let (clinic, _) = clinic();
    assert_eq!(get(&clinic, "/no/such/page").status, 404);
    assert_eq!(get(&clinic, "/owners/abc").status, 400);
    assert_eq!(get(&clinic, "/vets.html?page=x").status, 400);
    assert_eq!(clinic.handle(WebRequest::new(Method::Other, "/owners/new")).status, 405);
    assert_eq!(post(&clinic, "/vets", "").status, 405);
}

#[test]
fn test_followed_redirect_rewrites_browser_location() {
    let (clinic, _) = clinic();

    let created = post(&clinic, "/owners/new", NEW_OWNER);
    assert!(created
        .body
        .contains("<script>history.replaceState(null, \"\", \"/owners/11\");</script>"));

    let found = get(&clinic, "/owners?lastName=Franklin");
    assert!(found.body.contains("history.replaceState(null, \"\", \"/owners/1\")"));

    let form = get(&clinic, "/owners/new");
    assert!(!form.body.contains("history.replaceState"));
}
