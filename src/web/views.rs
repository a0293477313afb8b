//! Server-rendered HTML pages.

use super::request::encode_component;
use super::response::Flash;
use crate::formatting::print_date;
use crate::model::{Owner, Pet, PetType, Vet};
use crate::page::Page;
use crate::validation::FieldErrors;

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Owners,
    Vets,
    Error,
}

fn nav_item(current: Nav, item: Nav, href: &str, label: &str) -> String {
    let class = if current == item { " class=\"active\"" } else { "" };
    format!("<li{class}><a href=\"{href}\">{label}</a></li>")
}

fn flash_banner(flash: Option<&Flash>) -> String {
    match flash {
        Some(Flash::Message(text)) => {
            format!("<div class=\"alert alert-success\" id=\"success-message\">{}</div>\n", escape(text))
        }
        Some(Flash::Error(text)) => {
            format!("<div class=\"alert alert-danger\" id=\"error-message\">{}</div>\n", escape(text))
        }
        None => String::new(),
    }
}

fn layout(title: &str, nav: Nav, flash: Option<&Flash>, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>PetClinic :: {title}</title>\n</head>\n<body>\n\
         <nav><ul>{home}{find}{vets}{error}</ul></nav>\n\
         <main>\n{banner}{content}\n</main>\n</body>\n</html>\n",
        title = escape(title),
        home = nav_item(nav, Nav::Home, "/", "Home"),
        find = nav_item(nav, Nav::Owners, "/owners/find", "Find owners"),
        vets = nav_item(nav, Nav::Vets, "/vets.html", "Veterinarians"),
        error = nav_item(nav, Nav::Error, "/oups", "Error"),
        banner = flash_banner(flash),
    )
}

/// Point the browser's address bar and history entry at `location`.
///
/// Used on pages reached by following a redirect, so reloading one asks for
/// `location` with a GET instead of resubmitting the form.
pub fn set_location(body: &mut String, location: &str) {
    let Ok(target) = serde_json::to_string(location) else {
        return;
    };
    let script = format!(
        "<script>history.replaceState(null, \"\", {});</script>\n",
        target.replace('<', "\\u003c")
    );
    if let Some(at) = body.rfind("</body>") {
        body.insert_str(at, &script);
    }
}

fn field_error_html(errors: &FieldErrors, field: &str) -> String {
    errors
        .field_error(field)
        .map(|e| format!("<span class=\"help-inline\">{}</span>", escape(&e.message)))
        .unwrap_or_default()
}

fn input_field(label: &str, name: &str, kind: &str, value: &str, errors: &FieldErrors) -> String {
    let class = if errors.has_field_error(name) {
        "form-group has-error"
    } else {
        "form-group"
    };
    format!(
        "<div class=\"{class}\"><label for=\"{name}\">{label}</label>\
         <input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\">{error}</div>\n",
        value = escape(value),
        error = field_error_html(errors, name),
    )
}

fn owner_path(owner: &Owner) -> String {
    format!("/owners/{}", owner.id.unwrap_or_default())
}

fn pagination(base: &str, current: u32, total_pages: u64) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let mut html = String::from("<div class=\"pagination\"><span>Pages:</span> [");
    for n in 1..=total_pages {
        if u64::from(current) == n {
            html.push_str(&format!(" <span class=\"current\">{n}</span>"));
        } else {
            html.push_str(&format!(" <a href=\"{base}page={n}\">{n}</a>"));
        }
    }
    html.push_str(" ]");
    let current = u64::from(current);
    let link = |enabled: bool, page: u64, title: &str, label: &str| {
        if enabled {
            format!(" <a href=\"{base}page={page}\" title=\"{title}\">{label}</a>")
        } else {
            format!(" <span title=\"{title}\">{label}</span>")
        }
    };
    html.push_str(&link(current > 1, 1, "First", "&laquo;"));
    html.push_str(&link(current > 1, current.saturating_sub(1).max(1), "Previous", "&lsaquo;"));
    html.push_str(&link(current < total_pages, current + 1, "Next", "&rsaquo;"));
    html.push_str(&link(current < total_pages, total_pages, "Last", "&raquo;"));
    html.push_str("</div>\n");
    html
}

pub fn welcome() -> String {
    layout(
        "Welcome",
        Nav::Home,
        None,
        "<h2>Welcome</h2>\n<p>Veterinary clinic records for owners, pets, visits and vets.</p>",
    )
}

/// Error page; `message` is the failure reported to the user.
pub fn error_page(status: u16, message: &str) -> String {
    let content = format!(
        "<h2>Something happened...</h2>\n<p id=\"status\">{status}</p>\n<p id=\"message\">{}</p>",
        escape(message)
    );
    layout("Error", Nav::Error, None, &content)
}

/// Create or update owner form. `owner.id` picks the heading and action.
pub fn owner_form(owner: &Owner, errors: &FieldErrors, flash: Option<&Flash>) -> String {
    let (heading, action, button) = match owner.id {
        None => ("New Owner", "/owners/new".to_string(), "Add Owner"),
        Some(id) => ("Owner", format!("/owners/{id}/edit"), "Update Owner"),
    };
    let mut content = format!("<h2>{heading}</h2>\n<form method=\"post\" action=\"{action}\" id=\"add-owner-form\">\n");
    content.push_str(&input_field("First Name", "firstName", "text", &owner.first_name, errors));
    content.push_str(&input_field("Last Name", "lastName", "text", &owner.last_name, errors));
    content.push_str(&input_field("Address", "address", "text", &owner.address, errors));
    content.push_str(&input_field("City", "city", "text", &owner.city, errors));
    content.push_str(&input_field("Telephone", "telephone", "text", &owner.telephone, errors));
    content.push_str(&format!("<button type=\"submit\">{button}</button>\n</form>"));
    layout(heading, Nav::Owners, flash, &content)
}

pub fn find_owners(last_name: &str, errors: &FieldErrors) -> String {
    let mut content = String::from(
        "<h2>Find Owners</h2>\n<form method=\"get\" action=\"/owners\" id=\"search-owner-form\">\n",
    );
    content.push_str(&input_field("Last name", "lastName", "text", last_name, errors));
    content.push_str(
        "<button type=\"submit\">Find Owner</button>\n</form>\n\
         <a href=\"/owners/new\">Add Owner</a>",
    );
    layout("Find Owners", Nav::Owners, None, &content)
}

/// Paged search results. Carries the `currentPage`, `totalPages` and
/// `totalItems` of the search.
pub fn owners_list(page: &Page<Owner>, last_name: &str) -> String {
    let mut content = String::from(
        "<h2>Owners</h2>\n<table id=\"owners\">\n<thead><tr><th>Name</th><th>Address</th>\
         <th>City</th><th>Telephone</th><th>Pets</th></tr></thead>\n<tbody>\n",
    );
    for owner in page.content() {
        let pets: Vec<String> = owner.pets().iter().map(|p| escape(&p.name)).collect();
        content.push_str(&format!(
            "<tr><td><a href=\"{path}\">{first} {last}</a></td><td>{address}</td><td>{city}</td>\
             <td>{telephone}</td><td>{pets}</td></tr>\n",
            path = owner_path(owner),
            first = escape(&owner.first_name),
            last = escape(&owner.last_name),
            address = escape(&owner.address),
            city = escape(&owner.city),
            telephone = escape(&owner.telephone),
            pets = pets.join(" "),
        ));
    }
    content.push_str("</tbody>\n</table>\n");
    content.push_str(&format!(
        "<p class=\"summary\" data-current-page=\"{current}\" data-total-pages=\"{pages}\" \
         data-total-items=\"{items}\">Page {current} of {pages} ({items} owners)</p>\n",
        current = page.number(),
        pages = page.total_pages(),
        items = page.total_elements(),
    ));
    let base = format!("/owners?lastName={}&", encode_component(last_name));
    content.push_str(&pagination(&base, page.number(), page.total_pages()));
    layout("Owners", Nav::Owners, None, &content)
}

fn visits_table(pet: &Pet) -> String {
    let mut html = String::from(
        "<table class=\"visits\">\n<thead><tr><th>Visit Date</th><th>Description</th></tr></thead>\n<tbody>\n",
    );
    for visit in pet.visits() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            print_date(&visit.date),
            escape(&visit.description)
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn owner_details(owner: &Owner, flash: Option<&Flash>) -> String {
    let path = owner_path(owner);
    let mut content = format!(
        "<h2>Owner Information</h2>\n<table id=\"owner\">\n\
         <tr><th>Name</th><td><b>{first} {last}</b></td></tr>\n\
         <tr><th>Address</th><td>{address}</td></tr>\n\
         <tr><th>City</th><td>{city}</td></tr>\n\
         <tr><th>Telephone</th><td>{telephone}</td></tr>\n</table>\n\
         <a href=\"{path}/edit\">Edit Owner</a> <a href=\"{path}/pets/new\">Add New Pet</a>\n\
         <h2>Pets and Visits</h2>\n",
        first = escape(&owner.first_name),
        last = escape(&owner.last_name),
        address = escape(&owner.address),
        city = escape(&owner.city),
        telephone = escape(&owner.telephone),
    );
    for pet in owner.pets() {
        let pet_id = pet.id.unwrap_or_default();
        content.push_str(&format!(
            "<div class=\"pet\">\n<dl><dt>Name</dt><dd>{name}</dd>\
             <dt>Birth Date</dt><dd>{birth}</dd><dt>Type</dt><dd>{kind}</dd></dl>\n{visits}\
             <a href=\"{path}/pets/{pet_id}/edit\">Edit Pet</a> \
             <a href=\"{path}/pets/{pet_id}/visits/new\">Add Visit</a>\n</div>\n",
            name = escape(&pet.name),
            birth = pet.birth_date.as_ref().map(print_date).unwrap_or_default(),
            kind = pet.pet_type.as_ref().map(|t| escape(&t.name)).unwrap_or_default(),
            visits = visits_table(pet),
        ));
    }
    layout("Owner Information", Nav::Owners, flash, &content)
}

/// Raw pet form values, echoed back when the form is re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFields {
    pub name: String,
    pub birth_date: String,
    pub pet_type: String,
}

impl PetFields {
    pub fn of(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            birth_date: pet.birth_date.as_ref().map(print_date).unwrap_or_default(),
            pet_type: pet.pet_type.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
        }
    }
}

pub fn pet_form(
    owner: &Owner,
    pet_id: Option<i32>,
    fields: &PetFields,
    types: &[PetType],
    errors: &FieldErrors,
) -> String {
    let path = owner_path(owner);
    let (heading, action, button) = match pet_id {
        None => ("New Pet", format!("{path}/pets/new"), "Add Pet"),
        Some(id) => ("Pet", format!("{path}/pets/{id}/edit"), "Update Pet"),
    };
    let mut content = format!(
        "<h2>{heading}</h2>\n<form method=\"post\" action=\"{action}\">\n\
         <div class=\"form-group\"><label>Owner</label><span>{first} {last}</span></div>\n",
        first = escape(&owner.first_name),
        last = escape(&owner.last_name),
    );
    content.push_str(&input_field("Name", "name", "text", &fields.name, errors));
    content.push_str(&input_field("Birth Date", "birthDate", "date", &fields.birth_date, errors));

    let class = if errors.has_field_error("type") {
        "form-group has-error"
    } else {
        "form-group"
    };
    content.push_str(&format!(
        "<div class=\"{class}\"><label for=\"type\">Type</label><select id=\"type\" name=\"type\">\n"
    ));
    for pet_type in types {
        let selected = if pet_type.name == fields.pet_type { " selected" } else { "" };
        content.push_str(&format!(
            "<option value=\"{name}\"{selected}>{name}</option>\n",
            name = escape(&pet_type.name)
        ));
    }
    content.push_str(&format!("</select>{}</div>\n", field_error_html(errors, "type")));
    content.push_str(&format!("<button type=\"submit\">{button}</button>\n</form>"));
    layout(heading, Nav::Owners, None, &content)
}

pub fn visit_form(
    owner: &Owner,
    pet: &Pet,
    date: &str,
    description: &str,
    errors: &FieldErrors,
) -> String {
    let pet_id = pet.id.unwrap_or_default();
    let mut content = format!(
        "<h2>New Visit</h2>\n<b>Pet</b>\n<table id=\"pet\">\n\
         <thead><tr><th>Name</th><th>Birth Date</th><th>Type</th><th>Owner</th></tr></thead>\n\
         <tr><td>{name}</td><td>{birth}</td><td>{kind}</td><td>{first} {last}</td></tr>\n</table>\n\
         <form method=\"post\" action=\"{path}/pets/{pet_id}/visits/new\">\n",
        name = escape(&pet.name),
        birth = pet.birth_date.as_ref().map(print_date).unwrap_or_default(),
        kind = pet.pet_type.as_ref().map(|t| escape(&t.name)).unwrap_or_default(),
        first = escape(&owner.first_name),
        last = escape(&owner.last_name),
        path = owner_path(owner),
    );
    content.push_str(&input_field("Date", "date", "date", date, errors));
    content.push_str(&input_field("Description", "description", "text", description, errors));
    content.push_str("<button type=\"submit\">Add Visit</button>\n</form>\n<b>Previous Visits</b>\n");
    content.push_str(&visits_table(pet));
    layout("New Visit", Nav::Owners, None, &content)
}

pub fn vet_list(page: &Page<Vet>) -> String {
    let mut content = String::from(
        "<h2>Veterinarians</h2>\n<table id=\"vets\">\n<thead><tr><th>Name</th><th>Specialties</th></tr></thead>\n<tbody>\n",
    );
    for vet in page.content() {
        let specialties: Vec<String> = vet.specialties().iter().map(|s| escape(&s.name)).collect();
        let specialties = if specialties.is_empty() {
            "none".to_string()
        } else {
            specialties.join(" ")
        };
        content.push_str(&format!(
            "<tr><td>{} {}</td><td>{specialties}</td></tr>\n",
            escape(&vet.first_name),
            escape(&vet.last_name)
        ));
    }
    content.push_str("</tbody>\n</table>\n");
    content.push_str(&pagination("/vets.html?", page.number(), page.total_pages()));
    layout("Veterinarians", Nav::Vets, None, &content)
}
