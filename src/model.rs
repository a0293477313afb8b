//! Clinic entities.
//!
//! Every entity carries an `id: Option<i32>`; `None` means the record has not
//! been stored yet ("new"). Relationships are owned collections: an
//! [`Owner`] holds its pets, a [`Pet`] holds its visits, and a [`Vet`] holds
//! its specialties.

mod owner;
mod pet;
mod vet;
mod visit;

pub use owner::Owner;
pub use pet::{Pet, PetType};
pub use vet::{Specialty, Vet, Vets};
pub use visit::Visit;

/// Date pattern used by forms, views and the formatter (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the server's local time zone.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
