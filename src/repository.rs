//! Repositories for the clinic aggregates.
//!
//! [`OwnerRepository`] persists owners together with their pets and visits;
//! [`VetRepository`] is read-only. Both have a PostgreSQL implementation and
//! an in-memory one ([`MemoryStore`]) used by tests and by the `memory`
//! backend.

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryStore;
pub use postgres::{PgOwnerRepository, PgVetRepository};

use crate::error::ClinicError;
use crate::model::{Owner, PetType, Vet};
use crate::page::{Page, PageRequest};
use std::sync::Arc;

pub trait OwnerRepository: Send + Sync {
    /// All pet types ordered by name.
    fn find_pet_types(&self) -> Result<Vec<PetType>, ClinicError>;

    /// The owner with pets (and their types and visits), if it exists.
    fn find_by_id(&self, id: i32) -> Result<Option<Owner>, ClinicError>;

    /// Owners whose last name starts with `last_name`, ordered by id.
    ///
    /// The match is case-sensitive; an empty prefix matches every owner.
    fn find_by_last_name(
        &self,
        last_name: &str,
        page: PageRequest,
    ) -> Result<Page<Owner>, ClinicError>;

    fn find_all(&self, page: PageRequest) -> Result<Page<Owner>, ClinicError>;

    /// Insert or update the owner, its pets and their visits atomically.
    ///
    /// Generated ids are written back into `owner`.
    fn save(&self, owner: &mut Owner) -> Result<(), ClinicError>;
}

pub trait VetRepository: Send + Sync {
    fn find_all(&self) -> Result<Vec<Vet>, ClinicError>;

    fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError>;
}

impl<T: VetRepository + ?Sized> VetRepository for Arc<T> {
    fn find_all(&self) -> Result<Vec<Vet>, ClinicError> {
        (**self).find_all()
    }

    fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError> {
        (**self).find_all_paged(page)
    }
}
