//! In-process store implementing both repository traits.

use super::{seed, OwnerRepository, VetRepository};
use crate::error::ClinicError;
use crate::model::{Owner, PetType, Vet};
use crate::page::{Page, PageRequest};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    owners: BTreeMap<i32, Owner>,
    pet_types: Vec<PetType>,
    vets: Vec<Vet>,
    next_owner_id: i32,
    next_pet_id: i32,
    next_visit_id: i32,
}

impl Tables {
    fn fresh() -> Self {
        Self {
            next_owner_id: 1,
            next_pet_id: 1,
            next_visit_id: 1,
            ..Self::default()
        }
    }

    fn reset_sequences(&mut self) {
        let pets = self.owners.values().flat_map(|o| o.pets());
        self.next_owner_id = self.owners.keys().max().map_or(1, |id| id + 1);
        self.next_pet_id = pets.clone().filter_map(|p| p.id).max().map_or(1, |id| id + 1);
        self.next_visit_id = pets
            .flat_map(|p| p.visits())
            .filter_map(|v| v.id)
            .max()
            .map_or(1, |id| id + 1);
    }

    fn owners_matching(&self, prefix: &str) -> Vec<Owner> {
        self.owners
            .values()
            .filter(|o| o.last_name.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Thread-safe in-memory clinic database.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// An empty store with no pet types, owners or vets.
    pub fn empty() -> Self {
        Self {
            tables: Mutex::new(Tables::fresh()),
        }
    }

    /// A store holding the demo clinic data.
    pub fn seeded() -> Self {
        let mut tables = Tables::fresh();
        tables.pet_types = seed::pet_types();
        tables.vets = seed::vets();
        tables.owners = seed::owners()
            .into_iter()
            .filter_map(|o| o.id.map(|id| (id, o)))
            .collect();
        tables.reset_sequences();
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, ClinicError> {
        self.tables
            .lock()
            .map_err(|_| ClinicError::Internal("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl OwnerRepository for MemoryStore {
    fn find_pet_types(&self) -> Result<Vec<PetType>, ClinicError> {
        let mut types = self.lock()?.pet_types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Owner>, ClinicError> {
        Ok(self.lock()?.owners.get(&id).cloned())
    }

    fn find_by_last_name(
        &self,
        last_name: &str,
        page: PageRequest,
    ) -> Result<Page<Owner>, ClinicError> {
        Ok(page.slice(&self.lock()?.owners_matching(last_name)))
    }

    fn find_all(&self, page: PageRequest) -> Result<Page<Owner>, ClinicError> {
        Ok(page.slice(&self.lock()?.owners_matching("")))
    }

    fn save(&self, owner: &mut Owner) -> Result<(), ClinicError> {
        let mut tables = self.lock()?;
        let mut staged = owner.clone();

        let owner_id = match staged.id {
            Some(id) if tables.owners.contains_key(&id) => id,
            Some(id) => return Err(ClinicError::owner_not_found(id)),
            None => {
                let id = tables.next_owner_id;
                tables.next_owner_id += 1;
                id
            }
        };
        staged.id = Some(owner_id);

        for pet in staged.pets_mut() {
            if pet.is_new() {
                pet.id = Some(tables.next_pet_id);
                tables.next_pet_id += 1;
            }
            for visit in pet.visits_mut() {
                if visit.is_new() {
                    visit.id = Some(tables.next_visit_id);
                    tables.next_visit_id += 1;
                }
            }
        }
        staged.pets.sort_by(|a, b| a.name.cmp(&b.name));

        tables.owners.insert(owner_id, staged.clone());
        *owner = staged;
        Ok(())
    }
}

impl VetRepository for MemoryStore {
    fn find_all(&self) -> Result<Vec<Vet>, ClinicError> {
        Ok(self.lock()?.vets.clone())
    }

    fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError> {
        Ok(page.slice(&self.lock()?.vets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pet, Visit};
    use chrono::NaiveDate;

    fn new_owner(last_name: &str) -> Owner {
        Owner {
            first_name: "Sam".to_string(),
            last_name: last_name.to_string(),
            address: "4, Evans Street".to_string(),
            city: "Wollongong".to_string(),
            telephone: "4444444444".to_string(),
            ..Owner::default()
        }
    }

    #[test]
    fn test_find_by_last_name_prefix() {
        let store = MemoryStore::seeded();
        let page = store
            .find_by_last_name("Davis", PageRequest::new(1, 5))
            .expect("query");
        assert_eq!(page.total_elements(), 2);
        assert!(page.content().iter().all(|o| o.last_name == "Davis"));

        let none = store
            .find_by_last_name("Daviss", PageRequest::new(1, 5))
            .expect("query");
        assert!(none.is_empty());

        let case_sensitive = store
            .find_by_last_name("davis", PageRequest::new(1, 5))
            .expect("query");
        assert!(case_sensitive.is_empty());
    }

    #[test]
    fn test_empty_prefix_pages_through_everyone() {
        let store = MemoryStore::seeded();
        let first = store.find_by_last_name("", PageRequest::new(1, 5)).expect("query");
        assert_eq!(first.total_elements(), 10);
        assert_eq!(first.total_pages(), 2);
        assert_eq!(first.content().len(), 5);
        assert_eq!(first.content()[0].id, Some(1));

        let second = OwnerRepository::find_all(&store, PageRequest::new(2, 5)).expect("query");
        assert_eq!(second.content()[0].id, Some(6));
    }

    #[test]
    fn test_pet_types_sorted_by_name() {
        let store = MemoryStore::seeded();
        let names: Vec<_> = store
            .find_pet_types()
            .expect("types")
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["bird", "cat", "dog", "hamster", "lizard", "snake"]);
    }

    #[test]
    fn test_save_assigns_ids_and_is_retrievable() {
        let store = MemoryStore::seeded();
        let dog = store
            .find_pet_types()
            .expect("types")
            .into_iter()
            .find(|t| t.name == "dog")
            .expect("dog");

        let mut owner = new_owner("Schultz");
        store.save(&mut owner).expect("save owner");
        let owner_id = owner.id.expect("owner id");
        assert_eq!(owner_id, 11);

        let mut pet = Pet::new();
        pet.name = "bowser".to_string();
        pet.birth_date = NaiveDate::from_ymd_opt(2020, 5, 1);
        pet.pet_type = Some(dog);
        owner.add_pet(pet);
        store.save(&mut owner).expect("save pet");
        let pet_id = owner.pet_by_name("bowser", false).and_then(|p| p.id).expect("pet id");

        let mut visit = Visit::new();
        visit.description = "check-up".to_string();
        owner.add_visit(pet_id, visit).expect("add visit");
        store.save(&mut owner).expect("save visit");

        let loaded = store.find_by_id(owner_id).expect("load").expect("owner exists");
        assert_eq!(loaded.last_name, "Schultz");
        let pet = loaded.pet_by_id(pet_id).expect("pet stored");
        assert_eq!(pet.visits().len(), 1);
        assert!(pet.visits()[0].id.is_some());
    }

    #[test]
    fn test_save_unknown_owner_fails() {
        let store = MemoryStore::empty();
        let mut owner = new_owner("Ghost");
        owner.id = Some(404);
        assert!(matches!(
            store.save(&mut owner),
            Err(ClinicError::NotFound { entity: "Owner", id: 404 })
        ));
    }
}
