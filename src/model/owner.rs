use super::{Pet, Visit};
use crate::error::ClinicError;

/// A clinic customer with contact details and pets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
    pub(crate) pets: Vec<Pet>,
}

impl Owner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Pets ordered by name.
    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn pets_mut(&mut self) -> &mut [Pet] {
        &mut self.pets
    }

    /// Adds the pet when it is new; stored pets are already part of the owner.
    pub fn add_pet(&mut self, pet: Pet) {
        if pet.is_new() {
            let at = self.pets.partition_point(|p| p.name <= pet.name);
            self.pets.insert(at, pet);
        }
    }

    /// Restore a stored pet while loading the aggregate.
    pub(crate) fn push_loaded_pet(&mut self, pet: Pet) {
        self.pets.push(pet);
    }

    pub fn pet_by_id(&self, id: i32) -> Option<&Pet> {
        self.pets.iter().find(|p| p.id == Some(id))
    }

    pub fn pet_by_id_mut(&mut self, id: i32) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|p| p.id == Some(id))
    }

    /// Case-insensitive lookup by name; `ignore_new` skips unsaved pets.
    pub fn pet_by_name(&self, name: &str, ignore_new: bool) -> Option<&Pet> {
        let name = name.to_lowercase();
        self.pets
            .iter()
            .filter(|p| !ignore_new || !p.is_new())
            .find(|p| p.name.to_lowercase() == name)
    }

    /// Replace a stored pet with an edited copy, keeping name order.
    pub fn update_pet(&mut self, pet: Pet) -> Result<(), ClinicError> {
        let id = pet.id.ok_or_else(|| ClinicError::BadRequest("cannot update an unsaved pet".to_string()))?;
        let slot = self.pet_by_id_mut(id).ok_or_else(|| ClinicError::pet_not_found(id))?;
        *slot = pet;
        self.pets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }

    /// Attach a visit to one of this owner's stored pets.
    pub fn add_visit(&mut self, pet_id: i32, visit: Visit) -> Result<(), ClinicError> {
        let pet = self
            .pet_by_id_mut(pet_id)
            .ok_or_else(|| ClinicError::pet_not_found(pet_id))?;
        pet.add_visit(visit);
        Ok(())
    }
}
