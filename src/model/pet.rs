use super::Visit;
use chrono::NaiveDate;
use std::fmt;

/// Kind of animal (cat, dog, ...). Stored in the `types` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PetType {
    pub id: Option<i32>,
    pub name: String,
}

impl PetType {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An animal belonging to an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pet {
    pub id: Option<i32>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub pet_type: Option<PetType>,
    pub(crate) visits: Vec<Visit>,
}

impl Pet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Visits ordered by date, oldest first.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn visits_mut(&mut self) -> &mut [Visit] {
        &mut self.visits
    }

    pub fn add_visit(&mut self, visit: Visit) {
        // Insert after visits on the same day to keep booking order.
        let at = self.visits.partition_point(|v| v.date <= visit.date);
        self.visits.insert(at, visit);
    }
}
