use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

/// A veterinary skill category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specialty {
    pub id: Option<i32>,
    pub name: String,
}

impl Specialty {
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

impl Serialize for Specialty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Specialty", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("new", &self.is_new())?;
        state.end()
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A veterinarian and the specialties they practise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vet {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub(crate) specialties: Vec<Specialty>,
}

impl Vet {
    pub fn new(id: i32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            specialties: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Adds a specialty unless the vet already has it.
    pub fn add_specialty(&mut self, specialty: Specialty) {
        if !self.specialties.contains(&specialty) {
            self.specialties.push(specialty);
        }
    }

    /// Specialties sorted by name, ignoring case.
    pub fn specialties(&self) -> Vec<&Specialty> {
        let mut sorted: Vec<&Specialty> = self.specialties.iter().collect();
        sorted.sort_by_cached_key(|s| s.name.to_lowercase());
        sorted
    }

    pub fn nr_of_specialties(&self) -> usize {
        self.specialties.len()
    }
}

impl Serialize for Vet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Vet", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("firstName", &self.first_name)?;
        state.serialize_field("lastName", &self.last_name)?;
        state.serialize_field("specialties", &self.specialties())?;
        state.serialize_field("nrOfSpecialties", &self.nr_of_specialties())?;
        state.serialize_field("new", &self.is_new())?;
        state.end()
    }
}

/// Wrapper used by the `/vets` JSON and XML representations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vets {
    #[serde(rename = "vetList")]
    pub vet_list: Vec<Vet>,
}

impl Vets {
    pub fn new(vet_list: Vec<Vet>) -> Self {
        Self { vet_list }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialties_sorted_case_insensitively() {
        let mut vet = Vet::new(1, "Helen", "Leary");
        vet.add_specialty(Specialty::new(2, "surgery"));
        vet.add_specialty(Specialty::new(4, "Dentistry"));
        vet.add_specialty(Specialty::new(1, "radiology"));
        vet.add_specialty(Specialty::new(5, "Anesthesia"));

        let names: Vec<_> = vet.specialties().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Anesthesia", "Dentistry", "radiology", "surgery"]);
        assert_eq!(vet.nr_of_specialties(), 4);
    }

    #[test]
    fn test_duplicate_specialty_is_ignored() {
        let mut vet = Vet::new(3, "Linda", "Douglas");
        vet.add_specialty(Specialty::new(2, "surgery"));
        vet.add_specialty(Specialty::new(2, "surgery"));
        assert_eq!(vet.nr_of_specialties(), 1);
    }

    #[test]
    fn test_vets_json_shape() {
        let mut vet = Vet::new(2, "Helen", "Leary");
        vet.add_specialty(Specialty::new(1, "radiology"));
        let json = serde_json::to_value(Vets::new(vec![vet])).expect("serialize");

        assert_eq!(json["vetList"][0]["firstName"], "Helen");
        assert_eq!(
            json["vetList"][0]["specialties"][0],
            serde_json::json!({"id": 1, "name": "radiology", "new": false})
        );
        assert_eq!(json["vetList"][0]["nrOfSpecialties"], 1);
        assert_eq!(json["vetList"][0]["new"], false);
    }
}
