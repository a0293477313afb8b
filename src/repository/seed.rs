//! Demo data loaded into a fresh [`super::MemoryStore`].
//!
//! Mirrors `migrations/m20240101000100_seed_clinic_data.sql`.

use crate::model::{Owner, Pet, PetType, Specialty, Vet, Visit};
use chrono::NaiveDate;

const PET_TYPES: &[(i32, &str)] = &[
    (1, "cat"),
    (2, "dog"),
    (3, "lizard"),
    (4, "snake"),
    (5, "bird"),
    (6, "hamster"),
];

const SPECIALTIES: &[(i32, &str)] = &[(1, "radiology"), (2, "surgery"), (3, "dentistry")];

const VETS: &[(i32, &str, &str)] = &[
    (1, "James", "Carter"),
    (2, "Helen", "Leary"),
    (3, "Linda", "Douglas"),
    (4, "Rafael", "Ortega"),
    (5, "Henry", "Stevens"),
    (6, "Sharon", "Jenkins"),
];

// (vet_id, specialty_id)
const VET_SPECIALTIES: &[(i32, i32)] = &[(2, 1), (3, 2), (3, 3), (4, 2), (5, 1)];

const OWNERS: &[(i32, &str, &str, &str, &str, &str)] = &[
    (1, "George", "Franklin", "110 W. Liberty St.", "Madison", "6085551023"),
    (2, "Betty", "Davis", "638 Cardinal Ave.", "Sun Prairie", "6085551749"),
    (3, "Eduardo", "Rodriquez", "2693 Commerce St.", "McFarland", "6085558763"),
    (4, "Harold", "Davis", "563 Friendly St.", "Windsor", "6085553198"),
    (5, "Peter", "McTavish", "2387 S. Fair Way", "Madison", "6085552765"),
    (6, "Jean", "Coleman", "105 N. Lake St.", "Monona", "6085552654"),
    (7, "Jeff", "Black", "1450 Oak Blvd.", "Monona", "6085555387"),
    (8, "Maria", "Escobito", "345 Maple St.", "Madison", "6085557683"),
    (9, "David", "Schroeder", "2749 Blackhawk Trail", "Madison", "6085559435"),
    (10, "Carlos", "Estaban", "2335 Independence La.", "Waunakee", "6085555487"),
];

// (id, name, birth_date, type_id, owner_id)
const PETS: &[(i32, &str, &str, i32, i32)] = &[
    (1, "Leo", "2010-09-07", 1, 1),
    (2, "Basil", "2012-08-06", 6, 2),
    (3, "Rosy", "2011-04-17", 2, 3),
    (4, "Jewel", "2010-03-07", 2, 3),
    (5, "Iggy", "2010-11-30", 3, 4),
    (6, "George", "2010-01-20", 4, 5),
    (7, "Samantha", "2012-09-04", 1, 6),
    (8, "Max", "2012-09-04", 1, 6),
    (9, "Lucky", "2011-08-06", 5, 7),
    (10, "Mulligan", "2007-02-24", 2, 8),
    (11, "Freddy", "2010-03-09", 5, 9),
    (12, "Lucky", "2010-06-24", 2, 10),
    (13, "Sly", "2012-06-08", 1, 10),
];

// (id, pet_id, visit_date, description)
const VISITS: &[(i32, i32, &str, &str)] = &[
    (1, 7, "2013-01-01", "rabies shot"),
    (2, 8, "2013-01-02", "rabies shot"),
    (3, 8, "2013-01-03", "neutered"),
    (4, 7, "2013-01-04", "spayed"),
];

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, crate::model::DATE_FORMAT)
        .unwrap_or_else(|e| panic!("bad seed date {text}: {e}"))
}

pub(super) fn pet_types() -> Vec<PetType> {
    PET_TYPES
        .iter()
        .map(|&(id, name)| PetType::new(id, name))
        .collect()
}

pub(super) fn vets() -> Vec<Vet> {
    VETS.iter()
        .map(|&(id, first, last)| {
            let mut vet = Vet::new(id, first, last);
            for &(_, specialty_id) in VET_SPECIALTIES.iter().filter(|(v, _)| *v == id) {
                if let Some(&(sid, name)) = SPECIALTIES.iter().find(|(s, _)| *s == specialty_id) {
                    vet.add_specialty(Specialty::new(sid, name));
                }
            }
            vet
        })
        .collect()
}

pub(super) fn owners() -> Vec<Owner> {
    let types = pet_types();
    OWNERS
        .iter()
        .map(|&(id, first, last, address, city, telephone)| {
            let mut owner = Owner {
                id: Some(id),
                first_name: first.to_string(),
                last_name: last.to_string(),
                address: address.to_string(),
                city: city.to_string(),
                telephone: telephone.to_string(),
                ..Owner::default()
            };
            let mut pets: Vec<Pet> = PETS
                .iter()
                .filter(|p| p.4 == id)
                .map(|&(pet_id, name, birth, type_id, _)| {
                    let mut pet = Pet {
                        id: Some(pet_id),
                        name: name.to_string(),
                        birth_date: Some(date(birth)),
                        pet_type: types.iter().find(|t| t.id == Some(type_id)).cloned(),
                        ..Pet::default()
                    };
                    for &(visit_id, _, day, description) in VISITS.iter().filter(|v| v.1 == pet_id) {
                        pet.add_visit(Visit {
                            id: Some(visit_id),
                            date: date(day),
                            description: description.to_string(),
                        });
                    }
                    pet
                })
                .collect();
            pets.sort_by(|a, b| a.name.cmp(&b.name));
            for pet in pets {
                owner.push_loaded_pet(pet);
            }
            owner
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_consistent() {
        let owners = owners();
        assert_eq!(owners.len(), 10);
        let pets: usize = owners.iter().map(|o| o.pets().len()).sum();
        assert_eq!(pets, PETS.len());
        assert!(owners
            .iter()
            .flat_map(|o| o.pets())
            .all(|p| p.pet_type.is_some() && p.birth_date.is_some()));

        let vets = vets();
        assert_eq!(vets.len(), 6);
        assert_eq!(vets[2].nr_of_specialties(), 2);
    }
}
