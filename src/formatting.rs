//! Conversions between form text and domain values.

use crate::error::ClinicError;
use crate::model::{PetType, DATE_FORMAT};
use crate::repository::OwnerRepository;
use chrono::NaiveDate;
use std::fmt;

/// Text that could not be converted into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Prints pet types by name and resolves submitted names against the
/// stored types.
pub struct PetTypeFormatter<'a> {
    owners: &'a dyn OwnerRepository,
}

impl<'a> PetTypeFormatter<'a> {
    pub fn new(owners: &'a dyn OwnerRepository) -> Self {
        Self { owners }
    }

    pub fn print(&self, pet_type: &PetType) -> String {
        pet_type.name.clone()
    }

    /// Exact, case-sensitive lookup.
    ///
    /// The outer error is a repository failure; the inner one is a name that
    /// matches no stored type.
    pub fn parse(&self, text: &str) -> Result<Result<PetType, ParseError>, ClinicError> {
        let found = self
            .owners
            .find_pet_types()?
            .into_iter()
            .find(|t| t.name == text);
        Ok(found.ok_or_else(|| ParseError(format!("type not found: {text}"))))
    }
}

pub fn print_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `yyyy-MM-dd` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| ParseError(format!("invalid date '{text}': {e}")))
}
