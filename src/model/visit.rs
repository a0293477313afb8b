use chrono::NaiveDate;

/// A dated clinical record attached to a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub id: Option<i32>,
    pub date: NaiveDate,
    pub description: String,
}

impl Visit {
    /// A new visit dated today.
    pub fn new() -> Self {
        Self::on(super::today())
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            id: None,
            date,
            description: String::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl Default for Visit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_visit_is_dated_today() {
        let visit = Visit::new();
        assert!(visit.is_new());
        assert_eq!(visit.date, crate::model::today());
        assert!(visit.description.is_empty());
    }
}
