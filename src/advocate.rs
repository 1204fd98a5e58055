use std::cmp::Ordering;

use clap::ValueEnum;

/// One entry of the advocate directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advocate {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    #[default]
    #[value(name = "firstName")]
    FirstName,
    #[value(name = "lastName")]
    LastName,
}

impl SortKey {
    pub fn value(self) -> &'static str {
        match self {
            SortKey::FirstName => "firstName",
            SortKey::LastName => "lastName",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::FirstName => "First Name",
            SortKey::LastName => "Last Name",
        }
    }

    pub fn other(self) -> SortKey {
        match self {
            SortKey::FirstName => SortKey::LastName,
            SortKey::LastName => SortKey::FirstName,
        }
    }

    fn field(self, advocate: &Advocate) -> &str {
        match self {
            SortKey::FirstName => &advocate.first_name,
            SortKey::LastName => &advocate.last_name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Accepts exactly `asc` or `desc`.
    pub fn parse(raw: &str) -> Option<SortOrder> {
        match raw {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Asc => "Ascending",
            SortOrder::Desc => "Descending",
        }
    }

    pub fn other(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Orders advocates by the selected name, case-insensitive, ties broken by id.
pub fn compare(a: &Advocate, b: &Advocate, key: SortKey, order: SortOrder) -> Ordering {
    let ordering = key
        .field(a)
        .to_lowercase()
        .cmp(&key.field(b).to_lowercase())
        .then(a.id.cmp(&b.id));
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u64, first_name: &str, last_name: &str) -> Advocate {
    Advocate {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        city: "Austin".to_string(),
        degree: "MD".to_string(),
        specialties: vec!["Cardiology".to_string()],
        years_of_experience: 5,
        phone_number: "5551234567".to_string(),
    }
}
