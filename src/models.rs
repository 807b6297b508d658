use serde::{Deserialize, Deserializer, Serialize};

// Same shape in memory and on disk. Salary 0 means "not specified".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub salary_from: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub salary_to: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String, // ISO-8601, e.g. 2024-03-01T10:15:00+0300
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: String,
}

impl Listing {
    pub fn has_salary_from(&self) -> bool {
        self.salary_from != 0
    }

    pub fn has_salary_to(&self) -> bool {
        self.salary_to != 0
    }
}

// Files written by older tools carry `null` for absent fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Raw records as the listing service returns them ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<RawVacancy>,
    #[serde(default)]
    pub found: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVacancy {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternate_url: Option<String>,
    #[serde(default)]
    pub salary: Option<RawSalary>,
    #[serde(default)]
    pub snippet: Option<RawSnippet>,
    // Full HTML body; only present on detail lookups.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub employer: Option<Named>,
    #[serde(default)]
    pub area: Option<Named>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub experience: Option<Named>,
    #[serde(default)]
    pub employment: Option<Named>,
    #[serde(default)]
    pub schedule: Option<Named>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSalary {
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnippet {
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub responsibility: Option<String>,
}

// The `{ "id": ..., "name": ... }` objects the service uses for categories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}
