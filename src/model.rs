use std::fmt;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub state_capital: Option<String>,
    #[serde(default)]
    pub surface: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub phone_prefix: Option<String>,
    #[serde(default)]
    pub internet_domain: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sub_region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub borders: Vec<String>,
}

/// Nested `{ "name": ... }` reference the API uses for cities and departments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city_capital: Option<NamedRef>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub municipalities: Option<u64>,
    #[serde(default)]
    pub surface: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Region {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TouristAttraction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<NamedRef>,
    #[serde(default)]
    pub latitude: Option<Scalar>,
    #[serde(default)]
    pub longitude: Option<Scalar>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypicalDish {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub department: Option<NamedRef>,
}

/// A value the API sends either as a JSON string or as a number (coordinates).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// Empty strings and numeric zero count as missing.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(s) => s.trim().is_empty(),
            Scalar::Number(n) => n.as_f64() == Some(0.0),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s.trim()),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Number of records a decoded response carried, for logging and progress.
pub trait Records {
    fn record_count(&self) -> usize;
}

impl<T> Records for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl Records for CountryInfo {
    fn record_count(&self) -> usize {
        1
    }
}
