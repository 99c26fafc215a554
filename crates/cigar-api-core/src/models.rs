//! Cigar-line data model.
//!
//! [`CigarLineFields`] is the record content a client controls. [`CigarLine`]
//! is a stored record: the same content plus the store-assigned `_id` and the
//! `__v` revision counter.
//!
//! Defaults mirror a document schema: absent scalars stay absent (and are
//! omitted from JSON output), list-valued fields default to empty lists, and
//! `pairings` always carries every category.

use serde::{Deserialize, Serialize, Serializer};

/// A stored cigar line, as returned by every read and upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CigarLine {
    /// Store-assigned UUID, stable across updates.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: CigarLineFields,
    /// 0 on insert, incremented by every update.
    #[serde(rename = "__v")]
    pub revision: i64,
}

/// Client-supplied content of a cigar line.
///
/// Upserts replace a record's fields wholesale with a new value of this type,
/// so anything omitted from the update payload falls back to these defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CigarLineFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper_leaf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binder_leaf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_leaf: Option<String>,
    /// Free-form label such as `"Medium-Full"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub strength_level_numeric: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_profile_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximate_price_range: Option<String>,
    pub cigar_ratings: Vec<CigarRating>,
    pub pairings: Pairings,
}

impl CigarLineFields {
    /// The `(brand_name, line_name)` pair upserts match on.
    pub fn natural_key(&self) -> (Option<&str>, Option<&str>) {
        (self.brand_name.as_deref(), self.line_name.as_deref())
    }

    /// Text encoding of [`natural_key`](Self::natural_key) that keeps an
    /// absent component distinct from an empty string.
    pub fn natural_key_text(&self) -> String {
        serde_json::json!([self.brand_name, self.line_name]).to_string()
    }
}

/// A single published rating of one vitola in the line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CigarRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitola_rated: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number"
    )]
    pub year_rated: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Pairing suggestions grouped by drink or food category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pairings {
    pub coffee: Vec<String>,
    pub bourbon: Vec<String>,
    pub scotch: Vec<String>,
    pub cognac: Vec<String>,
    pub wine: Vec<String>,
    pub food: Vec<String>,
    pub beer: Vec<String>,
}

/// Writes whole numbers as JSON integers so `2019` does not come back as `2019.0`.
fn serialize_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT => serializer.serialize_i64(*n as i64),
        Some(n) => serializer.serialize_f64(*n),
        None => serializer.serialize_none(),
    }
}
