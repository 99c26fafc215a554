//! Casting untyped JSON items into [`CigarLineFields`].
//!
//! Batch payloads arrive as arbitrary JSON. Each item is cast field by field
//! the way a document schema casts: scalars are converted where a lossless
//! text or numeric reading exists, single values are wrapped into lists, and
//! unknown keys are dropped. Anything else fails with a [`CastError`] naming
//! the dotted path of the offending field.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{CigarLineFields, CigarRating, Pairings};

/// Why an item could not be turned into a cigar line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    #[error("cigar line must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Cast to {expected} failed for value {value} (type {kind}) at path \"{path}\"")]
    Field {
        expected: &'static str,
        value: String,
        kind: &'static str,
        path: String,
    },
}

impl CastError {
    fn field(expected: &'static str, value: &Value, path: &str) -> Self {
        CastError::Field {
            expected,
            value: value.to_string(),
            kind: kind_of(value),
            path: path.to_string(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CigarLineFields {
    /// Casts a JSON item into cigar-line fields.
    pub fn cast(item: &Value) -> Result<Self, CastError> {
        let obj = item
            .as_object()
            .ok_or_else(|| CastError::NotAnObject(kind_of(item)))?;

        Ok(Self {
            brand_name: text(obj.get("brand_name"), "brand_name")?,
            line_name: text(obj.get("line_name"), "line_name")?,
            origin_country: text(obj.get("origin_country"), "origin_country")?,
            wrapper_leaf: text(obj.get("wrapper_leaf"), "wrapper_leaf")?,
            binder_leaf: text(obj.get("binder_leaf"), "binder_leaf")?,
            filler_leaf: text(obj.get("filler_leaf"), "filler_leaf")?,
            strength: text(obj.get("strength"), "strength")?,
            strength_level_numeric: number(
                obj.get("strength_level_numeric"),
                "strength_level_numeric",
            )?,
            flavor_profile_notes: text(obj.get("flavor_profile_notes"), "flavor_profile_notes")?,
            approximate_price_range: text(
                obj.get("approximate_price_range"),
                "approximate_price_range",
            )?,
            cigar_ratings: ratings(obj.get("cigar_ratings"))?,
            pairings: pairings(obj.get("pairings"))?,
        })
    }
}

fn text(value: Option<&Value>, path: &str) -> Result<Option<String>, CastError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(CastError::field("string", other, path)),
    }
}

fn number(value: Option<&Value>, path: &str) -> Result<Option<f64>, CastError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v @ Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| CastError::field("Number", v, path)),
        Some(v @ Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(CastError::field("Number", v, path)),
            }
        }
        Some(Value::Bool(b)) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Some(other) => Err(CastError::field("Number", other, path)),
    }
}

fn text_list(value: Option<&Value>, path: &str) -> Result<Vec<String>, CastError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                if let Some(s) = text(Some(item), &format!("{}.{}", path, i))? {
                    out.push(s);
                }
            }
            Ok(out)
        }
        Some(single) => Ok(text(Some(single), path)?.into_iter().collect()),
    }
}

fn ratings(value: Option<&Value>) -> Result<Vec<CigarRating>, CastError> {
    const PATH: &str = "cigar_ratings";
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| rating(item, &format!("{}.{}", PATH, i)))
            .collect(),
        Some(single @ Value::Object(_)) => Ok(vec![rating(single, &format!("{}.0", PATH))?]),
        Some(other) => Err(CastError::field("Array", other, PATH)),
    }
}

fn rating(value: &Value, path: &str) -> Result<CigarRating, CastError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CastError::field("Embedded", value, path))?;
    let at = |key: &str| format!("{}.{}", path, key);

    Ok(CigarRating {
        publication: text(obj.get("publication"), &at("publication"))?,
        score: number(obj.get("score"), &at("score"))?,
        vitola_rated: text(obj.get("vitola_rated"), &at("vitola_rated"))?,
        year_rated: number(obj.get("year_rated"), &at("year_rated"))?,
        notes: text(obj.get("notes"), &at("notes"))?,
    })
}

fn pairings(value: Option<&Value>) -> Result<Pairings, CastError> {
    const PATH: &str = "pairings";
    let obj: &Map<String, Value> = match value {
        None | Some(Value::Null) => return Ok(Pairings::default()),
        Some(Value::Object(obj)) => obj,
        Some(other) => return Err(CastError::field("Object", other, PATH)),
    };
    let category = |name: &str| text_list(obj.get(name), &format!("{}.{}", PATH, name));

    Ok(Pairings {
        coffee: category("coffee")?,
        bourbon: category("bourbon")?,
        scotch: category("scotch")?,
        cognac: category("cognac")?,
        wine: category("wine")?,
        food: category("food")?,
        beer: category("beer")?,
    })
}
