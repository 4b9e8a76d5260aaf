use crate::forms::{FieldErrors, FormSchema};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record as it leaves the document store: id and timestamps around the fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A field that must name an existing record in another collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub collection: &'static str,
    pub field: &'static str,
    pub value: String,
    pub label: &'static str,
}

pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name; also the path segment under `/api`.
    const COLLECTION: &'static str;
    /// Envelope key for a single record.
    const SINGULAR: &'static str;
    /// Envelope key for a list.
    const PLURAL: &'static str;
    /// Human name used in messages.
    const LABEL: &'static str;

    fn form_schema() -> &'static FormSchema;

    /// Recomputes derived fields.
    fn normalize(&mut self) {}

    /// Checks that span fields or nested documents.
    fn check(&self) -> Result<(), FieldErrors> {
        Ok(())
    }

    /// `(wire field name, value)` pairs that must be unique in the collection.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Checked on creation only.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// How a record shows up in admin list views and exports.
pub trait TableRow {
    fn search_text(&self) -> String;

    /// Value for the dropdown filter (category, status, department...).
    fn facet(&self) -> Option<String> {
        None
    }

    fn csv_headers() -> Vec<&'static str>
    where
        Self: Sized;

    fn csv_row(&self) -> Vec<String>;

    fn csv_totals(_rows: &[&Self]) -> Option<Vec<String>>
    where
        Self: Sized,
    {
        None
    }
}

/// Formats amounts for exports: integers without a fraction, otherwise two places.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
