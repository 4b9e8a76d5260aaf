use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{Resource, Stored, TableRow};
use crate::utils::csv::records_csv;
use crate::utils::pdf::records_pdf;

/// Row being edited in place.
#[derive(Debug, Clone)]
struct InlineEdit {
    id: String,
    values: Map<String, Value>,
}

/// Search, dropdown filter and inline editing over a list of records.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    query: String,
    facet: Option<String>,
    editing: Option<InlineEdit>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Resource + TableRow> Default for TableView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource + TableRow> TableView<T> {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            facet: None,
            editing: None,
            _record: PhantomData,
        }
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
    }

    /// `None` shows every facet value.
    pub fn filter(&mut self, facet: Option<&str>) {
        self.facet = facet.filter(|f| !f.is_empty()).map(str::to_string);
    }

    pub fn visible<'a>(&self, items: &'a [Stored<T>]) -> Vec<&'a Stored<T>> {
        items
            .iter()
            .filter(|item| {
                self.query.is_empty()
                    || item.record.search_text().to_lowercase().contains(&self.query)
            })
            .filter(|item| match &self.facet {
                Some(facet) => item.record.facet().as_deref() == Some(facet.as_str()),
                None => true,
            })
            .collect()
    }

    /// Distinct facet values, sorted, for the filter dropdown.
    pub fn facets(&self, items: &[Stored<T>]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.record.facet())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn begin_edit(&mut self, item: &Stored<T>) -> AppResult<()> {
        let Value::Object(values) = serde_json::to_value(&item.record)? else {
            return Err(AppError::InternalError(format!(
                "{} does not serialize to an object",
                T::LABEL
            )));
        };
        self.editing = Some(InlineEdit {
            id: item.id.clone(),
            values,
        });
        Ok(())
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.id.as_str())
    }

    pub fn set_cell(&mut self, field: &str, value: impl Into<Value>) -> AppResult<()> {
        let edit = self
            .editing
            .as_mut()
            .ok_or_else(|| AppError::ValidationError("No row is being edited".to_string()))?;
        edit.values.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Validates the edited row and hands back `(id, record)` for an update.
    /// The row stays in edit mode when validation fails.
    pub fn commit(&mut self) -> AppResult<(String, T)> {
        let edit = self
            .editing
            .as_ref()
            .ok_or_else(|| AppError::ValidationError("No row is being edited".to_string()))?;

        let values = T::form_schema().coerce(edit.values.clone());
        T::form_schema()
            .validate(&values)
            .map_err(AppError::InvalidFields)?;
        let mut record: T = serde_json::from_value(Value::Object(values))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        record.normalize();
        record.check().map_err(AppError::InvalidFields)?;

        let id = edit.id.clone();
        self.editing = None;
        Ok((id, record))
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Records of the visible rows; empty means nothing to export.
    fn export_rows<'a>(&self, items: &'a [Stored<T>]) -> Vec<&'a T> {
        let rows: Vec<&T> = self.visible(items).into_iter().map(|s| &s.record).collect();
        if rows.is_empty() {
            log::warn!("Nothing to export for {}", T::LABEL);
        }
        rows
    }

    /// CSV of the visible rows; `None` when there is nothing to export.
    pub fn export_csv(&self, items: &[Stored<T>]) -> Option<String> {
        let rows = self.export_rows(items);
        if rows.is_empty() {
            return None;
        }
        Some(records_csv(&rows))
    }

    /// PDF of the visible rows; `None` when there is nothing to export or
    /// the document could not be rendered.
    pub fn export_pdf(&self, items: &[Stored<T>]) -> Option<Vec<u8>> {
        let rows = self.export_rows(items);
        if rows.is_empty() {
            return None;
        }
        match records_pdf(&format!("{} records", T::LABEL), &rows) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::error!("Failed to render {} PDF: {e}", T::LABEL);
                None
            }
        }
    }

    /// Writes the visible rows to `path`. Failures are logged, never raised.
    pub fn export_csv_to(&self, items: &[Stored<T>], path: &Path) -> bool {
        match self.export_csv(items) {
            Some(csv) => write_export::<T>(path, csv.as_bytes()),
            None => false,
        }
    }

    /// Same as `export_csv_to`, as a PDF document.
    pub fn export_pdf_to(&self, items: &[Stored<T>], path: &Path) -> bool {
        match self.export_pdf(items) {
            Some(pdf) => write_export::<T>(path, &pdf),
            None => false,
        }
    }
}

fn write_export<T: Resource>(path: &Path, contents: &[u8]) -> bool {
    match std::fs::write(path, contents) {
        Ok(()) => {
            log::info!("Exported {} records to {}", T::LABEL, path.display());
            true
        }
        Err(e) => {
            log::error!("Failed to export {} records: {e}", T::LABEL);
            false
        }
    }
}
