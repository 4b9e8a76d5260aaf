use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

/// Any status may be set at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum MaintenanceStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl MaintenanceStatus {
    pub const ALL: &'static [&'static str] = &["Pending", "In Progress", "Completed"];
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaintenanceStatus::Pending => write!(f, "Pending"),
            MaintenanceStatus::InProgress => write!(f, "In Progress"),
            MaintenanceStatus::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: &'static [&'static str] = &["Low", "Medium", "High"];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Maintenance {
    #[schema(example = "Bottling line filter change")]
    pub name: String,
    pub date: NaiveDate,
    pub description: String,
    pub status: MaintenanceStatus,
    pub priority: Priority,
    #[schema(example = "Ruwan")]
    pub technician: String,
}

static MAINTENANCE_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("name", "Name").required().max_length(120),
        Field::date("date", "Date").required(),
        Field::text("description", "Description").required(),
        Field::choice("status", "Status", MaintenanceStatus::ALL).required(),
        Field::choice("priority", "Priority", Priority::ALL).required(),
        Field::text("technician", "Technician")
            .required()
            .pattern(r"^[A-Za-z .]+$", "Technician may only contain letters and spaces"),
    ])
});

impl Resource for Maintenance {
    const COLLECTION: &'static str = "maintenance";
    const SINGULAR: &'static str = "maintenance";
    const PLURAL: &'static str = "maintenances";
    const LABEL: &'static str = "Maintenance task";

    fn form_schema() -> &'static FormSchema {
        &MAINTENANCE_SCHEMA
    }
}

impl TableRow for Maintenance {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.technician)
    }

    fn facet(&self) -> Option<String> {
        Some(self.status.to_string())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec!["Name", "Date", "Status", "Priority", "Technician", "Description"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.status.to_string(),
            self.priority.to_string(),
            self.technician.clone(),
            self.description.clone(),
        ]
    }
}
