use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: &'static [&'static str] = &["Male", "Female", "Other"];
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "employeeID")]
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "Kasun Silva")]
    pub name: String,
    #[schema(example = "Delivery Driver")]
    pub position: String,
    #[schema(example = "Logistics")]
    pub department: String,
    pub gender: Gender,
    #[schema(example = "199012345678")]
    pub nic: String,
    #[schema(example = "kasun@aquaflow.lk")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<NaiveDate>,
}

static EMPLOYEE_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("employeeID", "Employee ID").required().pattern(
            r"^[A-Za-z0-9-]+$",
            "Employee ID may only contain letters, digits and dashes",
        ),
        Field::text("name", "Name")
            .required()
            .pattern(r"^[A-Za-z .]+$", "Name may only contain letters and spaces")
            .max_length(100),
        Field::text("position", "Position").required(),
        Field::text("department", "Department").required(),
        Field::choice("gender", "Gender", Gender::ALL).required(),
        Field::text("nic", "NIC").required().pattern(
            r"^(\d{9}[VvXx]|\d{12})$",
            "NIC must be 9 digits followed by V or X, or 12 digits",
        ),
        Field::email("email", "Email").required(),
        Field::text("phone", "Phone")
            .pattern(r"^\+?\d{10,12}$", "Phone must contain 10 to 12 digits"),
        Field::date("joinedDate", "Joined date"),
    ])
});

impl Resource for Employee {
    const COLLECTION: &'static str = "employees";
    const SINGULAR: &'static str = "employee";
    const PLURAL: &'static str = "employees";
    const LABEL: &'static str = "Employee";

    fn form_schema() -> &'static FormSchema {
        &EMPLOYEE_SCHEMA
    }

    fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        self.nic = self.nic.to_uppercase();
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("employeeID", self.employee_id.clone()),
            ("nic", self.nic.clone()),
            ("email", self.email.clone()),
        ]
    }
}

impl TableRow for Employee {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.employee_id, self.name, self.email)
    }

    fn facet(&self) -> Option<String> {
        Some(self.department.clone())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "Employee ID",
            "Name",
            "Position",
            "Department",
            "Gender",
            "NIC",
            "Email",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.employee_id.clone(),
            self.name.clone(),
            self.position.clone(),
            self.department.clone(),
            self.gender.to_string(),
            self.nic.clone(),
            self.email.clone(),
        ]
    }
}
