use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

/// A delivery run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Schedule {
    #[schema(example = "Kandy morning run")]
    pub name: String,
    #[schema(example = 40)]
    pub quantity: u32,
    #[schema(example = "Dispenser Bottles")]
    pub category: String,
    #[schema(example = "Kandy")]
    pub location: String,
    #[schema(example = "Sunil")]
    pub driver: String,
    #[schema(example = "3 hours")]
    pub duration: String,
}

static SCHEDULE_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("name", "Name").required(),
        Field::integer("quantity", "Quantity").required().min(1.0),
        Field::text("category", "Category").required(),
        Field::text("location", "Location").required(),
        Field::text("driver", "Driver")
            .required()
            .pattern(r"^[A-Za-z .]+$", "Driver may only contain letters and spaces"),
        Field::text("duration", "Duration").required(),
    ])
});

impl Resource for Schedule {
    const COLLECTION: &'static str = "schedules";
    const SINGULAR: &'static str = "schedule";
    const PLURAL: &'static str = "schedules";
    const LABEL: &'static str = "Schedule";

    fn form_schema() -> &'static FormSchema {
        &SCHEDULE_SCHEMA
    }
}

impl TableRow for Schedule {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.location, self.driver)
    }

    fn facet(&self) -> Option<String> {
        Some(self.category.clone())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec!["Name", "Quantity", "Category", "Location", "Driver", "Duration"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.quantity.to_string(),
            self.category.clone(),
            self.location.clone(),
            self.driver.clone(),
            self.duration.clone(),
        ]
    }
}
