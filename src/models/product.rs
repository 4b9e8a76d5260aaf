use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow, format_amount};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "Spring Water 19L")]
    pub name: String,
    #[schema(example = "Refillable dispenser bottle")]
    pub description: String,
    #[schema(example = 850.0)]
    pub price: f64,
    #[schema(example = 120)]
    pub quantity: i64,
    #[schema(example = "Dispenser Bottles")]
    pub category: String,
    /// Public path of the uploaded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/uploads/1714550400000-9e107d9d372bb6826bd81d3542a419d6.png")]
    pub image: Option<String>,
}

/// Multipart body of product create and update requests.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProductForm {
    #[schema(example = "Spring Water 19L")]
    name: String,
    description: String,
    price: f64,
    quantity: i64,
    category: String,
    /// JPEG, PNG or GIF, at most 5 MB.
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

static PRODUCT_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("name", "Name").required().max_length(120),
        Field::text("description", "Description").required().max_length(2000),
        Field::number("price", "Price").required().min(0.0),
        Field::integer("quantity", "Quantity").required().min(0.0),
        Field::text("category", "Category").required(),
    ])
});

impl Resource for Product {
    const COLLECTION: &'static str = "products";
    const SINGULAR: &'static str = "product";
    const PLURAL: &'static str = "products";
    const LABEL: &'static str = "Product";

    fn form_schema() -> &'static FormSchema {
        &PRODUCT_SCHEMA
    }
}

impl TableRow for Product {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    fn facet(&self) -> Option<String> {
        Some(self.category.clone())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec!["Name", "Category", "Price", "Quantity", "Description"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.category.clone(),
            format_amount(self.price),
            self.quantity.to_string(),
            self.description.clone(),
        ]
    }
}
