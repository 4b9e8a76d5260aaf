use crate::forms::{Field, FieldErrors, FormSchema};
use crate::models::{Resource, TableRow, format_amount};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: &'static [&'static str] = &["Card", "CashOnDelivery"];
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub const ALL: &'static [&'static str] = &["Pending", "Paid", "Failed"];
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Dispatched,
    Delivered,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: &'static [&'static str] = &["Pending", "Approved", "Rejected"];
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "Pending"),
            ApprovalStatus::Approved => write!(f, "Approved"),
            ApprovalStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::Dispatched => write!(f, "Dispatched"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// Snapshot of the buyer at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id.
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Delivery {
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub customer: Customer,
    pub shipping: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    /// Subscription plan id; not checked against the plans collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApprovalRequest {
    pub approval_status: ApprovalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub status: DeliveryStatus,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

static ORDER_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::object("customer", "Customer").required(),
        Field::object("shipping", "Shipping address").required(),
        Field::list("items", "Items").required().min_length(1),
        Field::number("totalPrice", "Total price").required().min(0.0),
        Field::choice("paymentMethod", "Payment method", PaymentMethod::ALL).required(),
        Field::choice("paymentStatus", "Payment status", PaymentStatus::ALL),
        Field::choice("approvalStatus", "Approval status", ApprovalStatus::ALL),
    ])
});

static CUSTOMER_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("name", "Name").required(),
        Field::email("email", "Email").required(),
        Field::text("phone", "Phone")
            .required()
            .pattern(r"^\+?\d{10,12}$", "Phone must contain 10 to 12 digits"),
    ])
});

static SHIPPING_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("address", "Address").required(),
        Field::text("city", "City").required(),
        Field::text("postalCode", "Postal code")
            .required()
            .pattern(r"^\d{5}$", "Postal code must be 5 digits"),
    ])
});

impl Order {
    pub fn customer_schema() -> &'static FormSchema {
        &CUSTOMER_SCHEMA
    }

    pub fn shipping_schema() -> &'static FormSchema {
        &SHIPPING_SCHEMA
    }
}

impl Resource for Order {
    const COLLECTION: &'static str = "orders";
    const SINGULAR: &'static str = "order";
    const PLURAL: &'static str = "orders";
    const LABEL: &'static str = "Order";

    fn form_schema() -> &'static FormSchema {
        &ORDER_SCHEMA
    }

    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for (prefix, schema, value) in [
            ("customer", Order::customer_schema(), serde_json::to_value(&self.customer)),
            ("shipping", Order::shipping_schema(), serde_json::to_value(&self.shipping)),
        ] {
            if let Ok(serde_json::Value::Object(map)) = value
                && let Err(nested) = schema.validate(&map)
            {
                errors.merge_prefixed(prefix, nested);
            }
        }

        for (i, item) in self.items.iter().enumerate() {
            if item.product.trim().is_empty() {
                errors.insert(&format!("items.{i}.product"), "Product is required");
            }
            if item.quantity == 0 {
                errors.insert(&format!("items.{i}.quantity"), "Quantity must be at least 1");
            }
        }

        errors.into_result()
    }
}

impl TableRow for Order {
    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.customer.name, self.customer.email, self.shipping.city
        )
    }

    fn facet(&self) -> Option<String> {
        Some(self.approval_status.to_string())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "Customer",
            "Email",
            "City",
            "Items",
            "Total Price",
            "Approval",
            "Delivery",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        let items: u64 = self.items.iter().map(|i| u64::from(i.quantity)).sum();
        vec![
            self.customer.name.clone(),
            self.customer.email.clone(),
            self.shipping.city.clone(),
            items.to_string(),
            format_amount(self.total_price),
            self.approval_status.to_string(),
            self.delivery.status.to_string(),
        ]
    }
}
