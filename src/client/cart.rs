use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::client::api::ResourceApi;
use crate::error::{AppError, AppResult};
use crate::forms::{Field, FieldErrors, FormSchema};
use crate::models::{
    ApprovalStatus, Customer, Delivery, Order, OrderItem, PaymentMethod, PaymentStatus, Product,
    Resource, ShippingAddress, Stored, round_currency,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product as it was when added.
    pub product: Stored<Product>,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        round_currency(self.product.record.price * f64::from(self.quantity))
    }
}

/// Shopping cart, optionally mirrored to a JSON file after every change.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    path: Option<PathBuf>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a saved cart. Any read or parse problem yields an empty cart.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let lines = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable cart {}: {e}", path.display());
                Vec::new()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not read cart {}: {e}", path.display());
                }
                Vec::new()
            }
        };
        Self {
            lines,
            path: Some(path),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds to the existing line for this product, if any. Quantities saturate
    /// at `u32::MAX`.
    pub fn add(&mut self, product: &Stored<Product>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }
        self.save();
    }

    /// Drops the whole line.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product.id != product_id);
        self.save();
    }

    /// Zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
            self.save();
        }
    }

    pub fn total(&self) -> f64 {
        round_currency(self.lines.iter().map(CartLine::subtotal).sum())
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.save();
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string(&self.lines)
            .map_err(AppError::from)
            .and_then(|json| std::fs::write(path, json).map_err(AppError::from));
        if let Err(e) = result {
            log::warn!("Could not save cart to {}: {e}", path.display());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub card_holder: String,
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

static PAYMENT_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("cardHolder", "Card holder")
            .required()
            .pattern(r"^[A-Za-z .]+$", "Card holder may only contain letters and spaces"),
        Field::text("cardNumber", "Card number")
            .required()
            .pattern(r"^\d{16}$", "Card number must be 16 digits"),
        Field::text("expiry", "Expiry")
            .required()
            .pattern(r"^(0[1-9]|1[0-2])/\d{2}$", "Expiry must be in MM/YY format"),
        Field::text("cvv", "CVV")
            .required()
            .pattern(r"^\d{3,4}$", "CVV must be 3 or 4 digits"),
    ])
});

/// Luhn checksum over an all-digit string.
pub fn luhn_valid(number: &str) -> bool {
    let digits: Option<Vec<u32>> = number.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    if digits.is_empty() {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

impl PaymentDetails {
    pub fn form_schema() -> &'static FormSchema {
        &PAYMENT_SCHEMA
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        self.validate_on(Utc::now().date_naive())
    }

    /// Validation with an explicit "today" for the expiry check.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Self::form_schema().validate(&map).err().unwrap_or_default(),
            _ => FieldErrors::single("cardNumber", "Card details are invalid"),
        };

        if errors.get("cardNumber").is_none() && !luhn_valid(&self.card_number) {
            errors.insert("cardNumber", "Card number is invalid");
        }
        if errors.get("expiry").is_none() && card_expired(&self.expiry, today) {
            errors.insert("expiry", "Card has expired");
        }
        errors.into_result()
    }
}

fn card_expired(expiry: &str, today: NaiveDate) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return true;
    };
    match (month.parse::<u32>(), year.parse::<i32>()) {
        (Ok(month), Ok(year)) => {
            let year = 2000 + year;
            (year, month) < (today.year(), today.month())
        }
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payment {
    Card(PaymentDetails),
    CashOnDelivery,
}

pub struct Checkout;

impl Checkout {
    /// Turns the cart into an order. Card payment is simulated and marks the
    /// order paid; cash on delivery leaves it pending.
    pub fn build_order(
        cart: &Cart,
        customer: Customer,
        shipping: ShippingAddress,
        payment: &Payment,
    ) -> AppResult<Order> {
        if cart.is_empty() {
            return Err(AppError::ValidationError("Your cart is empty".to_string()));
        }

        let (payment_method, payment_status) = match payment {
            Payment::Card(details) => {
                if let Err(nested) = details.validate() {
                    let mut errors = FieldErrors::new();
                    errors.merge_prefixed("payment", nested);
                    return Err(AppError::InvalidFields(errors));
                }
                (PaymentMethod::Card, PaymentStatus::Paid)
            }
            Payment::CashOnDelivery => (PaymentMethod::CashOnDelivery, PaymentStatus::Pending),
        };

        let order = Order {
            customer,
            shipping,
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product: line.product.id.clone(),
                    name: Some(line.product.record.name.clone()),
                    price: Some(line.product.record.price),
                    quantity: line.quantity,
                })
                .collect(),
            total_price: cart.total(),
            payment_method,
            payment_status,
            delivery: Delivery::default(),
            approval_status: ApprovalStatus::Pending,
            subscription_plan: None,
        };
        order.check().map_err(AppError::InvalidFields)?;
        Ok(order)
    }

    /// Builds and sends the order, emptying the cart once the server accepts it.
    /// Every call sends a new order.
    pub async fn place<A: ResourceApi<Order>>(
        api: &A,
        cart: &mut Cart,
        customer: Customer,
        shipping: ShippingAddress,
        payment: &Payment,
    ) -> AppResult<Stored<Order>> {
        let order = Self::build_order(cart, customer, shipping, payment)?;
        let placed = api.create(&order).await?;
        log::info!("Order {} placed, {} items", placed.id, cart.item_count());
        cart.clear();
        Ok(placed)
    }
}
