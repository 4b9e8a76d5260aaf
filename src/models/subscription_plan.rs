use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow, format_amount};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum DeliveryFrequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl DeliveryFrequency {
    pub const ALL: &'static [&'static str] = &["Daily", "Weekly", "BiWeekly", "Monthly"];
}

impl std::fmt::Display for DeliveryFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryFrequency::Daily => write!(f, "Daily"),
            DeliveryFrequency::Weekly => write!(f, "Weekly"),
            DeliveryFrequency::BiWeekly => write!(f, "BiWeekly"),
            DeliveryFrequency::Monthly => write!(f, "Monthly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[schema(example = "Family Monthly")]
    pub name: String,
    #[schema(example = "Four 19L bottles delivered every week")]
    pub description: String,
    /// Months.
    #[schema(example = 6)]
    pub duration: u32,
    #[schema(example = 12000.0)]
    pub price: f64,
    pub delivery_frequency: DeliveryFrequency,
}

static PLAN_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("name", "Name").required().max_length(80),
        Field::text("description", "Description").required(),
        Field::integer("duration", "Duration").required().min(1.0).max(36.0),
        Field::number("price", "Price").required().min(0.0),
        Field::choice(
            "deliveryFrequency",
            "Delivery frequency",
            DeliveryFrequency::ALL,
        )
        .required(),
    ])
});

impl Resource for SubscriptionPlan {
    const COLLECTION: &'static str = "subscription-plans";
    const SINGULAR: &'static str = "plan";
    const PLURAL: &'static str = "plans";
    const LABEL: &'static str = "Subscription plan";

    fn form_schema() -> &'static FormSchema {
        &PLAN_SCHEMA
    }
}

impl TableRow for SubscriptionPlan {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    fn facet(&self) -> Option<String> {
        Some(self.delivery_frequency.to_string())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec!["Name", "Duration (months)", "Price", "Delivery Frequency"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.duration.to_string(),
            format_amount(self.price),
            self.delivery_frequency.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> serde_json::Value {
        json!({
            "name": "Family Monthly",
            "description": "Four 19L bottles every week",
            "duration": "6",
            "price": "12000",
            "deliveryFrequency": "Weekly"
        })
    }

    #[test]
    fn test_valid_plan() {
        let values = plan().as_object().unwrap().clone();
        assert!(SubscriptionPlan::form_schema().validate(&values).is_ok());

        let plan: SubscriptionPlan =
            serde_json::from_value(SubscriptionPlan::form_schema().coerce(values).into()).unwrap();
        assert_eq!(plan.duration, 6);
        assert_eq!(plan.delivery_frequency, DeliveryFrequency::Weekly);
        assert_eq!(plan.facet().as_deref(), Some("Weekly"));
        assert_eq!(plan.csv_row(), vec!["Family Monthly", "6", "12000", "Weekly"]);
    }

    #[test]
    fn test_duration_and_frequency_rules() {
        let mut value = plan();
        value["duration"] = json!(0);
        value["deliveryFrequency"] = json!("Hourly");
        let errors = SubscriptionPlan::form_schema()
            .validate(value.as_object().unwrap())
            .unwrap_err();
        assert_eq!(errors.get("duration"), Some("Duration must be at least 1"));
        assert_eq!(
            errors.get("deliveryFrequency"),
            Some("Delivery frequency must be one of: Daily, Weekly, BiWeekly, Monthly")
        );
    }
}
