use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow, format_amount, round_currency};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PettyCash {
    #[schema(example = "R-1042")]
    pub receipt_no: String,
    #[schema(example = "V-0311")]
    pub voucher_no: String,
    pub date: NaiveDate,
    #[schema(example = "Courier and tea for the depot")]
    pub details: String,
    #[serde(default)]
    pub postage: f64,
    #[serde(default)]
    pub travel: f64,
    #[serde(default)]
    pub stationery: f64,
    #[serde(default)]
    pub refreshments: f64,
    #[serde(default)]
    pub cleaning: f64,
    #[serde(default)]
    pub sundry: f64,
    #[serde(default)]
    pub total: f64,
}

impl PettyCash {
    pub fn expenses(&self) -> [f64; 6] {
        [
            self.postage,
            self.travel,
            self.stationery,
            self.refreshments,
            self.cleaning,
            self.sundry,
        ]
    }
}

static PETTY_CASH_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("receiptNo", "Receipt number").required(),
        Field::text("voucherNo", "Voucher number").required(),
        Field::date("date", "Date").required(),
        Field::text("details", "Details").required().max_length(500),
        Field::number("postage", "Postage").min(0.0),
        Field::number("travel", "Travel").min(0.0),
        Field::number("stationery", "Stationery").min(0.0),
        Field::number("refreshments", "Refreshments").min(0.0),
        Field::number("cleaning", "Cleaning").min(0.0),
        Field::number("sundry", "Sundry").min(0.0),
    ])
});

impl Resource for PettyCash {
    const COLLECTION: &'static str = "petty-cash";
    const SINGULAR: &'static str = "pettyCash";
    const PLURAL: &'static str = "pettyCash";
    const LABEL: &'static str = "Petty cash entry";

    fn form_schema() -> &'static FormSchema {
        &PETTY_CASH_SCHEMA
    }

    fn normalize(&mut self) {
        self.total = round_currency(self.expenses().iter().sum());
    }
}

impl TableRow for PettyCash {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.receipt_no, self.voucher_no, self.details)
    }

    fn facet(&self) -> Option<String> {
        Some(self.date.format("%Y-%m").to_string())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "Receipt No",
            "Voucher No",
            "Date",
            "Details",
            "Postage",
            "Travel",
            "Stationery",
            "Refreshments",
            "Cleaning",
            "Sundry",
            "Total",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        let mut row = vec![
            self.receipt_no.clone(),
            self.voucher_no.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.details.clone(),
        ];
        row.extend(self.expenses().iter().map(|v| format_amount(*v)));
        row.push(format_amount(self.total));
        row
    }

    fn csv_totals(rows: &[&Self]) -> Option<Vec<String>> {
        let mut sums = [0.0; 7];
        for row in rows {
            for (sum, value) in sums.iter_mut().zip(row.expenses()) {
                *sum += value;
            }
            sums[6] += row.total;
        }
        let mut totals = vec![
            "Total".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];
        totals.extend(sums.iter().map(|v| format_amount(round_currency(*v))));
        Some(totals)
    }
}
