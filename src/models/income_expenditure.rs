use crate::forms::{Field, FormSchema};
use crate::models::{Resource, TableRow, format_amount, round_currency};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct IncomeExpenditure {
    pub date: NaiveDate,
    #[schema(example = "Weekly sales, Kandy route")]
    pub description: String,
    #[schema(example = 1000.0)]
    pub income: f64,
    #[schema(example = 400.0)]
    pub expenses: f64,
    #[serde(default)]
    #[schema(example = 600.0)]
    pub profit: f64,
}

static INCOME_EXPENDITURE_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::date("date", "Date").required(),
        Field::text("description", "Description").required(),
        Field::number("income", "Income").required().min(0.0),
        Field::number("expenses", "Expenses").required().min(0.0),
    ])
});

impl Resource for IncomeExpenditure {
    const COLLECTION: &'static str = "income-expenditures";
    const SINGULAR: &'static str = "record";
    const PLURAL: &'static str = "records";
    const LABEL: &'static str = "Income/expenditure record";

    fn form_schema() -> &'static FormSchema {
        &INCOME_EXPENDITURE_SCHEMA
    }

    fn normalize(&mut self) {
        self.profit = round_currency(self.income - self.expenses);
    }
}

/// Sums of income, expenses and profit over `rows`.
pub fn income_expenditure_totals(rows: &[&IncomeExpenditure]) -> (f64, f64, f64) {
    let income: f64 = rows.iter().map(|r| r.income).sum();
    let expenses: f64 = rows.iter().map(|r| r.expenses).sum();
    (
        round_currency(income),
        round_currency(expenses),
        round_currency(income - expenses),
    )
}

impl TableRow for IncomeExpenditure {
    fn search_text(&self) -> String {
        self.description.clone()
    }

    fn facet(&self) -> Option<String> {
        Some(self.date.format("%Y-%m").to_string())
    }

    fn csv_headers() -> Vec<&'static str> {
        vec!["Date", "Description", "Income", "Expenses", "Profit"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.description.clone(),
            format_amount(self.income),
            format_amount(self.expenses),
            format_amount(self.income - self.expenses),
        ]
    }

    fn csv_totals(rows: &[&Self]) -> Option<Vec<String>> {
        let (income, expenses, profit) = income_expenditure_totals(rows);
        Some(vec![
            "Total".to_string(),
            String::new(),
            format_amount(income),
            format_amount(expenses),
            format_amount(profit),
        ])
    }
}
