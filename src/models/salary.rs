use crate::forms::{Field, FormSchema};
use crate::models::{Employee, Reference, Resource, TableRow, format_amount, round_currency};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSalary {
    #[serde(rename = "employeeID")]
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    /// Pay period, `YYYY-MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2024-05")]
    pub month: Option<String>,
    #[schema(example = 50000.0)]
    pub basic_salary: f64,
    #[serde(default)]
    #[schema(example = 5000.0)]
    pub allowances: f64,
    #[serde(default)]
    #[schema(example = 10.0)]
    pub overtime_hours: f64,
    #[serde(default)]
    #[schema(example = 200.0)]
    pub overtime_rate: f64,
    #[serde(default)]
    #[schema(example = 1000.0)]
    pub deductions: f64,
    /// Employee provident fund, percent of basic salary.
    #[schema(example = 9.0)]
    pub epf_rate: f64,
    #[serde(default)]
    #[schema(example = 51500.0)]
    pub net_salary: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub overtime_pay: f64,
    pub gross_salary: f64,
    pub epf: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
}

impl SalaryBreakdown {
    pub fn compute(salary: &EmployeeSalary) -> Self {
        let overtime_pay = salary.overtime_hours * salary.overtime_rate;
        let gross_salary = salary.basic_salary + salary.allowances + overtime_pay;
        let epf = salary.basic_salary * salary.epf_rate / 100.0;
        let total_deductions = salary.deductions + epf;

        Self {
            overtime_pay: round_currency(overtime_pay),
            gross_salary: round_currency(gross_salary),
            epf: round_currency(epf),
            total_deductions: round_currency(total_deductions),
            net_salary: round_currency(gross_salary - total_deductions),
        }
    }
}

static SALARY_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        Field::text("employeeID", "Employee ID").required(),
        Field::text("month", "Month")
            .pattern(r"^\d{4}-(0[1-9]|1[0-2])$", "Month must be in YYYY-MM format"),
        Field::number("basicSalary", "Basic salary").required().min(0.0),
        Field::number("allowances", "Allowances").min(0.0),
        Field::number("overtimeHours", "Overtime hours").min(0.0).max(744.0),
        Field::number("overtimeRate", "Overtime rate").min(0.0),
        Field::number("deductions", "Deductions").min(0.0),
        Field::number("epfRate", "EPF rate").required().min(0.0).max(100.0),
    ])
});

impl Resource for EmployeeSalary {
    const COLLECTION: &'static str = "salaries";
    const SINGULAR: &'static str = "salary";
    const PLURAL: &'static str = "salaries";
    const LABEL: &'static str = "Salary";

    fn form_schema() -> &'static FormSchema {
        &SALARY_SCHEMA
    }

    fn normalize(&mut self) {
        self.net_salary = SalaryBreakdown::compute(self).net_salary;
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            collection: Employee::COLLECTION,
            field: "employeeID",
            value: self.employee_id.clone(),
            label: Employee::LABEL,
        }]
    }
}

impl TableRow for EmployeeSalary {
    fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.employee_id,
            self.month.as_deref().unwrap_or_default()
        )
    }

    fn facet(&self) -> Option<String> {
        self.month.clone()
    }

    fn csv_headers() -> Vec<&'static str> {
        vec![
            "Employee ID",
            "Month",
            "Basic Salary",
            "Allowances",
            "Overtime Pay",
            "EPF",
            "Deductions",
            "Net Salary",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        let breakdown = SalaryBreakdown::compute(self);
        vec![
            self.employee_id.clone(),
            self.month.clone().unwrap_or_default(),
            format_amount(self.basic_salary),
            format_amount(self.allowances),
            format_amount(breakdown.overtime_pay),
            format_amount(breakdown.epf),
            format_amount(self.deductions),
            format_amount(self.net_salary),
        ]
    }
}
