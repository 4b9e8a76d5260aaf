use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Integer,
    /// `YYYY-MM-DD`
    Date,
    Choice(&'static [&'static str]),
    Object,
    List,
}

#[derive(Debug, Clone)]
pub enum Rule {
    Pattern(Regex, &'static str),
    Min(f64),
    Max(f64),
    MinLength(usize),
    MaxLength(usize),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    rules: Vec<Rule>,
}

impl Field {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            rules: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn integer(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Integer)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self::new(name, label, FieldKind::Choice(options))
    }

    pub fn object(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Object)
    }

    pub fn list(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::List)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Panics on an invalid pattern; patterns are compile-time literals.
    pub fn pattern(mut self, pattern: &str, message: &'static str) -> Self {
        self.rules
            .push(Rule::Pattern(Regex::new(pattern).unwrap(), message));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.rules.push(Rule::Max(max));
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.rules.push(Rule::MinLength(len));
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.rules.push(Rule::MaxLength(len));
        self
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let label = self.label;
        match self.kind {
            FieldKind::Number | FieldKind::Integer => {
                let n = as_number(value).ok_or_else(|| format!("{label} must be a number"))?;
                if self.kind == FieldKind::Integer && n.fract() != 0.0 {
                    return Err(format!("{label} must be a whole number"));
                }
                for rule in &self.rules {
                    match rule {
                        Rule::Min(min) if n < *min => {
                            return Err(format!("{label} must be at least {min}"));
                        }
                        Rule::Max(max) if n > *max => {
                            return Err(format!("{label} must be at most {max}"));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            FieldKind::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(format!("{label} is invalid"))
                }
            }
            FieldKind::List => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("{label} must be a list"))?;
                for rule in &self.rules {
                    match rule {
                        Rule::MinLength(len) if items.len() < *len => {
                            return Err(format!("{label} must contain at least {len} item(s)"));
                        }
                        Rule::MaxLength(len) if items.len() > *len => {
                            return Err(format!("{label} must contain at most {len} item(s)"));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            FieldKind::Text | FieldKind::Email | FieldKind::Date | FieldKind::Choice(_) => {
                let text = value
                    .as_str()
                    .ok_or_else(|| format!("{label} must be text"))?
                    .trim();
                match self.kind {
                    FieldKind::Email if !EMAIL_REGEX.is_match(text) => {
                        return Err(format!("{label} must be a valid email address"));
                    }
                    FieldKind::Date if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() => {
                        return Err(format!("{label} must be a date (YYYY-MM-DD)"));
                    }
                    FieldKind::Choice(options) if !options.contains(&text) => {
                        return Err(format!("{label} must be one of: {}", options.join(", ")));
                    }
                    _ => {}
                }
                for rule in &self.rules {
                    match rule {
                        Rule::Pattern(re, message) if !re.is_match(text) => {
                            return Err((*message).to_string());
                        }
                        Rule::MinLength(len) if text.chars().count() < *len => {
                            return Err(format!("{label} must be at least {len} characters"));
                        }
                        Rule::MaxLength(len) if text.chars().count() > *len => {
                            return Err(format!("{label} must be at most {len} characters"));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
        }
    }
}

/// Field name → first failing message, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Adds nested-document errors as `prefix.field`.
    pub fn merge_prefixed(&mut self, prefix: &str, nested: FieldErrors) {
        for (field, message) in nested.0 {
            self.insert(&format!("{prefix}.{field}"), message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<Field>,
}

impl FormSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            match values.get(field.name) {
                value if is_blank(value) => {
                    if field.required {
                        errors.insert(field.name, format!("{} is required", field.label));
                    }
                }
                Some(value) => {
                    if let Err(message) = field.check(value) {
                        errors.insert(field.name, message);
                    }
                }
                None => {}
            }
        }
        errors.into_result()
    }

    /// The values a freshly reset form starts from.
    pub fn empty_values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                let empty = match field.kind {
                    FieldKind::Object => Value::Object(Map::new()),
                    FieldKind::List => Value::Array(Vec::new()),
                    _ => Value::String(String::new()),
                };
                (field.name.to_string(), empty)
            })
            .collect()
    }

    /// Turns text typed into numeric inputs into JSON numbers and drops
    /// blank optional values so record defaults apply on deserialization.
    pub fn coerce(&self, mut values: Map<String, Value>) -> Map<String, Value> {
        for field in &self.fields {
            let Some(value) = values.get(field.name) else {
                continue;
            };
            if is_blank(Some(value)) {
                values.remove(field.name);
                continue;
            }
            let coerced = match (field.kind, value) {
                (FieldKind::Integer, Value::String(s)) => s
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .map(|n| Value::Number(n.into())),
                (FieldKind::Number, Value::String(s)) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number),
                (
                    FieldKind::Text | FieldKind::Email | FieldKind::Date | FieldKind::Choice(_),
                    Value::String(s),
                ) if s.trim() != s =>
                {
                    Some(Value::String(s.trim().to_string()))
                }
                _ => None,
            };
            if let Some(coerced) = coerced {
                values.insert(field.name.to_string(), coerced);
            }
        }
        values
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
