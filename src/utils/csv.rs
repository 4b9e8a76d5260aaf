use crate::models::TableRow;

/// Quotes a field when it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn to_csv<H, R>(headers: &[H], rows: &[R]) -> String
where
    H: AsRef<str>,
    R: AsRef<[String]>,
{
    let mut out = String::new();
    push_line(&mut out, headers.iter().map(AsRef::as_ref));
    for row in rows {
        push_line(&mut out, row.as_ref().iter().map(String::as_str));
    }
    out
}

/// Header line, one line per record, then the totals line if the type has one.
pub fn records_csv<T: TableRow>(records: &[&T]) -> String {
    let mut rows: Vec<Vec<String>> = records.iter().map(|r| r.csv_row()).collect();
    if let Some(totals) = T::csv_totals(records) {
        rows.push(totals);
    }
    to_csv(&T::csv_headers(), &rows)
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line = fields.map(escape_field).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}
