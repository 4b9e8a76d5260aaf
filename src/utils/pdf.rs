use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::error::{AppError, AppResult};
use crate::models::TableRow;

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 7.0;
const TITLE_SIZE: f32 = 14.0;
const FONT_SIZE: f32 = 9.0;
/// Rough Helvetica glyph width at `FONT_SIZE`, used to clip cells.
const CHAR_WIDTH: f32 = 1.9;

/// Renders the same table as `records_csv`: a bold header, one line per
/// record and a bold totals line when the type has one. The header repeats
/// on every page.
pub fn records_pdf<T: TableRow>(title: &str, records: &[&T]) -> AppResult<Vec<u8>> {
    let headers = T::csv_headers();
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.csv_row()).collect();
    let totals = T::csv_totals(records);

    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let table = TableLayout::new(headers.len());
    let mut layer = doc.get_page(page).get_layer(layer);
    layer.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(PAGE_HEIGHT - MARGIN), &bold);
    let mut y = PAGE_HEIGHT - MARGIN - 2.0 * LINE_HEIGHT;
    table.write_row(&layer, &headers, y, &bold);

    let lines = rows
        .iter()
        .map(|row| (row, &regular))
        .chain(totals.iter().map(|row| (row, &bold)));
    for (row, font) in lines {
        y -= LINE_HEIGHT;
        if y < MARGIN {
            let (page, next) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
            layer = doc.get_page(page).get_layer(next);
            y = PAGE_HEIGHT - MARGIN;
            table.write_row(&layer, &headers, y, &bold);
            y -= LINE_HEIGHT;
        }
        table.write_row(&layer, row, y, font);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Equal-width columns across the printable area.
struct TableLayout {
    column_width: f32,
    max_chars: usize,
}

impl TableLayout {
    fn new(columns: usize) -> Self {
        let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns.max(1) as f32;
        Self {
            column_width,
            max_chars: (column_width / CHAR_WIDTH) as usize,
        }
    }

    fn write_row<S: AsRef<str>>(
        &self,
        layer: &PdfLayerReference,
        cells: &[S],
        y: f32,
        font: &IndirectFontRef,
    ) {
        for (i, cell) in cells.iter().enumerate() {
            let x = MARGIN + i as f32 * self.column_width;
            layer.use_text(clip(cell.as_ref(), self.max_chars), FONT_SIZE, Mm(x), Mm(y), font);
        }
    }
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
fn clip(text: &str, max: usize) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() <= max {
        return text;
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalError(format!("PDF rendering failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeExpenditure;
    use chrono::NaiveDate;

    fn entry(income: f64, expenses: f64) -> IncomeExpenditure {
        IncomeExpenditure {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: "Sales".to_string(),
            income,
            expenses,
            profit: income - expenses,
        }
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Kandy", 10), "Kandy");
        assert_eq!(clip("Refillable dispenser bottle", 10), "Refilla...");
        assert_eq!(clip("two\nlines", 20), "two lines");
    }

    #[test]
    fn test_renders_pdf_document() {
        let rows = [entry(1000.0, 400.0), entry(500.0, 100.0)];
        let refs: Vec<&IncomeExpenditure> = rows.iter().collect();
        let bytes = records_pdf("Income and expenditure", &refs).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_tables_span_pages() {
        let rows: Vec<IncomeExpenditure> = (0..120).map(|i| entry(f64::from(i), 0.0)).collect();
        let refs: Vec<&IncomeExpenditure> = rows.iter().collect();
        let short = records_pdf("Income", &refs[..2]).unwrap();
        let long = records_pdf("Income", &refs).unwrap();
        assert!(long.len() > short.len());
    }
}
