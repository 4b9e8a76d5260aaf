pub mod csv;
pub mod pdf;

pub use csv::{escape_field, records_csv, to_csv};
pub use pdf::records_pdf;
