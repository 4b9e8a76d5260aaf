//! Declarative field schemas shared by request validation and client-side forms.

pub mod schema;

pub use schema::*;
