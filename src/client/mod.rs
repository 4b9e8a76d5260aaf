//! Storefront and admin side: HTTP client, per-collection state, forms,
//! tables and the cart.

pub mod api;
pub mod cart;
pub mod form;
pub mod store;
pub mod table;

pub use api::{ApiClient, ResourceApi, ResourceClient};
pub use cart::{Cart, CartLine, Checkout, Payment, PaymentDetails};
pub use form::{FormMode, FormState};
pub use store::{Action, ResourceStore, Status};
pub use table::TableView;
