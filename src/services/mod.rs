pub mod document_store;
pub mod product_service;
pub mod resource_service;

pub use document_store::DocumentStore;
pub use product_service::ProductService;
pub use resource_service::ResourceService;
