pub mod common;
pub mod employee;
pub mod income_expenditure;
pub mod maintenance;
pub mod order;
pub mod petty_cash;
pub mod product;
pub mod resource;
pub mod salary;
pub mod schedule;
pub mod subscription_plan;

pub use common::*;
pub use employee::*;
pub use income_expenditure::*;
pub use maintenance::*;
pub use order::*;
pub use petty_cash::*;
pub use product::*;
pub use resource::*;
pub use salary::*;
pub use schedule::*;
pub use subscription_plan::*;
