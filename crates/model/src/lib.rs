pub mod condition;
pub mod core;
pub mod error;
