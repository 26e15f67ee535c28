pub mod compiler;
pub mod generator;

pub use compiler::{PageOptions, QueryCompiler};
pub use generator::QueryGenerator;
