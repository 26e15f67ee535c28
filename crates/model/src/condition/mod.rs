pub mod node;
pub mod operator;
pub mod spec;

pub use node::{ConditionNode, Group, Leaf, NodeRef};
pub use operator::{Logic, Operator, SortDir};
pub use spec::{ConditionSpec, SortEntry};
