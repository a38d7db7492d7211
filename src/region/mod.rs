pub mod expr;
pub mod tree;
