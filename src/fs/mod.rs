pub mod operations;
pub mod tree;
