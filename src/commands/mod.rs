pub mod build;
pub mod compare;
