pub mod analyze;
pub mod index;
