pub mod area;
pub mod color;
pub mod error;
