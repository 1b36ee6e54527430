pub mod descriptor;
pub mod error;
pub mod trim;
pub mod types;
