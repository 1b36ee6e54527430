pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod media_list;
pub mod memory;
pub mod session;
pub mod surface;
pub mod trim;
