pub mod database;
pub mod loader;
pub mod postgresql;
pub mod schema_gen;

pub use database::*;
pub use loader::*;
pub use postgresql::*;
