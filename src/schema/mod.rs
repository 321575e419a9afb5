pub mod dependencies;
pub mod overrides;
pub mod tables;
pub mod types;

pub use dependencies::*;
pub use overrides::*;
pub use tables::*;
pub use types::*;
