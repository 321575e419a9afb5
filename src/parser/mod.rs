pub mod dates;
pub mod record;

pub use dates::*;
pub use record::*;
