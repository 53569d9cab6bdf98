mod error;
mod options;
mod raw;
mod rule_provider;

pub use error::*;
pub use options::*;
pub use raw::*;
pub use rule_provider::*;
