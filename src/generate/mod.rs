mod groups;
mod names;
mod pipeline;
mod ratio;
mod region;
mod rules;
mod service;
mod statics;

pub use groups::*;
pub use names::*;
pub use pipeline::*;
pub use ratio::*;
pub use region::*;
pub use rules::*;
pub use service::*;
pub use statics::*;
