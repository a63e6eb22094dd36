//! Form state: containers, projections and the form engine

mod errors;
mod forms;
mod projection;
mod store;
mod touched;

pub use errors::*;
pub use forms::*;
pub use projection::*;
pub use store::*;
pub use touched::*;
