//! Domain models for the rural care system.

mod emergency;
mod history;
mod insight;
mod patient;
mod vitals;

pub use emergency::*;
pub use history::*;
pub use insight::*;
pub use patient::*;
pub use vitals::*;
