//! Field intake for rural care.
//!
//! This crate turns the raw text a nurse types into the vitals and
//! registration forms into typed submissions for `rural-care-core`, and
//! produces the notices shown after each action.

pub mod form;
pub mod messages;

pub use form::*;
pub use messages::*;
