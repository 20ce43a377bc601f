//! Core types and trait definitions for the recurring weekly timetable engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::TimetableStore`]; the [`timetable::Timetable`]
//! service layers validation and the termination state machine on top.

pub mod entry;
pub mod error;
pub mod scope;
pub mod store;
pub mod timetable;

pub use error::{Error, Result};
