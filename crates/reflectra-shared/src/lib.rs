//! Types shared by every Reflectra crate: the domain records returned by the
//! REST backend, request bodies, the error taxonomy and client-side form
//! validation.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;
pub mod validation;

pub use error::{ReflectraError, Result, ValidationError};
