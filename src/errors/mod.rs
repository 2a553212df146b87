//! Error handling for the Back Alley core.

pub mod domain;

pub use domain::{DomainError, InfraErrorKind, NotFoundKind, ValidationKind};
