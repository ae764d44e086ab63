//! # Blog Core
//!
//! The domain layer of Blogicum.
//! This crate contains the entities, visibility and ownership rules, form
//! validation, pagination and the request use cases. It has zero
//! infrastructure dependencies: storage is reached through the ports.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;
pub mod urls;

pub use error::DomainError;
pub use service::{BlogService, Redirect, Requester};
