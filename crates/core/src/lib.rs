//! Domain layer of the club administration console.
//!
//! Zero I/O: entity records and drafts, the list query reducer, form field
//! errors, derived display values and role-driven navigation. The client
//! and console crates build on these.

pub mod activity;
pub mod age_category;
pub mod entities;
pub mod error;
pub mod form;
pub mod list;
pub mod naming;
pub mod navigation;
pub mod roles;
pub mod session;
pub mod types;
