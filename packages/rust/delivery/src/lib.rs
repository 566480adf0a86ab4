//! Content Delivery API access for pagestack.
//!
//! This crate provides:
//! - [`DeliveryClient`] — immutable client for one stack's delivery API
//! - [`EntryQuery`] — equality-filtered entry queries
//! - [`editable`] — editable-field tag annotation for live preview

pub mod client;
pub mod editable;
pub mod query;

pub use client::DeliveryClient;
pub use editable::{DEFAULT_LOCALE, TagStyle, add_editable_tags};
pub use query::EntryQuery;
