//! Stack wiring and page lookup for pagestack.
//!
//! This crate ties the shared config, the delivery client, and the
//! live-preview bridge together behind [`Stack`], whose
//! [`get_page`](Stack::get_page) serves one page per request.

pub mod page;
pub mod stack;

pub use stack::Stack;
