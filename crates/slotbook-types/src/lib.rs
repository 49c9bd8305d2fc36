//! Shared wire types for the slotbook API: domain models as they appear in
//! JSON responses, and the request bodies handlers accept.

pub mod api;
pub mod models;
