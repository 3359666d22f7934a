//! Pure domain logic for the leadbook buyer-leads backend.
//!
//! This crate has zero database and zero async dependencies. It provides:
//!
//! - The buyer domain model: closed enums, the [`buyer::BuyerRecord`]
//!   snapshot, and the create/patch DTOs.
//! - Field-level and cross-field validation ([`validation`]).
//! - The before/after diff engine used for the change history ([`diff`]).
//! - CSV encode/decode helpers for import and export ([`csv`]).

pub mod buyer;
pub mod csv;
pub mod diff;
pub mod error;
pub mod types;
pub mod validation;
