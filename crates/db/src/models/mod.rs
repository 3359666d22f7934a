//! Row models and query parameter types.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Query parameter structs for list endpoints
//! - Paginated response envelopes

pub mod buyer;
pub mod history;
