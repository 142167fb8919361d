//! # Repositories
//!
//! Repository implementations over the SQLite pool.
//!
//! - [`sequence`] - sequence counters: the atomic increment and the
//!   number existence check that back the allocator
//! - [`document`] - invoices and quotations, including the
//!   allocate-then-insert retry loop and quote→invoice conversion

pub mod document;
pub mod sequence;
