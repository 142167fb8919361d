//! # quill-core: Pure Domain Logic for Quill Billing
//!
//! The heart of the system: document numbering and the money math that
//! invoices and quotations are built from, as pure logic with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Quill Billing Architecture                   │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │          REST handlers / React dashboards (external)      │  │
//! │  └─────────────────────────────┬─────────────────────────────┘  │
//! │                                │                                │
//! │  ┌─────────────────────────────▼─────────────────────────────┐  │
//! │  │               ★ quill-core (THIS CRATE) ★                 │  │
//! │  │                                                           │  │
//! │  │  ┌───────────┐ ┌───────────┐ ┌──────────┐ ┌────────────┐  │  │
//! │  │  │ allocator │ │  number   │ │  money   │ │ validation │  │  │
//! │  │  │ Sequence  │ │ INV-2025- │ │  cents   │ │   rules    │  │  │
//! │  │  │ Allocator │ │    001    │ │  totals  │ │   checks   │  │  │
//! │  │  └───────────┘ └───────────┘ └──────────┘ └────────────┘  │  │
//! │  │                                                           │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK                        │  │
//! │  └─────────────────────────────┬─────────────────────────────┘  │
//! │                                │ SequenceBackend trait           │
//! │  ┌─────────────────────────────▼─────────────────────────────┐  │
//! │  │                 quill-db (Database Layer)                 │  │
//! │  │       SQLite queries, migrations, repositories            │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`allocator`] - The sequence allocator: unique document numbers
//!   per (owner, year, kind), safe under concurrent callers
//! - [`number`] - Document number format and parsing
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Document, LineItem, totals)
//! - [`validation`] - Draft validation rules
//! - [`error`] - Typed domain errors
//!
//! ## Design Principles
//!
//! 1. **No I/O**: the allocator reaches its store only through the
//!    injected [`allocator::SequenceBackend`] trait
//! 2. **Integer Money**: all monetary values are cents (i64)
//! 3. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod error;
pub mod money;
pub mod number;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocator::{SequenceAllocator, SequenceBackend, DEFAULT_MAX_ATTEMPTS};
pub use error::{AllocationError, NumberError, ValidationError};
pub use money::Money;
pub use number::{DocumentKind, DocumentNumber, MIN_SEQ_WIDTH};
pub use types::*;
pub use validation::validate_new_document;
