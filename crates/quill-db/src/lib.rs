//! # quill-db: Database Layer for Quill Billing
//!
//! SQLite persistence for invoices, quotations and the sequence
//! counters that back document numbering, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Quill Billing Data Flow                     │
//! │                                                                 │
//! │  REST handler (create_invoice)                                  │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                  quill-db (THIS CRATE)                    │  │
//! │  │                                                           │  │
//! │  │  ┌────────────┐   ┌────────────────┐   ┌──────────────┐  │  │
//! │  │  │  Database  │   │  Repositories  │   │  Migrations  │  │  │
//! │  │  │ (pool.rs)  │◄──│  document.rs   │   │  (embedded)  │  │  │
//! │  │  │ SqlitePool │   │  sequence.rs   │   │  001_*.sql   │  │  │
//! │  │  └────────────┘   └────────────────┘   └──────────────┘  │  │
//! │  │                                                           │  │
//! │  │  SequenceRepository implements quill-core's               │  │
//! │  │  SequenceBackend: one atomic upsert per allocation.       │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │       │                                                         │
//! │       ▼                                                         │
//! │                    SQLite Database (WAL)                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("billing.db")).await?;
//!
//! let invoice = db.documents().create(draft).await?;
//! println!("{}", invoice.number); // INV-2025-001
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::document::DocumentRepository;
pub use repository::sequence::SequenceRepository;
