//! # Document Numbering
//!
//! Human-readable document numbers for invoices and quotations.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Document Number Format                      │
//! │                                                                 │
//! │        INV-2025-001                QTN-2025-042                 │
//! │        ─┬─ ──┬─ ─┬─                                             │
//! │         │    │   └── sequence, zero-padded to at least 3        │
//! │         │    │       digits (grows past 999: INV-2025-1000)     │
//! │         │    └────── calendar year (sequences reset per year)   │
//! │         └─────────── document type prefix (closed set)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sequences are scoped per (owner, year, prefix): `INV-2025-001` and
//! `QTN-2025-001` coexist for the same owner, and two owners each have
//! their own `INV-2025-001`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::NumberError;

/// Minimum width of the zero-padded sequence portion.
pub const MIN_SEQ_WIDTH: usize = 3;

// =============================================================================
// Document Kind
// =============================================================================

/// The closed set of document types that carry a numbering sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum DocumentKind {
    /// Invoice, prefix `INV`.
    #[serde(rename = "INV")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "INV"))]
    Invoice,
    /// Quotation, prefix `QTN`.
    #[serde(rename = "QTN")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "QTN"))]
    Quotation,
}

impl DocumentKind {
    /// Returns the numbering prefix for this kind.
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Quotation => "QTN",
        }
    }

    /// Parses a prefix string into a kind.
    ///
    /// Anything outside `{INV, QTN}` is rejected; this is the validation
    /// gate for document types arriving from the HTTP layer, and it runs
    /// before any counter state is touched.
    pub fn from_prefix(prefix: &str) -> Result<Self, NumberError> {
        match prefix {
            "INV" => Ok(DocumentKind::Invoice),
            "QTN" => Ok(DocumentKind::Quotation),
            other => Err(NumberError::UnsupportedKind(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// =============================================================================
// Document Number
// =============================================================================

/// A formatted document number: `{prefix}-{year}-{seq}`.
///
/// Immutable once assigned to a persisted document. Constructed by the
/// sequence allocator from a freshly reserved counter value, or parsed
/// back from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    kind: DocumentKind,
    year: i32,
    seq: i64,
    text: String,
}

impl DocumentNumber {
    /// Builds a number from its parts.
    pub fn new(kind: DocumentKind, year: i32, seq: i64) -> Self {
        let text = format!("{}-{}-{:0width$}", kind.prefix(), year, seq, width = MIN_SEQ_WIDTH);
        DocumentNumber { kind, year, seq, text }
    }

    /// The document type this number belongs to.
    #[inline]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The calendar year portion.
    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The sequence portion.
    #[inline]
    pub fn seq(&self) -> i64 {
        self.seq
    }

    /// The formatted string form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the number, returning the formatted string.
    #[inline]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for DocumentNumber {
    type Err = NumberError;

    /// Parses `PREFIX-YYYY-NNN` strictly: known prefix, 4-digit year,
    /// at least [`MIN_SEQ_WIDTH`] digits of sequence.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NumberError::Malformed(s.to_string());

        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }

        let kind = DocumentKind::from_prefix(parts[0])?;

        let year_part = parts[1];
        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = year_part.parse().map_err(|_| malformed())?;

        let seq_part = parts[2];
        if seq_part.len() < MIN_SEQ_WIDTH || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let seq: i64 = seq_part.parse().map_err(|_| malformed())?;

        Ok(DocumentNumber::new(kind, year, seq))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
