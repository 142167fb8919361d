//! # Domain Types
//!
//! Core domain types for Quill Billing.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────┐  │
//! │  │    Document     │   │    LineItem     │   │   TaxRate    │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  bps (u32)   │  │
//! │  │  number ("INV-  │   │  document_id    │   │  825 = 8.25% │  │
//! │  │    2025-001")   │   │  quantity       │   └──────────────┘  │
//! │  │  kind, status   │   │  unit_price     │                     │
//! │  │  totals (cents) │   │  tax_rate_bps   │                     │
//! │  └─────────────────┘   └─────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `number`: the human-readable document number - immutable once the
//!   document is persisted, produced only by the sequence allocator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::number::DocumentKind;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bps = 0.01%, so 825 = 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle status of an invoice or quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Document is being edited.
    #[default]
    Draft,
    /// Sent to the customer.
    Issued,
    /// Fully paid (invoices only).
    Paid,
    /// Cancelled without payment.
    Cancelled,
    /// Quotation that was converted into an invoice.
    Converted,
}

// =============================================================================
// Document
// =============================================================================

/// An invoice or quotation as persisted.
///
/// Monetary columns are denormalized totals in cents, recomputed from
/// the line items whenever the document is written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Document {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant/user this document belongs to. Numbering sequences are
    /// scoped per owner.
    pub owner_id: String,

    /// Invoice or quotation.
    pub kind: DocumentKind,

    /// Document number, e.g. `INV-2025-001`. Unique per owner and
    /// immutable once assigned.
    pub number: String,

    /// Customer the document is addressed to.
    pub customer_name: String,

    pub status: DocumentStatus,

    /// Sum of line totals before tax and discount.
    pub subtotal_cents: i64,

    /// Sum of per-line tax amounts.
    pub tax_cents: i64,

    /// Document-level discount.
    pub discount_cents: i64,

    /// Advance already received against this document.
    pub advance_cents: i64,

    /// subtotal + tax - discount.
    pub total_cents: i64,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Amount still owed: total minus the advance. Negative when the
    /// customer overpaid.
    #[inline]
    pub fn balance_due(&self) -> Money {
        Money::from_cents(self.total_cents - self.advance_cents)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line on an invoice or quotation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub document_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Per-line tax rate in basis points.
    pub tax_rate_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    /// quantity × unit price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).times(self.quantity)
    }

    /// Tax on the line total at the line's rate.
    #[inline]
    pub fn line_tax(&self) -> Money {
        self.line_total().tax(TaxRate::from_bps(self.tax_rate_bps))
    }
}

// =============================================================================
// Drafts (pre-persistence input)
// =============================================================================

/// Input for creating a document. The number is NOT part of the draft;
/// it is allocated at persist time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDocument {
    pub owner_id: String,
    pub kind: DocumentKind,
    pub customer_name: String,
    pub items: Vec<NewLineItem>,
    pub discount_cents: i64,
    pub advance_cents: i64,
    pub notes: Option<String>,
}

/// A line on a document draft.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub tax_rate_bps: u32,
}

impl NewLineItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).times(self.quantity)
    }

    #[inline]
    pub fn line_tax(&self) -> Money {
        self.line_total().tax(TaxRate::from_bps(self.tax_rate_bps))
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Denormalized totals computed from a draft's line items.
///
/// ## Computation Order
/// ```text
/// subtotal     = Σ line_total
/// tax          = Σ line_tax          (per-line rates)
/// total        = subtotal + tax - discount
/// balance_due  = total - advance
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub advance: Money,
    pub total: Money,
    pub balance_due: Money,
}

impl DocumentTotals {
    /// Computes totals for a set of draft lines.
    pub fn compute(items: &[NewLineItem], discount: Money, advance: Money) -> Self {
        let mut subtotal = Money::zero();
        let mut tax = Money::zero();
        for item in items {
            subtotal += item.line_total();
            tax += item.line_tax();
        }
        let total = subtotal + tax - discount;
        DocumentTotals {
            subtotal,
            tax,
            discount,
            advance,
            total,
            balance_due: total - advance,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
