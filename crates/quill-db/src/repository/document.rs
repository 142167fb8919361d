//! # Document Repository
//!
//! Database operations for invoices and quotations.
//!
//! ## Document Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  create(draft) - full cycle                     │
//! │                                                                 │
//! │  validate draft ── bad input? reject, nothing persisted         │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌── up to CREATE_ATTEMPTS ─────────────────────────────────┐   │
//! │  │  allocate number (allocator does its own bounded retry)  │   │
//! │  │       │                                                  │   │
//! │  │       ▼                                                  │   │
//! │  │  INSERT document + line items in one transaction         │   │
//! │  │       │                                                  │   │
//! │  │       ├── ok                    → done                   │   │
//! │  │       ├── UNIQUE(number) lost   → fresh number, retry    │   │
//! │  │       └── any other error       → propagate immediately  │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outer loop exists for the narrow race between the allocator's
//! existence check and this insert: another writer can claim the same
//! number out-of-band in that window. Only a unique violation on the
//! number column is retried; everything else propagates.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::sequence::SequenceRepository;
use quill_core::{
    validate_new_document, Document, DocumentKind, DocumentStatus, DocumentTotals, LineItem,
    Money, NewDocument, SequenceAllocator,
};

/// Bound on full allocate-then-insert cycles per created document.
const CREATE_ATTEMPTS: u32 = 3;

/// Repository for document database operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    fn allocator(&self) -> SequenceAllocator<SequenceRepository> {
        SequenceAllocator::new(SequenceRepository::new(self.pool.clone()))
    }

    /// Creates a document from a draft: validates it, computes totals,
    /// allocates a number and persists document plus line items.
    pub async fn create(&self, draft: NewDocument) -> DbResult<Document> {
        validate_new_document(&draft)?;

        let totals = DocumentTotals::compute(
            &draft.items,
            Money::from_cents(draft.discount_cents),
            Money::from_cents(draft.advance_cents),
        );

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let document = Document {
            id: id.clone(),
            owner_id: draft.owner_id,
            kind: draft.kind,
            // Assigned by persist_with_fresh_number below
            number: String::new(),
            customer_name: draft.customer_name,
            status: DocumentStatus::Draft,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            advance_cents: totals.advance.cents(),
            total_cents: totals.total.cents(),
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<LineItem> = draft
            .items
            .into_iter()
            .map(|item| LineItem {
                id: Uuid::new_v4().to_string(),
                document_id: id.clone(),
                description: item.description,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                tax_rate_bps: item.tax_rate_bps,
                created_at: now,
            })
            .collect();

        self.persist_with_fresh_number(document, &items).await
    }

    /// Converts a quotation into an invoice.
    ///
    /// The invoice is a copy of the quotation's lines and amounts under
    /// a freshly allocated `INV` number (the quotation keeps its `QTN`
    /// number). Converting a quotation a second time fails.
    ///
    /// The status flip to `converted` and the invoice insert commit in
    /// ONE transaction, with the guarded status `UPDATE` deciding who
    /// wins a race: a conversion that loses rolls back and leaves no
    /// invoice behind (its allocated number stays burned, like any
    /// discarded candidate).
    pub async fn convert_quotation(&self, owner_id: &str, quotation_id: &str) -> DbResult<Document> {
        let quotation = self
            .get_by_id(quotation_id)
            .await?
            .filter(|d| d.owner_id == owner_id)
            .ok_or_else(|| DbError::not_found("Quotation", quotation_id))?;

        if quotation.kind != DocumentKind::Quotation {
            return Err(DbError::InvalidDocumentState {
                id: quotation_id.to_string(),
                reason: "not a quotation".to_string(),
            });
        }
        if quotation.status == DocumentStatus::Converted {
            return Err(DbError::InvalidDocumentState {
                id: quotation_id.to_string(),
                reason: "already converted".to_string(),
            });
        }

        let quotation_items = self.items(quotation_id).await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let mut invoice = Document {
            id: id.clone(),
            owner_id: quotation.owner_id.clone(),
            kind: DocumentKind::Invoice,
            number: String::new(),
            customer_name: quotation.customer_name.clone(),
            status: DocumentStatus::Draft,
            subtotal_cents: quotation.subtotal_cents,
            tax_cents: quotation.tax_cents,
            discount_cents: quotation.discount_cents,
            advance_cents: quotation.advance_cents,
            total_cents: quotation.total_cents,
            notes: quotation.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        let items: Vec<LineItem> = quotation_items
            .into_iter()
            .map(|item| LineItem {
                id: Uuid::new_v4().to_string(),
                document_id: id.clone(),
                created_at: now,
                ..item
            })
            .collect();

        let allocator = self.allocator();

        for attempt in 1..=CREATE_ATTEMPTS {
            // Allocate before the transaction opens: the counter upsert
            // needs its own pool connection.
            let number = allocator.allocate(&invoice.owner_id, invoice.kind).await?;
            invoice.number = number.into_string();

            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                r#"
                UPDATE documents SET status = 'converted', updated_at = ?2
                WHERE id = ?1 AND status != 'converted'
                "#,
            )
            .bind(quotation_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Lost the race; dropping the transaction rolls it back
                // and no invoice row ever existed.
                return Err(DbError::InvalidDocumentState {
                    id: quotation_id.to_string(),
                    reason: "already converted".to_string(),
                });
            }

            match self.insert_in(&mut tx, &invoice, &items).await {
                Ok(()) => {
                    tx.commit().await?;
                    debug!(
                        quotation = %quotation.number,
                        invoice = %invoice.number,
                        "converted quotation to invoice"
                    );
                    return Ok(invoice);
                }
                Err(e) if e.is_unique_violation_on("number") => {
                    warn!(
                        owner_id = %invoice.owner_id,
                        number = %invoice.number,
                        attempt,
                        "invoice number lost to a concurrent writer, retrying with a fresh one"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::NumberAllocation(format!(
            "gave up after {CREATE_ATTEMPTS} create attempts"
        )))
    }

    /// Gets a document by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Document>> {
        let document: Option<Document> = sqlx::query_as(
            r#"
            SELECT id, owner_id, kind, number, customer_name, status,
                   subtotal_cents, tax_cents, discount_cents, advance_cents,
                   total_cents, notes, created_at, updated_at
            FROM documents
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Gets a document by its number, scoped to an owner.
    pub async fn get_by_number(&self, owner_id: &str, number: &str) -> DbResult<Option<Document>> {
        let document: Option<Document> = sqlx::query_as(
            r#"
            SELECT id, owner_id, kind, number, customer_name, status,
                   subtotal_cents, tax_cents, discount_cents, advance_cents,
                   total_cents, notes, created_at, updated_at
            FROM documents
            WHERE owner_id = ?1 AND number = ?2
            "#,
        )
        .bind(owner_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Lists an owner's documents, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Document>> {
        let documents: Vec<Document> = sqlx::query_as(
            r#"
            SELECT id, owner_id, kind, number, customer_name, status,
                   subtotal_cents, tax_cents, discount_cents, advance_cents,
                   total_cents, notes, created_at, updated_at
            FROM documents
            WHERE owner_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    /// Gets all line items for a document.
    pub async fn items(&self, document_id: &str) -> DbResult<Vec<LineItem>> {
        let items: Vec<LineItem> = sqlx::query_as(
            r#"
            SELECT id, document_id, description, quantity, unit_price_cents,
                   tax_rate_bps, created_at
            FROM line_items
            WHERE document_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Allocates a number for the document and inserts it, retrying the
    /// whole cycle on a lost number race. See the module docs.
    async fn persist_with_fresh_number(
        &self,
        mut document: Document,
        items: &[LineItem],
    ) -> DbResult<Document> {
        let allocator = self.allocator();

        for attempt in 1..=CREATE_ATTEMPTS {
            let number = allocator.allocate(&document.owner_id, document.kind).await?;
            document.number = number.into_string();

            match self.insert(&document, items).await {
                Ok(()) => {
                    debug!(
                        owner_id = %document.owner_id,
                        number = %document.number,
                        "created document"
                    );
                    return Ok(document);
                }
                // A lost number race on the final attempt still falls
                // through to the terminal error below.
                Err(e) if e.is_unique_violation_on("number") => {
                    warn!(
                        owner_id = %document.owner_id,
                        number = %document.number,
                        attempt,
                        "document number lost to a concurrent writer, retrying with a fresh one"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::NumberAllocation(format!(
            "gave up after {CREATE_ATTEMPTS} create attempts"
        )))
    }

    /// Inserts the document and its line items in one transaction.
    async fn insert(&self, document: &Document, items: &[LineItem]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        self.insert_in(&mut tx, document, items).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Inserts the document and its line items on an open transaction.
    /// The caller owns commit and rollback.
    async fn insert_in(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        document: &Document,
        items: &[LineItem],
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, owner_id, kind, number, customer_name, status,
                subtotal_cents, tax_cents, discount_cents, advance_cents,
                total_cents, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&document.id)
        .bind(&document.owner_id)
        .bind(document.kind)
        .bind(&document.number)
        .bind(&document.customer_name)
        .bind(document.status)
        .bind(document.subtotal_cents)
        .bind(document.tax_cents)
        .bind(document.discount_cents)
        .bind(document.advance_cents)
        .bind(document.total_cents)
        .bind(&document.notes)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut **tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO line_items (
                    id, document_id, description, quantity,
                    unit_price_cents, tax_rate_bps, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.document_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.tax_rate_bps)
            .bind(item.created_at)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
