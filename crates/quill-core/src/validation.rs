//! # Validation
//!
//! Early validation of document drafts, before any persistence runs.
//! Rules live here (not in the db layer) so the HTTP handlers can
//! reject bad input without a database round trip.

use crate::error::ValidationError;
use crate::types::NewDocument;

/// Longest accepted customer name.
pub const MAX_CUSTOMER_NAME_LEN: usize = 200;

/// Longest accepted line description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest accepted quantity on a single line.
pub const MAX_LINE_QUANTITY: i64 = 99_999;

/// Validates a document draft.
///
/// Checks are structural only; number allocation and uniqueness are the
/// persistence layer's concern.
pub fn validate_new_document(draft: &NewDocument) -> Result<(), ValidationError> {
    if draft.owner_id.trim().is_empty() {
        return Err(ValidationError::Required { field: "owner_id" });
    }

    if draft.customer_name.trim().is_empty() {
        return Err(ValidationError::Required { field: "customer_name" });
    }
    if draft.customer_name.len() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_name",
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    if draft.items.is_empty() {
        return Err(ValidationError::Required { field: "items" });
    }

    for item in &draft.items {
        if item.description.trim().is_empty() {
            return Err(ValidationError::Required { field: "description" });
        }
        if item.description.len() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }
        if item.quantity < 1 {
            return Err(ValidationError::MustBePositive { field: "quantity" });
        }
        if item.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
        if item.unit_price_cents < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "unit_price_cents" });
        }
    }

    if draft.discount_cents < 0 {
        return Err(ValidationError::MustNotBeNegative { field: "discount_cents" });
    }
    if draft.advance_cents < 0 {
        return Err(ValidationError::MustNotBeNegative { field: "advance_cents" });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::DocumentKind;
    use crate::types::NewLineItem;

    fn draft() -> NewDocument {
        NewDocument {
            owner_id: "7".to_string(),
            kind: DocumentKind::Invoice,
            customer_name: "Acme Traders".to_string(),
            items: vec![NewLineItem {
                description: "Consulting".to_string(),
                quantity: 2,
                unit_price_cents: 15000,
                tax_rate_bps: 500,
            }],
            discount_cents: 0,
            advance_cents: 0,
            notes: None,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate_new_document(&draft()).is_ok());
    }

    #[test]
    fn test_missing_owner_rejected() {
        let mut d = draft();
        d.owner_id = "  ".to_string();
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::Required { field: "owner_id" })
        );
    }

    #[test]
    fn test_missing_customer_rejected() {
        let mut d = draft();
        d.customer_name = String::new();
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::Required { field: "customer_name" })
        );
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut d = draft();
        d.items.clear();
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::Required { field: "items" })
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut d = draft();
        d.items[0].quantity = 0;
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::MustBePositive { field: "quantity" })
        );
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let mut d = draft();
        d.items[0].quantity = MAX_LINE_QUANTITY + 1;
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_LINE_QUANTITY,
            })
        );
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut d = draft();
        d.discount_cents = -1;
        assert_eq!(
            validate_new_document(&d),
            Err(ValidationError::MustNotBeNegative { field: "discount_cents" })
        );

        let mut d = draft();
        d.advance_cents = -1;
        assert!(validate_new_document(&d).is_err());

        let mut d = draft();
        d.items[0].unit_price_cents = -100;
        assert!(validate_new_document(&d).is_err());
    }
}
