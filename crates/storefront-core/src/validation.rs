//! # Validation Module
//!
//! Input validation for entities and filter options.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (CLI flags / JSON options)                            │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field formats and lengths                                         │
//! │  └── Paging bounds, range ordering                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (PostgreSQL)                                        │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (email, sku)                                   │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniqueness is left to the database: checking first and inserting second
//! races with concurrent writers.

use crate::error::ValidationError;
use crate::filter::{ProductFilterOptions, UserFilterOptions};
use crate::types::{NewProduct, NewUser};
use crate::MAX_PAGE_SIZE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Values are stored exactly as given, so surrounding whitespace is
/// rejected rather than trimmed away.
fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.trim() != value {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty, at most 100 characters (column width)
/// - Exactly one `@` with a non-empty local part and a dotted domain
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_email;
///
/// assert!(validate_email("john@example.com").is_ok());
/// assert!(validate_email("john.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email, 100)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid("must contain exactly one '@'")),
    };

    if local.is_empty() {
        return Err(invalid("missing local part"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(())
}

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_sku;
///
/// assert!(validate_sku("SKU-123").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku, 50)?;

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a new user before insert.
pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    required("fullname", &user.fullname, 100)?;
    validate_email(&user.email)?;
    required("address", &user.address, usize::MAX)?;

    if user.phone <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "phone".to_string(),
        });
    }

    Ok(())
}

/// Validates a new product before insert.
///
/// ## Rules
/// - Name required, at most 100 characters
/// - Price must not be negative
/// - Stock must not be negative
/// - SKU, when present, follows [`validate_sku`]
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    required("product_name", &product.product_name, 100)?;

    if product.price.is_sign_negative() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if product.stock_quantity < 0 {
        return Err(ValidationError::MustBePositive {
            field: "stock_quantity".to_string(),
        });
    }

    if let Some(sku) = &product.sku {
        validate_sku(sku)?;
    }

    if let Some(url) = &product.image_url {
        if url.chars().count() > 255 {
            return Err(ValidationError::TooLong {
                field: "image_url".to_string(),
                max: 255,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Filter Validators
// =============================================================================

/// Validates page number and page size.
///
/// ## Rules
/// - Page is 1-based
/// - Page size between 1 and [`MAX_PAGE_SIZE`]
pub fn validate_page(page: u32, page_size: u32) -> ValidationResult<()> {
    if page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "pageSize".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }

    Ok(())
}

/// Checks every range in a product filter is ordered.
pub fn validate_product_filter(options: &ProductFilterOptions) -> ValidationResult<()> {
    if let Some(range) = &options.price_range {
        range.validate("priceRange")?;
    }
    if let Some(range) = &options.stock_range {
        range.validate("stockRange")?;
    }
    options.base.pagination()?;
    Ok(())
}

/// Checks paging in a user filter.
pub fn validate_user_filter(options: &UserFilterOptions) -> ValidationResult<()> {
    options.base.pagination()?;
    Ok(())
}

/// Checks `name` is in `allowed`.
///
/// Column names cannot be bound as parameters, so every identifier that
/// reaches SQL text goes through here first.
pub fn validate_identifier<'a>(
    field: &str,
    name: &str,
    allowed: &[&'a str],
) -> ValidationResult<&'a str> {
    allowed
        .iter()
        .copied()
        .find(|candidate| *candidate == name)
        .ok_or_else(|| ValidationError::not_allowed(field, allowed))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Range;
    use rust_decimal::Decimal;

    fn new_user() -> NewUser {
        NewUser {
            fullname: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: 1234567890,
            address: "123 Main St".to_string(),
        }
    }

    fn new_product() -> NewProduct {
        NewProduct {
            product_name: "Sample Product".to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            stock_quantity: 100,
            category_id: None,
            brand_id: None,
            sku: Some("SKU123".to_string()),
            image_url: None,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("john@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("john@localhost").is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SKU-123_A").is_ok());
        assert!(validate_sku("SKU 123").is_err());
        assert!(validate_sku("   ").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(matches!(
            validate_sku(" ABC "),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "sku"
        ));
        assert!(validate_email(" john@example.com").is_err());

        let mut user = new_user();
        user.fullname = "John Doe ".to_string();
        assert!(validate_new_user(&user).is_err());

        let mut product = new_product();
        product.product_name = "\tLamp".to_string();
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_validate_new_user() {
        assert!(validate_new_user(&new_user()).is_ok());

        let mut user = new_user();
        user.phone = 0;
        assert_eq!(
            validate_new_user(&user),
            Err(ValidationError::MustBePositive {
                field: "phone".to_string()
            })
        );
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&new_product()).is_ok());

        let mut product = new_product();
        product.price = Decimal::new(-1, 0);
        assert!(validate_new_product(&product).is_err());

        let mut product = new_product();
        product.stock_quantity = -1;
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(1, 10).is_ok());
        assert!(validate_page(0, 10).is_err());
        assert!(validate_page(1, 0).is_err());
        assert!(validate_page(1, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_validate_product_filter_ranges() {
        let options = ProductFilterOptions {
            price_range: Some(Range::new(Decimal::from(20), Decimal::from(10))),
            ..Default::default()
        };
        assert!(validate_product_filter(&options).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        let allowed = ["id", "email"];
        assert_eq!(validate_identifier("sort_by", "email", &allowed), Ok("email"));
        assert!(validate_identifier("sort_by", "email; DROP TABLE users", &allowed).is_err());
    }
}
