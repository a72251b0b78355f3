//! # Validation Module
//!
//! Input validation for checkout.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate inline feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── Guest contact completeness before order submission                │
//! │  └── Coupon code shape before the validation round trip                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Server-side services                                         │
//! │  ├── Coupon expiry / usage / applicability                             │
//! │  └── Order acceptance                                                  │
//! │                                                                         │
//! │  Defense in depth: cheap checks here avoid pointless round trips       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::GuestContact;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Coupon Code
// =============================================================================

/// Validates the shape of a coupon code before sending it for resolution.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Maximum 32 characters
/// - Letters, digits, hyphens, underscores only
///
/// ## Returns
/// The trimmed, uppercased code (codes are case-insensitive on the wire).
///
/// ## Example
/// ```rust
/// use sumi_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code(" save20 ").unwrap(), "SAVE20");
/// assert!(validate_coupon_code("").is_err());
/// assert!(validate_coupon_code("ten% off").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: 32,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Guest Contact
// =============================================================================

/// Validates guest contact fields before order submission.
///
/// Name, email, and phone are required; postal code and address stay
/// optional. Errors name the first offending field so the UI can attach
/// the message inline.
///
/// ## Example
/// ```rust
/// use sumi_core::types::GuestContact;
/// use sumi_core::validation::validate_guest_contact;
///
/// let guest = GuestContact {
///     name: "山田 太郎".into(),
///     email: "taro@example.com".into(),
///     phone: "090-0000-0000".into(),
///     postal_code: None,
///     address: None,
/// };
/// assert!(validate_guest_contact(&guest).is_ok());
/// ```
pub fn validate_guest_contact(contact: &GuestContact) -> ValidationResult<()> {
    if contact.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_email(&contact.email)?;

    if contact.phone.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with a non-empty local part and a
///   domain containing a dot
///
/// Intentionally shallow; the mail provider is the real validator.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
