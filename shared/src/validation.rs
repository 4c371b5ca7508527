//! Validation utilities for the Agri Assistant client
//!
//! Form-level checks for the checkout and cart views. Each returns a short
//! user-facing message on failure.

use crate::models::CartLine;

// ============================================================================
// Delivery Details
// ============================================================================

/// Validate a mobile number: exactly 10 digits, no separators
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Phone must be 10 digits")
    }
}

/// Validate a postal PIN code: exactly 6 digits
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    if pincode.len() == 6 && pincode.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Pincode must be 6 digits")
    }
}

// ============================================================================
// Cart Quantities
// ============================================================================

/// Parse the quantity typed into a cart row
///
/// Anything that is not a positive integer becomes 1.
pub fn parse_quantity_input(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => 1,
        Ok(qty) => qty,
    }
}

/// Check that a line does not ask for more than the known stock
///
/// Quantities set directly on a line are not clamped, so views call this to
/// warn before checkout.
pub fn validate_line_stock(line: &CartLine) -> Result<(), &'static str> {
    match line.product.stock {
        Some(stock) if stock > 0 && line.qty > stock => Err("Not enough stock"),
        _ => Ok(()),
    }
}
