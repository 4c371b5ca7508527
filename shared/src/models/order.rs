//! Checkout and order models

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{Cart, Session};
use crate::error::{ClientError, ClientResult};
use crate::storage::KeyValueStore;
use crate::types::ProductId;
use crate::validation::{validate_indian_phone, validate_pincode};

/// Shipping address collected at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    #[validate(length(min = 1, code = "required"))]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[validate(
        length(min = 1, code = "required"),
        custom = "phone_rule"
    )]
    pub phone: String,
    #[validate(length(min = 1, code = "required"))]
    pub address: String,
    #[validate(length(min = 1, code = "required"))]
    pub city: String,
    #[validate(length(min = 1, code = "required"))]
    pub state: String,
    #[validate(length(min = 1, code = "required"), custom = "pincode_rule")]
    pub pincode: String,
}

fn phone_rule(phone: &str) -> Result<(), ValidationError> {
    validate_indian_phone(phone).map_err(|_| ValidationError::new("phone"))
}

fn pincode_rule(pincode: &str) -> Result<(), ValidationError> {
    validate_pincode(pincode).map_err(|_| ValidationError::new("pincode"))
}

/// Fields in the order their errors are reported, with their wire names
const DELIVERY_FIELDS: &[(&str, &str)] = &[
    ("full_name", "fullName"),
    ("phone", "phone"),
    ("address", "address"),
    ("city", "city"),
    ("state", "state"),
    ("pincode", "pincode"),
];

impl DeliveryDetails {
    /// Check the form, reporting missing fields before format problems
    pub fn check(&self) -> ClientResult<()> {
        let errors = match self.validate() {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };
        let by_field = errors.field_errors();
        let failed = |field: &str, wire: &str, code: Option<&str>| {
            [field, wire].iter().any(|key| {
                by_field.get(*key).map_or(false, |errs| {
                    code.map_or(true, |code| errs.iter().any(|e| e.code == code))
                })
            })
        };

        if let Some((_, wire)) = DELIVERY_FIELDS
            .iter()
            .find(|(field, wire)| failed(*field, *wire, Some("required")))
        {
            return Err(invalid(wire, "All fields are required"));
        }
        if failed("phone", "phone", None) {
            return Err(invalid("phone", "Phone must be 10 digits"));
        }
        Err(invalid("pincode", "Pincode must be 6 digits"))
    }
}

fn invalid(field: &str, message: &str) -> ClientError {
    ClientError::InvalidDeliveryDetails {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// How the buyer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,
    Upi,
    Card,
}

impl PaymentMethod {
    pub const ALL: &'static [PaymentMethod] = &[PaymentMethod::Cod, PaymentMethod::Upi, PaymentMethod::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }

    /// UPI and card payments are not offered yet
    pub fn is_available(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ClientError::PaymentMethodUnavailable(s.to_string()))
    }
}

/// Line of a checkout request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub qty: u32,
}

/// Body of the checkout call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub buyer_id: String,
    pub items: Vec<CheckoutItem>,
    pub shipping: DeliveryDetails,
    pub payment_method: PaymentMethod,
}

/// Build the checkout request for the current cart
///
/// Fails when the buyer is not logged in, the cart is empty, the delivery
/// details are incomplete, or the payment method is not offered, in that order.
pub fn prepare_checkout<S: KeyValueStore>(
    session: &Session,
    cart: &Cart<S>,
    shipping: &DeliveryDetails,
    payment_method: PaymentMethod,
) -> ClientResult<CheckoutRequest> {
    if !session.is_logged_in() {
        return Err(ClientError::LoginRequired);
    }
    if cart.is_empty() {
        return Err(ClientError::EmptyCart);
    }
    shipping.check()?;
    if !payment_method.is_available() {
        return Err(ClientError::PaymentMethodUnavailable(
            payment_method.as_str().to_string(),
        ));
    }

    let items = cart
        .items()
        .iter()
        .map(|line| CheckoutItem {
            product_id: line.product.id.clone(),
            qty: line.qty,
        })
        .collect();

    tracing::debug!(buyer = session.buyer_id(), lines = cart.len(), "checkout prepared");

    Ok(CheckoutRequest {
        buyer_id: session.buyer_id().to_string(),
        items,
        shipping: shipping.clone(),
        payment_method,
    })
}

/// Order status as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Ordered,
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// Status this client does not know about
    Other(String),
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Ordered" => OrderStatus::Ordered,
            "Placed" => OrderStatus::Placed,
            "Processing" => OrderStatus::Processing,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            "Cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Ordered => write!(f, "Ordered"),
            OrderStatus::Placed => write!(f, "Placed"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
            OrderStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Order summary returned by a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order: PlacedOrder,
}

/// An order in the buyer's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub title: String,
    pub qty: u32,
    pub price: Decimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.qty))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}
