//! Catalogue product models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::types::ProductId;

/// A product as held by the client
///
/// Payloads are checked once on deserialization: missing price defaults to
/// zero, missing or null stock means "unknown", and negative values are
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ProductPayload")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Written as a JSON number, the shape the catalogue sends
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Wire shape accepted from the backend
#[derive(Debug, Deserialize)]
struct ProductPayload {
    id: ProductId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

impl TryFrom<ProductPayload> for Product {
    type Error = ClientError;

    fn try_from(raw: ProductPayload) -> Result<Self, Self::Error> {
        let price = raw.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(ClientError::InvalidProduct {
                field: "price".into(),
                message: format!("price cannot be negative ({})", price),
            });
        }

        let stock = match raw.stock {
            None => None,
            Some(s) => Some(u32::try_from(s).map_err(|_| ClientError::InvalidProduct {
                field: "stock".into(),
                message: format!("stock out of range ({})", s),
            })?),
        };

        Ok(Product {
            id: raw.id,
            title: raw.title,
            price,
            stock,
            description: raw.description,
            image: raw.image,
            images: raw.images,
        })
    }
}

impl Product {
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            stock: None,
            description: None,
            image: None,
            images: Vec::new(),
        }
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Largest quantity a cart line may reach through adds
    ///
    /// Zero or unknown stock falls back to `fallback`.
    pub fn quantity_ceiling(&self, fallback: u32) -> u32 {
        match self.stock {
            Some(stock) if stock > 0 => stock,
            _ => fallback,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock.map_or(true, |s| s > 0)
    }

    /// First image to show for the product
    pub fn primary_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// One page of the product listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
}
