//! WebAssembly module for the Agri Assistant client
//!
//! Provides client-side computation for:
//! - NPK deficiency estimates
//! - The persisted shopping cart
//! - Checkout payload preparation
//!
//! Structured values cross the boundary as JSON strings; errors are thrown as
//! JSON-encoded `{ code, message, field? }` objects.

use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{ClientConfig, ClientError, ClientResult, KeyValueStore};

mod storage;

pub use storage::LocalStorage;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: ClientError) -> JsValue {
    let detail = err.detail();
    match serde_json::to_string(&detail) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&detail.message),
    }
}

// ============================================================================
// NPK questionnaire
// ============================================================================

/// Estimate NPK targets from questionnaire answers (JSON in, JSON out)
#[wasm_bindgen(js_name = estimateNpk)]
pub fn estimate_npk(answers_json: &str) -> Result<String, JsValue> {
    estimate_json(answers_json).map_err(to_js)
}

fn estimate_json(answers_json: &str) -> ClientResult<String> {
    let answers: NpkAnswers = serde_json::from_str(answers_json)?;
    let result = estimate(&answers)?;
    Ok(serde_json::to_string(&result)?)
}

fn labels<T: ToString>(options: &[T]) -> Vec<String> {
    options.iter().map(ToString::to_string).collect()
}

fn to_array(values: Vec<String>) -> js_sys::Array {
    values.into_iter().map(JsValue::from).collect()
}

#[wasm_bindgen(js_name = npkCrops)]
pub fn npk_crops() -> js_sys::Array {
    to_array(labels(Crop::ALL))
}

#[wasm_bindgen(js_name = npkPreviousCrops)]
pub fn npk_previous_crops() -> js_sys::Array {
    to_array(labels(PreviousCrop::ALL))
}

#[wasm_bindgen(js_name = npkLeafColors)]
pub fn npk_leaf_colors() -> js_sys::Array {
    to_array(labels(LeafColor::ALL))
}

#[wasm_bindgen(js_name = npkGrowthPatterns)]
pub fn npk_growth_patterns() -> js_sys::Array {
    to_array(labels(GrowthPattern::ALL))
}

#[wasm_bindgen(js_name = npkSoilTypes)]
pub fn npk_soil_types() -> js_sys::Array {
    to_array(labels(SoilType::ALL))
}

#[wasm_bindgen(js_name = npkIrrigationFrequencies)]
pub fn npk_irrigation_frequencies() -> js_sys::Array {
    to_array(labels(IrrigationFrequency::ALL))
}

// ============================================================================
// Cart
// ============================================================================

/// Cart bound to `localStorage`, plus the session it checks out under
#[wasm_bindgen]
pub struct CartStore {
    cart: Cart<LocalStorage>,
    config: ClientConfig,
}

#[wasm_bindgen]
impl CartStore {
    /// Open the stored cart; `config_json` overrides the default settings
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<CartStore, JsValue> {
        let config = match config_json {
            Some(json) => ClientConfig::from_json(&json).map_err(|e| to_js(e.into()))?,
            None => ClientConfig::default(),
        };
        let store = LocalStorage::open().map_err(to_js)?;
        let cart = Cart::load(store, config.cart.clone());
        Ok(CartStore { cart, config })
    }

    /// Cart lines as JSON, newest first
    pub fn items(&self) -> Result<String, JsValue> {
        self.cart.to_json().map_err(to_js)
    }

    pub fn len(&self) -> usize {
        self.cart.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cart.total().to_f64().unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = totalDisplay)]
    pub fn total_display(&self) -> String {
        format_price(self.cart.total(), &self.config.currency_symbol)
    }

    #[wasm_bindgen(js_name = addToCart)]
    pub fn add_to_cart(&mut self, product_json: &str, qty: Option<u32>) -> Result<(), JsValue> {
        let product: Product = serde_json::from_str(product_json).map_err(|e| to_js(e.into()))?;
        self.cart.add_to_cart(product, qty.unwrap_or(1));
        Ok(())
    }

    #[wasm_bindgen(js_name = updateQty)]
    pub fn update_qty(&mut self, product_id: &str, qty: u32) {
        self.cart.update_quantity(&ProductId::from(product_id), qty);
    }

    /// Set a quantity from raw input text; non-positive or unparsable input becomes 1
    #[wasm_bindgen(js_name = updateQtyInput)]
    pub fn update_qty_input(&mut self, product_id: &str, raw: &str) {
        self.update_qty(product_id, parse_quantity_input(raw));
    }

    pub fn remove(&mut self, product_id: &str) {
        self.cart.remove(&ProductId::from(product_id));
    }

    pub fn clear(&mut self) {
        self.cart.clear();
    }

    /// Ids of lines asking for more than the known stock
    #[wasm_bindgen(js_name = stockWarnings)]
    pub fn stock_warnings(&self) -> js_sys::Array {
        to_array(over_stock_ids(self.cart.items()))
    }

    // ------------------------------------------------------------------------
    // Session and checkout
    // ------------------------------------------------------------------------

    #[wasm_bindgen(getter, js_name = apiBase)]
    pub fn api_base(&self) -> String {
        self.config.api_base.clone()
    }

    #[wasm_bindgen(js_name = isLoggedIn)]
    pub fn is_logged_in(&self) -> bool {
        self.session().is_logged_in()
    }

    /// Build the checkout request body for the current cart
    #[wasm_bindgen(js_name = prepareCheckout)]
    pub fn prepare_checkout(&self, details_json: &str, payment_method: &str) -> Result<String, JsValue> {
        checkout_json(&self.session(), &self.cart, details_json, payment_method).map_err(to_js)
    }

    /// Empty the cart once the backend has accepted the order
    #[wasm_bindgen(js_name = completeCheckout)]
    pub fn complete_checkout(&mut self) {
        self.cart.clear();
    }

    /// Forget the session and the cart
    pub fn logout(&mut self) -> Result<(), JsValue> {
        Session::logout(self.cart.store(), &self.config.session).map_err(to_js)?;
        self.cart.clear();
        Ok(())
    }

    fn session(&self) -> Session {
        Session::load(self.cart.store(), &self.config.session)
    }
}

fn checkout_json<S: KeyValueStore>(
    session: &Session,
    cart: &Cart<S>,
    details_json: &str,
    payment_method: &str,
) -> ClientResult<String> {
    let details: DeliveryDetails = serde_json::from_str(details_json)?;
    let payment_method: PaymentMethod = payment_method.parse()?;
    let request = prepare_checkout(session, cart, &details, payment_method)?;
    Ok(serde_json::to_string(&request)?)
}

fn over_stock_ids(lines: &[CartLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| validate_line_stock(line).is_err())
        .map(|line| line.product.id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::MemoryStore;

    #[test]
    fn test_estimate_json() {
        let json = estimate_json(
            r#"{"crop": "rice", "leafColor": "Yellowish", "soil": "Sandy", "irrigation": "Rarely"}"#,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["adjustedNPK"]["N"], 67);
        assert_eq!(value["adjustedNPK"]["K"], 25);
    }

    #[test]
    fn test_estimate_json_rejects_blank_crop() {
        let err = estimate_json(r#"{"crop": ""}"#).unwrap_err();
        assert_eq!(err.code(), "CROP_NOT_SELECTED");
    }

    #[test]
    fn test_option_labels() {
        let crops = labels(Crop::ALL);
        assert_eq!(crops.len(), 22);
        assert_eq!(crops[0], "rice");
        assert_eq!(
            labels(IrrigationFrequency::ALL),
            vec!["Daily", "2-3 times/week", "Weekly", "Rarely"]
        );
    }

    #[test]
    fn test_checkout_json() {
        let store = MemoryStore::new();
        store.set("access_token", "jwt").unwrap();
        let mut cart = Cart::open(&store);
        cart.add_to_cart(Product::new("p-1", "Drip Kit", Decimal::from(2200)), 2);

        let session = Session::load(&store, &Default::default());
        let details = r#"{"fullName": "Asha", "phone": "9876543210", "address": "Ward 4",
                          "city": "Guntur", "state": "Andhra Pradesh", "pincode": "522001"}"#;
        let json = checkout_json(&session, &cart, details, "cod").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["buyer_id"], "guest");
        assert_eq!(value["items"][0]["qty"], 2);

        let err = checkout_json(&session, &cart, details, "bitcoin").unwrap_err();
        assert_eq!(err.code(), "PAYMENT_METHOD_UNAVAILABLE");
    }

    #[test]
    fn test_over_stock_ids() {
        let store = MemoryStore::new();
        let mut cart = Cart::open(&store);
        cart.add_to_cart(Product::new("p-1", "Sprayer", Decimal::from(1500)).with_stock(2), 1);
        cart.add_one(Product::new("p-2", "Seeds", Decimal::from(90)).with_stock(5));
        cart.update_quantity(&ProductId::from("p-1"), 4);

        assert_eq!(over_stock_ids(cart.items()), vec!["p-1".to_string()]);
    }
}
