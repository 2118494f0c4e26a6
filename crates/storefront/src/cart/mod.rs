//! Visitor cart.
//!
//! The cart is a non-authoritative mirror held in the visitor's session.
//! Prices shown here are what the menu displayed when the item was added;
//! the backend recomputes everything when the order is placed.
//!
//! Lines are keyed by `(product_id, size)`, so the same juice in two sizes
//! occupies two lines.

pub mod store;
mod voucher;

pub use voucher::AppliedVoucher;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use juicequ_core::{DrinkSize, PaymentMethod, Price, ProductId};

use crate::backend::{ChatCartLine, CreateOrderItem, CreateOrderRequest};

/// Upper bound on the quantity of a single line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Item not found in cart")]
    ItemNotFound,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub size: DrinkSize,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    fn is_line(&self, product_id: ProductId, size: DrinkSize) -> bool {
        self.product_id == product_id && self.size == size
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub voucher: Option<AppliedVoucher>,
}

impl Cart {
    /// Add an item, merging with an existing line of the same product and size.
    ///
    /// The name and price of a merged line are refreshed from `item`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `item.quantity` is zero.
    pub fn add(&mut self, item: CartItem) -> Result<&CartItem, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let index = if let Some(index) = self
            .items
            .iter()
            .position(|line| line.is_line(item.product_id, item.size))
        {
            let line = &mut self.items[index];
            line.quantity = line
                .quantity
                .saturating_add(item.quantity)
                .min(MAX_LINE_QUANTITY);
            line.name = item.name;
            line.unit_price = item.unit_price;
            if item.image_url.is_some() {
                line.image_url = item.image_url;
            }
            index
        } else {
            self.items.push(CartItem {
                quantity: item.quantity.min(MAX_LINE_QUANTITY),
                ..item
            });
            self.items.len() - 1
        };

        Ok(&self.items[index])
    }

    /// Set the quantity of a line. Zero removes it; values above the cap are
    /// capped.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        size: DrinkSize,
        quantity: u32,
    ) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.is_line(product_id, size))
            .ok_or(CartError::ItemNotFound)?;

        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity.min(MAX_LINE_QUANTITY);
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line does not exist.
    pub fn remove(&mut self, product_id: ProductId, size: DrinkSize) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.is_line(product_id, size))
            .ok_or(CartError::ItemNotFound)?;
        Ok(self.items.remove(index))
    }

    /// Remove every line of a product regardless of size. Returns how many
    /// lines were removed.
    pub fn remove_product(&mut self, product_id: ProductId) -> usize {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        before - self.items.len()
    }

    /// Remove (or decrement) the first line whose name matches `phrase`.
    ///
    /// Matching is case-insensitive and works both ways: "mangga" matches
    /// "Jus Mangga", and "jus mangga besar" matches "Jus Mangga". With a
    /// quantity the line is decremented by that many and removed once it
    /// reaches zero. Returns the name of the matched line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if nothing matches.
    pub fn remove_matching(
        &mut self,
        phrase: &str,
        quantity: Option<u32>,
    ) -> Result<String, CartError> {
        let needle = phrase.trim().to_lowercase();
        if needle.is_empty() {
            return Err(CartError::ItemNotFound);
        }

        let index = self
            .items
            .iter()
            .position(|line| {
                let name = line.name.to_lowercase();
                name.contains(&needle) || needle.contains(&name)
            })
            .ok_or(CartError::ItemNotFound)?;

        let name = self.items[index].name.clone();
        match quantity {
            Some(n) if n < self.items[index].quantity => {
                self.items[index].quantity -= n;
            }
            _ => {
                self.items.remove(index);
            }
        }
        Ok(name)
    }

    /// Remove every line and the voucher.
    pub fn clear(&mut self) {
        self.items.clear();
        self.voucher = None;
    }

    pub fn apply_voucher(&mut self, voucher: AppliedVoucher) {
        self.voucher = Some(voucher);
    }

    pub fn remove_voucher(&mut self) -> Option<AppliedVoucher> {
        self.voucher.take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of cups across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Discount from the applied voucher, recomputed from the current subtotal.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.voucher
            .as_ref()
            .map_or(Decimal::ZERO, |v| v.discount_for(self.subtotal()))
    }

    /// `subtotal - discount`, never negative.
    #[must_use]
    pub fn total(&self) -> Decimal {
        (self.subtotal() - self.discount()).max(Decimal::ZERO)
    }

    /// Build the backend order request for this cart.
    ///
    /// Returns `None` for an empty cart.
    #[must_use]
    pub fn to_order_request(
        &self,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Option<CreateOrderRequest> {
        if self.is_empty() {
            return None;
        }
        Some(CreateOrderRequest {
            items: self
                .items
                .iter()
                .map(|line| CreateOrderItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    size: line.size,
                })
                .collect(),
            voucher_code: self.voucher.as_ref().map(|v| v.code.clone()),
            payment_method,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Lines as context for the ordering assistant.
    #[must_use]
    pub fn chat_context(&self) -> Vec<ChatCartLine> {
        self.items
            .iter()
            .map(|line| ChatCartLine {
                product_id: line.product_id,
                name: line.name.clone(),
                quantity: line.quantity,
                size: line.size,
            })
            .collect()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// JSON view of the cart with formatted prices.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLineSummary>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub voucher_code: Option<String>,
    pub subtotal_display: String,
    pub discount_display: String,
    pub total_display: String,
}

/// JSON view of one line.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineSummary {
    pub product_id: ProductId,
    pub name: String,
    pub size: DrinkSize,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub unit_price_display: String,
    pub line_total_display: String,
    pub image_url: Option<String>,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let discount = cart.discount();
        let total = cart.total();
        Self {
            items: cart
                .items
                .iter()
                .map(|line| CartLineSummary {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    size: line.size,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                    unit_price_display: Price::idr(line.unit_price).display(),
                    line_total_display: Price::idr(line.line_total()).display(),
                    image_url: line.image_url.clone(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal,
            discount,
            total,
            voucher_code: cart.voucher.as_ref().map(|v| v.code.clone()),
            subtotal_display: Price::idr(subtotal).display(),
            discount_display: Price::idr(discount).display(),
            total_display: Price::idr(total).display(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::DiscountKind;

    fn item(id: i32, name: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: name.to_string(),
            unit_price: Decimal::new(price, 0),
            quantity,
            size: DrinkSize::Medium,
            image_url: None,
        }
    }

    #[test]
    fn test_add_merges_same_product_and_size() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Mangga", 15_000, 1)).unwrap();
        cart.add(item(1, "Jus Mangga Segar", 16_000, 2)).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.items[0].name, "Jus Mangga Segar");
        assert_eq!(cart.items[0].unit_price, Decimal::new(16_000, 0));
    }

    #[test]
    fn test_add_keeps_sizes_apart() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Mangga", 15_000, 1)).unwrap();
        cart.add(CartItem {
            size: DrinkSize::Large,
            ..item(1, "Jus Mangga", 20_000, 1)
        })
        .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), Decimal::new(35_000, 0));
    }

    #[test]
    fn test_add_rejects_zero_and_caps_quantity() {
        let mut cart = Cart::default();
        assert_eq!(
            cart.add(item(1, "Jus Jeruk", 12_000, 0)),
            Err(CartError::InvalidQuantity)
        );

        cart.add(item(1, "Jus Jeruk", 12_000, 60)).unwrap();
        let line = cart.add(item(1, "Jus Jeruk", 12_000, 60)).unwrap();
        assert_eq!(line.quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Jeruk", 12_000, 1)).unwrap();

        cart.update_quantity(ProductId::new(1), DrinkSize::Medium, 4)
            .unwrap();
        assert_eq!(cart.item_count(), 4);

        cart.update_quantity(ProductId::new(1), DrinkSize::Medium, 500)
            .unwrap();
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);

        cart.update_quantity(ProductId::new(1), DrinkSize::Medium, 0)
            .unwrap();
        assert!(cart.is_empty());

        assert_eq!(
            cart.update_quantity(ProductId::new(1), DrinkSize::Medium, 1),
            Err(CartError::ItemNotFound)
        );
    }

    #[test]
    fn test_remove_unknown_line() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Jeruk", 12_000, 1)).unwrap();
        assert_eq!(
            cart.remove(ProductId::new(1), DrinkSize::Large),
            Err(CartError::ItemNotFound)
        );
        assert_eq!(
            cart.remove(ProductId::new(1), DrinkSize::Medium)
                .unwrap()
                .name,
            "Jus Jeruk"
        );
    }

    #[test]
    fn test_remove_matching_by_name_both_ways() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Mangga", 15_000, 1)).unwrap();
        cart.add(item(2, "Jus Alpukat", 18_000, 1)).unwrap();

        assert_eq!(cart.remove_matching("ALPUKAT", None).unwrap(), "Jus Alpukat");
        assert_eq!(
            cart.remove_matching("jus mangga besar", None).unwrap(),
            "Jus Mangga"
        );
        assert!(cart.is_empty());
        assert_eq!(
            cart.remove_matching("mangga", None),
            Err(CartError::ItemNotFound)
        );
    }

    #[test]
    fn test_remove_matching_decrements() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Mangga", 15_000, 3)).unwrap();

        cart.remove_matching("mangga", Some(2)).unwrap();
        assert_eq!(cart.item_count(), 1);

        cart.remove_matching("mangga", Some(5)).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_drops_voucher() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Jeruk", 12_000, 2)).unwrap();
        cart.apply_voucher(AppliedVoucher {
            code: "HEMAT".to_string(),
            kind: DiscountKind::Fixed,
            value: Decimal::new(5_000, 0),
            min_purchase: None,
            max_discount: None,
        });
        assert_eq!(cart.total(), Decimal::new(19_000, 0));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.voucher.is_none());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_discount_follows_cart_changes() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Jeruk", 10_000, 1)).unwrap();
        cart.apply_voucher(AppliedVoucher {
            code: "MIN20".to_string(),
            kind: DiscountKind::Percentage,
            value: Decimal::new(10, 0),
            min_purchase: Some(Decimal::new(20_000, 0)),
            max_discount: None,
        });
        assert_eq!(cart.discount(), Decimal::ZERO);

        cart.update_quantity(ProductId::new(1), DrinkSize::Medium, 3)
            .unwrap();
        assert_eq!(cart.discount(), Decimal::new(3_000, 0));
        assert_eq!(cart.total(), Decimal::new(27_000, 0));
    }

    #[test]
    fn test_order_request() {
        let mut cart = Cart::default();
        assert!(cart.to_order_request(PaymentMethod::Cash, None).is_none());

        cart.add(CartItem {
            size: DrinkSize::Large,
            ..item(7, "Jus Semangka", 14_000, 2)
        })
        .unwrap();
        cart.apply_voucher(AppliedVoucher {
            code: "SEGAR".to_string(),
            kind: DiscountKind::Fixed,
            value: Decimal::new(1_000, 0),
            min_purchase: None,
            max_discount: None,
        });

        let request = cart
            .to_order_request(PaymentMethod::Qris, Some("  ".to_string()))
            .unwrap();
        assert_eq!(
            request.items,
            vec![CreateOrderItem {
                product_id: ProductId::new(7),
                quantity: 2,
                size: DrinkSize::Large,
            }]
        );
        assert_eq!(request.voucher_code.as_deref(), Some("SEGAR"));
        assert_eq!(request.payment_method, PaymentMethod::Qris);
        assert!(request.notes.is_none());
    }

    #[test]
    fn test_summary_formats_prices() {
        let mut cart = Cart::default();
        cart.add(item(1, "Jus Jeruk", 12_500, 2)).unwrap();
        let summary = CartSummary::from(&cart);
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_display, "Rp 25.000");
        assert_eq!(summary.items[0].unit_price_display, "Rp 12.500");
    }
}
