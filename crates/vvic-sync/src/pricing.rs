//! Price engine: shipping weight, sale/list price and price endings.
//!
//! All arithmetic runs on [`Decimal`] and is truncated to whole currency
//! units only at the end of each formula.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::SyncError;

/// A shipping weight class: base weight in kilograms and a dimensional
/// multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightClass {
    pub base_kg: Decimal,
    pub ratio: Decimal,
}

impl WeightClass {
    /// Looks up one of the eight VVIC weight classes (`1..=8`).
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        let (base_kg, ratio) = match code {
            1 => (Decimal::new(20, 2), Decimal::new(13, 1)),
            2 => (Decimal::new(30, 2), Decimal::new(13, 1)),
            3 => (Decimal::new(40, 2), Decimal::new(12, 1)),
            4 => (Decimal::new(50, 2), Decimal::new(12, 1)),
            5 => (Decimal::new(60, 2), Decimal::new(12, 1)),
            6 => (Decimal::new(80, 2), Decimal::new(11, 1)),
            7 => (Decimal::new(90, 2), Decimal::new(11, 1)),
            8 => (Decimal::new(95, 2), Decimal::new(11, 1)),
            _ => return None,
        };
        Some(Self { base_kg, ratio })
    }

    /// Looks up a weight class, failing on codes outside the table.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownWeightClass`] for codes outside `1..=8`.
    pub fn lookup(code: u8) -> Result<Self, SyncError> {
        Self::from_code(code).ok_or(SyncError::UnknownWeightClass(code))
    }

    /// Weight used for freight: `base_kg × ratio`.
    #[must_use]
    pub fn effective_weight(&self) -> Decimal {
        self.base_kg * self.ratio
    }
}

/// Fixed pricing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    pub margin: Decimal,
    /// First-leg freight per effective kilogram, in vendor currency.
    pub freight_per_kg: Decimal,
    /// Flat last-leg delivery fee, in vendor currency.
    pub last_leg_fee: Decimal,
    pub tax: Decimal,
    /// Vendor currency to selling currency.
    pub exchange_rate: Decimal,
    /// List price over sale price.
    pub list_markup: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            margin: Decimal::ZERO,
            freight_per_kg: Decimal::new(40, 0),
            last_leg_fee: Decimal::new(10, 0),
            tax: Decimal::ZERO,
            exchange_rate: Decimal::new(127, 1),
            list_markup: Decimal::new(12, 1),
        }
    }
}

/// Sale and list price of one SKU, both with price endings applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub sale_price: i64,
    pub list_price: i64,
}

impl PricingRules {
    /// Raw sale price before the price ending is applied.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PriceOverflow`] if the result does not fit `i64`.
    pub fn raw_sale_price(
        &self,
        vendor_price: Decimal,
        weight: &WeightClass,
    ) -> Result<i64, SyncError> {
        let one = Decimal::ONE;
        let freight = weight
            .effective_weight()
            .checked_mul(self.freight_per_kg)
            .ok_or_else(|| overflow("freight"))?;
        let landed = (one + self.margin)
            .checked_mul(vendor_price)
            .and_then(|goods| goods.checked_add(freight))
            .and_then(|cost| cost.checked_add(self.last_leg_fee))
            .ok_or_else(|| overflow("landed cost"))?;
        let sale = landed
            .checked_mul(one + self.tax)
            .and_then(|taxed| taxed.checked_mul(self.exchange_rate))
            .ok_or_else(|| overflow("sale price"))?;
        truncate(sale, "sale price")
    }

    /// Sale and list price for a vendor price in the given weight class.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PriceOverflow`] if a price does not fit `i64`.
    pub fn quote(&self, vendor_price: Decimal, weight: &WeightClass) -> Result<Quote, SyncError> {
        let sale_price = round_price_ending(self.raw_sale_price(vendor_price, weight)?);
        let list = Decimal::from(sale_price)
            .checked_mul(self.list_markup)
            .ok_or_else(|| overflow("list price"))?;
        let list_raw = truncate(list, "list price")?;
        Ok(Quote {
            sale_price,
            list_price: round_price_ending(list_raw),
        })
    }
}

fn truncate(value: Decimal, context: &str) -> Result<i64, SyncError> {
    value.trunc().to_i64().ok_or_else(|| overflow(context))
}

fn overflow(context: &str) -> SyncError {
    SyncError::PriceOverflow {
        context: context.to_string(),
    }
}

/// Applies the price-ending convention to the last digit: `0..=4` becomes
/// `0`, `5` and `6` stay, `7..=9` become `8`.
#[must_use]
pub fn round_price_ending(price: i64) -> i64 {
    let tail = price.rem_euclid(10);
    let tens = price - tail;
    let new_tail = match tail {
        7..=9 => 8,
        0..=4 => 0,
        other => other,
    };
    tens + new_tail
}
