//! Wholesale to consumer price conversion.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    error::InvalidArgument,
    quantity::{ConsumerPrice, WholesalePrice},
};

/// Multiplier applied on top of the wholesale energy price, such as VAT.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display, derive_more::From)]
pub struct TaxMultiplier(pub Decimal);

impl TaxMultiplier {
    /// Finnish VAT of 25.5%.
    pub const FINNISH_VAT: Self = Self(Decimal::from_parts(1255, 0, 0, false, 3));

    const MAX: Decimal = Decimal::ONE_HUNDRED;

    /// Accept multipliers in `(0, 100]`.
    pub fn try_new(multiplier: Decimal) -> Result<Self, InvalidArgument> {
        if multiplier > Decimal::ZERO && multiplier <= Self::MAX {
            Ok(Self(multiplier))
        } else {
            Err(InvalidArgument::TaxMultiplier(multiplier.to_string()))
        }
    }
}

impl Default for TaxMultiplier {
    fn default() -> Self {
        Self::FINNISH_VAT
    }
}

impl FromStr for TaxMultiplier {
    type Err = InvalidArgument;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_new(Decimal::from_str(value).map_err(|_| InvalidArgument::TaxMultiplier(value.to_owned()))?)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Converter {
    tax: TaxMultiplier,
}

impl Converter {
    /// `€/MWh` per `c/kWh`.
    const SCALE: Decimal = Decimal::TEN;

    #[must_use]
    pub const fn new(tax: TaxMultiplier) -> Self {
        Self { tax }
    }

    #[must_use]
    pub const fn tax(&self) -> TaxMultiplier {
        self.tax
    }

    /// `wholesale / 10 × tax`, rounded half away from zero to whole hundredths of a cent.
    ///
    /// Saturates at the decimal bounds instead of overflowing.
    #[must_use]
    pub fn to_consumer_price(&self, wholesale: WholesalePrice) -> ConsumerPrice {
        let scaled = wholesale.0 / Self::SCALE;
        let price = scaled.checked_mul(self.tax.0).unwrap_or_else(|| {
            if scaled.is_sign_negative() == self.tax.0.is_sign_negative() { Decimal::MAX } else { Decimal::MIN }
        });
        ConsumerPrice(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}
