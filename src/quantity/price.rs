use rust_decimal::Decimal;

quantity!(
    /// Day-ahead market clearing price, euros per megawatt-hour.
    WholesalePrice,
    "€/MWh"
);

quantity!(
    /// Tax-inclusive consumer price, euro cents per kilowatt-hour.
    ConsumerPrice,
    "c/kWh"
);

impl ConsumerPrice {
    /// Arithmetic mean, or `None` for an empty input or when the sum overflows.
    #[must_use]
    pub fn mean(prices: impl IntoIterator<Item = Self>) -> Option<Self> {
        let (sum, count) = prices.into_iter().try_fold((Decimal::ZERO, 0_usize), |(sum, count), price| {
            Some((sum.checked_add(price.0)?, count + 1))
        })?;
        (count != 0).then(|| Self(sum / Decimal::from(count)))
    }
}
