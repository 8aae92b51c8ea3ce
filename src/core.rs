pub mod curve;
pub mod interval;
pub mod mapper;
pub mod price_set;
pub mod window;

pub use self::{
    curve::{Curve, Resolution},
    interval::IntervalKey,
    mapper::map_to_local_day,
    price_set::IntervalPriceSet,
    window::DayWindow,
};
