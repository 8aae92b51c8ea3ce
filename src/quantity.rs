#[macro_use]
mod macros;

pub mod price;

pub use self::price::{ConsumerPrice, WholesalePrice};
