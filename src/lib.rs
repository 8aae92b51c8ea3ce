#![doc = include_str!("../README.md")]

pub mod api;
pub mod cache;
pub mod config;
pub mod converter;
pub mod core;
pub mod error;
mod prelude;
pub mod quantity;
pub mod resolver;
pub mod statistics;

pub use self::{
    config::Config,
    error::{Error, Result},
    resolver::{PriceQuote, QuotePair, Resolver},
};
