//! Domain types shared by every stage of the pipeline.

pub mod price;

pub use price::{PricePoint, PriceSeries, SeriesError};
