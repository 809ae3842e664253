pub mod binance;
pub mod bitget;
pub mod display;
pub mod error;
pub mod fixed;
pub mod market;
pub mod source;

pub use display::format_prices_for_display;
pub use error::MarketError;
pub use market::MarketData;
pub use source::{create_source, PriceSource};
