use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{exchange} API returned {status}: {body}")]
    Api {
        exchange: String,
        status: u16,
        body: String,
    },

    #[error("Invalid price for {symbol}: {raw}")]
    InvalidPrice { symbol: String, raw: String },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
