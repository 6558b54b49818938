//! Table definition.

/// Name of the backing table.
pub const TABLE: &str = "stock_prices";

/// Column names in table order.
pub const COLUMNS: [&str; 9] = [
    "ticker",
    "timestamp",
    "open_price",
    "close_price",
    "high_price",
    "low_price",
    "volume_traded",
    "sma_21",
    "range_ratio",
];

pub(crate) const DROP_TABLE: &str = "DROP TABLE IF EXISTS stock_prices";

pub(crate) const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS stock_prices (
        ticker TEXT,
        timestamp INT,
        open_price REAL,
        close_price REAL,
        high_price REAL,
        low_price REAL,
        volume_traded REAL,
        sma_21 REAL,
        range_ratio REAL,
        PRIMARY KEY (ticker, timestamp)
    )";

pub(crate) const INSERT_OR_IGNORE: &str = "
    INSERT OR IGNORE INTO stock_prices
        (ticker, timestamp, open_price, close_price, high_price, low_price,
         volume_traded, sma_21, range_ratio)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

pub(crate) const RECENT_CLOSES: &str = "
    SELECT close_price FROM stock_prices
    WHERE ticker = ?1 AND timestamp <= ?2
    ORDER BY timestamp DESC
    LIMIT ?3";

pub(crate) const RECENT_HIGH_LOW: &str = "
    SELECT high_price, low_price, timestamp FROM stock_prices
    WHERE ticker = ?1 AND timestamp <= ?2
    ORDER BY timestamp DESC
    LIMIT ?3";

pub(crate) const SELECT_ROW: &str = "
    SELECT ticker, timestamp, open_price, close_price, high_price, low_price,
           volume_traded, sma_21, range_ratio
    FROM stock_prices
    WHERE ticker = ?1 AND timestamp = ?2";

pub(crate) const SELECT_ALL: &str = "
    SELECT ticker, timestamp, open_price, close_price, high_price, low_price,
           volume_traded, sma_21, range_ratio
    FROM stock_prices
    ORDER BY ticker, timestamp";

pub(crate) const SELECT_LATEST: &str = "
    SELECT ticker, timestamp, open_price, close_price, high_price, low_price,
           volume_traded, sma_21, range_ratio
    FROM stock_prices
    ORDER BY timestamp DESC, ticker
    LIMIT ?1";
