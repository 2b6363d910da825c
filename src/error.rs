use thiserror::Error;

/// Boxed error produced by an external record source.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for geoscan
#[derive(Debug, Error)]
pub enum GeoScanError {
    /// Coordinate outside the WGS84 range or not finite
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
    /// Negative or non-finite search radius
    #[error("invalid radius: {0} meters")]
    InvalidRadius(f64),
    /// Symbol value outside the base-32 alphabet
    #[error("not a valid base-32 value: {0}")]
    InvalidSymbolValue(u8),
    /// Geohash containing a character outside the base-32 alphabet
    #[error("invalid geohash {geohash:?}: unexpected symbol {symbol:?}")]
    InvalidGeohash { geohash: String, symbol: char },
    /// Error from the geohash encoder
    #[error("geohash error: {0}")]
    Geohash(#[from] geohash::GeohashError),
    /// Configuration rejected by validation or parsing
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Record pulled from a stream that was already closed
    #[error("record stream is closed")]
    StreamClosed,
    /// Failure reported by the record source
    #[error("record source error: {0}")]
    Store(#[source] StoreError),
}

impl GeoScanError {
    /// Wrap an error raised by a record source.
    pub fn store(err: impl Into<StoreError>) -> Self {
        GeoScanError::Store(err.into())
    }
}

impl From<serde_json::Error> for GeoScanError {
    fn from(err: serde_json::Error) -> Self {
        GeoScanError::InvalidConfig(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for GeoScanError {
    fn from(err: toml::de::Error) -> Self {
        GeoScanError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for geoscan operations
pub type Result<T> = std::result::Result<T, GeoScanError>;
