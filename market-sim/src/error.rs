use thiserror::Error;

/// Rejected simulation configuration. Raised only at construction time;
/// everything past that point clamps instead of failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_price must be positive, got {0}")]
    NonPositiveMaxPrice(i64),

    #[error("price_change_factor must be non-negative, got {0}")]
    NegativePriceChangeFactor(i64),

    #[error("{kind} slope must be a finite non-negative number, got {value}")]
    InvalidSlope { kind: &'static str, value: f64 },

    #[error("low_water ({low}) must not exceed high_water ({high})")]
    InvertedDeadBand { low: u64, high: u64 },

    #[error("purchase_probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("duplicate {kind} id {id}")]
    DuplicateAgentId { kind: &'static str, id: u32 },

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
