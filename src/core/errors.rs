//! Error types for the service counter

#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("Selection {index} out of range (range is 0 to {max})")]
    SelectionOutOfRange { index: usize, max: usize },

    #[error("No customer found: {0}")]
    CustomerNotFound(String),

    #[error("Queue is full: {0}")]
    QueueFull(String),

    #[error("Stock {value} out of range (range is {min} to {max})")]
    StockOutOfRange { value: u64, min: u32, max: u32 },

    #[error("Insufficient stock: customer requires {required} items, {available} available")]
    InsufficientStock { required: u32, available: u32 },

    #[error("Income for lane {lane} would exceed the counter limit")]
    IncomeOverflow { lane: usize },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CounterError {
    /// Shortfall between required and available stock, if this is a stock error
    pub fn shortfall(&self) -> Option<u32> {
        match self {
            CounterError::InsufficientStock { required, available } => {
                Some(required.saturating_sub(*available))
            }
            _ => None,
        }
    }
}

/// Result type for counter operations
pub type CounterResult<T> = Result<T, CounterError>;
