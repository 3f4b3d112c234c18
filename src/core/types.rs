use super::errors::{CounterError, CounterResult};
use serde::{Deserialize, Serialize};

/// Delimiter between customer fields in a snapshot line
pub const INFO_DELIMITER: char = ',';

/// Literal used in snapshots for an empty slot
pub const EMPTY_SLOT_MARK: &str = "null";

/// A customer waiting to be served
///
/// Immutable once created. The full name (`first last`) is the sort and
/// search key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    first_name: String,
    last_name: String,
    units_required: u32,
}

impl Customer {
    /// Create a customer without validating the names
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, units_required: u32) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            units_required,
        }
    }

    /// Create a customer after checking both names can be stored in a snapshot
    pub fn validated(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        units_required: u32,
    ) -> CounterResult<Self> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        validate_name(&first_name)?;
        validate_name(&last_name)?;
        Ok(Self::new(first_name, last_name, units_required))
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn units_required(&self) -> u32 {
        self.units_required
    }

    /// Case-insensitive substring match on the full name
    pub fn matches(&self, term: &str) -> bool {
        self.full_name().to_uppercase().contains(&term.to_uppercase())
    }

    /// Snapshot line for this customer, without the trailing newline
    pub fn to_record(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.first_name, INFO_DELIMITER, self.last_name, INFO_DELIMITER, self.units_required
        )
    }
}

impl std::fmt::Display for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({} items)", self.first_name, self.last_name, self.units_required)
    }
}

/// Check a name can round-trip through the snapshot format
pub fn validate_name(name: &str) -> CounterResult<()> {
    if name.contains(INFO_DELIMITER) {
        return Err(CounterError::Validation(format!(
            "'{}' delimiter character detected",
            INFO_DELIMITER
        )));
    }
    if name.is_empty() {
        return Err(CounterError::Validation("empty string detected".to_string()));
    }
    if name == EMPTY_SLOT_MARK {
        return Err(CounterError::Validation(format!("'{}' detected", EMPTY_SLOT_MARK)));
    }
    if name.contains('\n') || name.contains('\r') {
        return Err(CounterError::Validation("newline character detected".to_string()));
    }
    Ok(())
}
