use core::fmt;

/// Failures reported by [`Dict`](crate::Dict) operations.
///
/// Every failing operation leaves the map exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// `pop` of a key that is not present.
    KeyNotFound,
    /// `pop_item` on an empty map.
    EmptyContainer,
    /// `from_keys_values` given differently sized key and value batches.
    LengthMismatch { keys: usize, values: usize },
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::KeyNotFound => f.write_str("key not found"),
            DictError::EmptyContainer => f.write_str("dictionary is empty"),
            DictError::LengthMismatch { keys, values } => write!(
                f,
                "{keys} keys and {values} values do not pair up"
            ),
        }
    }
}

impl std::error::Error for DictError {}
