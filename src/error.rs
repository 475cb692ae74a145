use thiserror::Error;

/// Errors produced while decoding save data.
///
/// Header, name-table and SQLite schema failures abort a load. Failures inside
/// a single property value are caught by the property-list decoder, which
/// skips to the declared end of the value and records the event in
/// `parse_errors` instead of propagating.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally impossible data: negative sizes, absurd counts, bad magic.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// A read past the end of the buffer.
    #[error("attempted to read {requested} bytes at offset {offset} with only {available} available")]
    EndOfData {
        requested: usize,
        available: usize,
        offset: usize,
    },

    /// A property tag name that is not in the dispatch table.
    #[error("unknown property type {0:?}")]
    UnknownProperty(String),

    /// A struct class whose body could not be decoded.
    #[error("unknown struct type {0:?}")]
    UnknownStruct(String),

    /// Values outside their expected range, e.g. a non-`None` sentinel.
    #[error("unexpected data: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_data_message_names_offsets() {
        let err = Error::EndOfData {
            requested: 8,
            available: 3,
            offset: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("8 bytes"));
        assert!(msg.contains("offset 12"));
    }
}
