//! Board model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::{FieldValue, Fields, Record, RecordId};

/// Record type holding boards.
pub const BOARD_RECORD_TYPE: &str = "Board";
/// String field holding the board's display name.
pub const BOARD_NAME_FIELD: &str = "BoardName";
/// Name given to new boards and to records stored without one.
pub const DEFAULT_BOARD_NAME: &str = "Untitled";

/// A named collection of media items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Store-assigned identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
}

impl Board {
    /// Decode a board from its record.
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.record_type != BOARD_RECORD_TYPE {
            return Err(Error::InvalidInput(format!(
                "Expected a {BOARD_RECORD_TYPE} record, got {}",
                record.record_type
            )));
        }

        let name = record
            .string(BOARD_NAME_FIELD)
            .unwrap_or(DEFAULT_BOARD_NAME)
            .to_string();

        Ok(Self {
            id: record.id,
            name,
        })
    }

    /// Fields for a new board record.
    pub fn new_fields(name: &str) -> Result<Fields> {
        let name = normalize_board_name(name)?;
        let mut fields = Fields::new();
        fields.insert(BOARD_NAME_FIELD.to_string(), FieldValue::String(name));
        Ok(fields)
    }
}

/// Trim a board name, rejecting blank names.
pub fn normalize_board_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput("Board name cannot be empty".to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}
