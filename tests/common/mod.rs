#![allow(dead_code)]

use sql_helper::prelude::*;

/// Whiteboard row used across the executor tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub id: Option<i64>,
    pub name: String,
}

impl Board {
    pub fn unsaved(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }
}

impl FromRow for Board {
    fn from_row(row: &CustomDbRow) -> Result<Self, DriverError> {
        Ok(Board {
            id: Some(row.column_int("id")?),
            name: row.column_text("name")?.to_string(),
        })
    }
}

impl EntityWithId for Board {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

pub fn board_row(id: i64, name: &str) -> Vec<RowValues> {
    vec![RowValues::Int(id), RowValues::Text(name.to_string())]
}

pub const BOARD_COLUMNS: &[&str] = &["id", "name"];
