use anyhow::{Result, bail};
use serde_json::Value;
use std::collections::BTreeSet;

pub mod csv;
pub mod json;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;

pub use crate::rpc::Record;

pub trait RecordSink: Send {
    fn add_record(&mut self, record: &Record) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

/// Output column order: `id` first, then the requested fields, or every
/// field seen in `records` sorted by name when none were requested.
pub fn column_order(records: &[Record], requested: &[String]) -> Vec<String> {
    let rest: Vec<String> = if requested.is_empty() {
        records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        requested.to_vec()
    };

    std::iter::once("id".to_string())
        .chain(rest.into_iter().filter(|name| name != "id"))
        .collect()
}

/// Text of one CSV cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

/// CSV delimiter from a user-supplied separator; only its first character
/// counts and it must be ASCII.
pub fn delimiter_byte(separator: &str) -> Result<u8> {
    match separator.chars().next() {
        None => Ok(b','),
        Some(c) if c.is_ascii() => Ok(c as u8),
        Some(c) => bail!("CSV: separator '{}' is not an ASCII character", c),
    }
}
