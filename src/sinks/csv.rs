use super::{Record, RecordSink, cell_text};
use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes records as delimited rows under a fixed header.
pub struct CsvSink {
    writer: csv::Writer<Box<dyn Write + Send>>,
    columns: Vec<String>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P, delimiter: u8, columns: Vec<String>) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(Box::new(file), delimiter, columns)
    }

    pub fn from_writer(
        inner: Box<dyn Write + Send>,
        delimiter: u8,
        columns: Vec<String>,
    ) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(inner);
        writer.write_record(&columns)?;
        Ok(Self { writer, columns })
    }

    /// Write an already-textual row, e.g. a rejected import line.
    pub fn add_row(&mut self, row: &[String]) -> Result<()> {
        self.writer.write_record(row)?;
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn add_record(&mut self, record: &Record) -> Result<()> {
        let row: Vec<String> = self
            .columns
            .iter()
            .map(|name| cell_text(record.get(name)))
            .collect();
        self.writer.write_record(&row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
