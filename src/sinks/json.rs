use super::{Record, RecordSink};
use anyhow::Result;
use std::io::{BufWriter, Write};

/// Collects records and writes them as one indented JSON array.
pub struct JsonSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    records: Vec<Record>,
}

impl JsonSink {
    pub fn new(inner: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(inner),
            records: Vec::new(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl RecordSink for JsonSink {
    fn add_record(&mut self, record: &Record) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
