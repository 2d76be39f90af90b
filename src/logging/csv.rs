//! CSV sink for tick records.

use super::{Logger, TickRecord};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Header row written when a [`CsvLogger`] is created.
pub const CSV_HEADER: &str =
    "MachineId,BlackboardId,BlackboardLog,Message,CurrentStateName,TargetStateName,Duration (us)";

/// Writes one CSV row per tick to any writer.
///
/// Write failures never interrupt ticking; they are reported as `tracing`
/// warnings and the record is dropped.
#[derive(Debug)]
pub struct CsvLogger<W: Write> {
    writer: W,
}

impl<W: Write> CsvLogger<W> {
    /// Wrap `writer` and emit the header row.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{CSV_HEADER}")?;
        Ok(Self { writer })
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_record(&mut self, record: &TickRecord<'_>) -> io::Result<()> {
        let snapshot = record.blackboard.as_deref().unwrap_or_default();
        writeln!(
            self.writer,
            "{},{:#x},{},{},{},{},{}",
            record.machine_id,
            record.blackboard_id,
            escape(snapshot),
            record.branch,
            escape(record.current_state),
            escape(record.target_state),
            record.duration.as_micros()
        )
    }
}

impl CsvLogger<BufWriter<File>> {
    /// Create (or truncate) a log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> Logger for CsvLogger<W> {
    fn log(&mut self, record: &TickRecord<'_>) {
        if let Err(error) = self.write_record(record) {
            tracing::warn!(%error, machine_id = %record.machine_id, "Failed to write tick record");
        }
    }
}

/// Quote a field when it contains a delimiter, a quote or a line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::TickBranch;
    use std::time::Duration;
    use uuid::Uuid;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record<'a>(snapshot: Option<&str>, current: &'a str) -> TickRecord<'a> {
        TickRecord {
            machine_id: Uuid::nil(),
            blackboard_id: 255,
            current_state: current,
            blackboard: snapshot.map(str::to_string),
            branch: TickBranch::Condition(1),
            target_state: "Finishing",
            duration: Duration::from_micros(12),
        }
    }

    fn output(logger: CsvLogger<Vec<u8>>) -> String {
        String::from_utf8(logger.into_inner()).unwrap()
    }

    #[test]
    fn header_is_written_on_creation() {
        let logger = CsvLogger::new(Vec::new()).unwrap();
        assert_eq!(output(logger), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn one_row_per_record() {
        let mut logger = CsvLogger::new(Vec::new()).unwrap();
        logger.log(&record(None, "__main__:Start"));

        let text = output(logger);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "00000000-0000-0000-0000-000000000000,0xff,,Condition 1 hit,__main__:Start,Finishing,12"
        );
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let mut logger = CsvLogger::new(Vec::new()).unwrap();
        logger.log(&record(Some("say \"a,b\""), "__main__:Start"));

        let text = output(logger);
        assert!(text.contains(",\"say \"\"a,b\"\"\","));
    }

    #[test]
    fn write_failures_do_not_panic() {
        let mut logger = CsvLogger {
            writer: FailingWriter,
        };
        logger.log(&record(None, "__main__:Start"));
        assert!(CsvLogger::new(FailingWriter).is_err());
    }

    #[test]
    fn escape_leaves_plain_fields_borrowed() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape("a\nb"), "\"a\nb\"");
    }
}
