use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::metrics::VisitSummary;

/// Persistence contract for finalized visits. Export failures are
/// best-effort from the pipeline's point of view and must not stop tracking.
pub trait SummarySink {
    fn export(&mut self, ended_at: DateTime<Local>, summary: &VisitSummary) -> Result<()>;
}

const HEADER: &str = "end_timestamp,gender,age_stable,top_expression,result,total_dwell_sec";

/// Appends one CSV row per finished visit, flushing every few rows so a
/// crash loses little.
pub struct CsvExporter<W: Write> {
    writer: W,
    rows_written: usize,
    flush_interval: usize,
}

impl CsvExporter<BufWriter<File>> {
    /// Create `out_dir` if needed and start a fresh timestamped file in it.
    pub fn open(out_dir: &Path, flush_interval: usize) -> Result<(Self, PathBuf)> {
        create_dir_all(out_dir)
            .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;
        let path = out_dir.join(format!("analytics_{}.csv", Local::now().format("%Y%m%d_%H%M")));
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let exporter = Self::from_writer(BufWriter::new(file), flush_interval)?;
        Ok((exporter, path))
    }
}

impl<W: Write> CsvExporter<W> {
    pub fn from_writer(mut writer: W, flush_interval: usize) -> Result<Self> {
        writeln!(writer, "{}", HEADER)?;
        Ok(Self {
            writer,
            rows_written: 0,
            flush_interval,
        })
    }
}

impl<W: Write> SummarySink for CsvExporter<W> {
    fn export(&mut self, ended_at: DateTime<Local>, summary: &VisitSummary) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{:.2}",
            ended_at.format("%Y-%m-%d %H:%M:%S"),
            summary.gender,
            summary.age,
            summary.expression,
            summary.result,
            summary.dwell_seconds,
        )?;

        self.rows_written += 1;
        if self.flush_interval > 0 && self.rows_written % self.flush_interval == 0 {
            self.writer.flush()?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for CsvExporter<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::VisitResult;
    use chrono::TimeZone;

    fn summary() -> VisitSummary {
        VisitSummary {
            gender: "Male".to_string(),
            age: 25,
            expression: "happy".to_string(),
            result: VisitResult::Stay,
            dwell_seconds: 2.5,
        }
    }

    #[test]
    fn test_header_and_row_format() {
        let mut exporter = CsvExporter::from_writer(Vec::new(), 1).unwrap();
        let ended_at = Local.with_ymd_and_hms(2026, 8, 28, 12, 30, 5).unwrap();
        exporter.export(ended_at, &summary()).unwrap();

        let text = String::from_utf8(std::mem::take(&mut exporter.writer)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("2026-08-28 12:30:05,Male,25,happy,stay,2.50")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_one_row_per_summary() {
        let mut exporter = CsvExporter::from_writer(Vec::new(), 10).unwrap();
        let ended_at = Local.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap();
        for _ in 0..3 {
            exporter.export(ended_at, &summary()).unwrap();
        }

        let text = String::from_utf8(std::mem::take(&mut exporter.writer)).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
