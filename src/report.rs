//! Counts CSV output.
//!
//! One batch run produces a single flat file, `counts.csv`, with a header
//! row and one `filename,framecount` row per counted video. Rows are
//! written in the order given (the batch runner sorts by filename first),
//! and filenames containing separators are quoted per RFC 4180 by the
//! `csv` writer, so re-running an unchanged batch reproduces the file
//! byte-for-byte.

use std::path::Path;

use serde::Serialize;

use crate::error::TallyError;

/// Name of the output file written into the output directory.
pub const COUNTS_FILE_NAME: &str = "counts.csv";

/// One output row: a filename and its frame count.
///
/// The field names double as the CSV header (`filename,framecount`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRecord {
    /// File name (not the full path) of the counted video.
    pub filename: String,
    /// Number of frames. Zero is valid.
    pub framecount: u64,
}

/// Write `records` to a CSV file at `path`, overwriting any existing file.
///
/// Always writes the header row, so an empty record set yields a
/// header-only file rather than an empty one.
///
/// # Errors
///
/// Returns [`TallyError::CsvError`] if the file cannot be created or a row
/// cannot be serialized.
pub fn write_counts_csv<P: AsRef<Path>>(
    path: P,
    records: &[CountRecord],
) -> Result<(), TallyError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    // serialize() only emits the header before the first row; an empty
    // batch still owes the reader a header.
    if records.is_empty() {
        writer.write_record(["filename", "framecount"])?;
    }

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush().map_err(TallyError::IoError)?;

    log::info!("Wrote {} record(s) to {}", records.len(), path.display());

    Ok(())
}

/// Sort records by filename, the order the output file is written in.
pub fn sort_records(records: &mut [CountRecord]) {
    records.sort_by(|a, b| a.filename.cmp(&b.filename));
}

#[cfg(test)]
mod tests {
    use super::{CountRecord, sort_records};

    #[test]
    fn sorts_by_filename() {
        let mut records = vec![
            CountRecord {
                filename: "c.mp4".to_string(),
                framecount: 3,
            },
            CountRecord {
                filename: "a.mp4".to_string(),
                framecount: 1,
            },
            CountRecord {
                filename: "b.h264".to_string(),
                framecount: 2,
            },
        ];
        sort_records(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["a.mp4", "b.h264", "c.mp4"]);
    }
}
