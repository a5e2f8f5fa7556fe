//! Per-field index documents: ordered `time \t dataset` lines.

use crate::error::ArchiveError;

/// One line of an index document: a snapshot time and the name of the
/// dataset holding its values in the companion payload store.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
    /// Simulation time of the snapshot.
    pub time: f64,
    /// Dataset name within the payload store.
    pub dataset: String,
}

/// Parse an index document. Blank lines are skipped; entry order is
/// the document's line order.
pub fn parse(text: &str) -> Result<Vec<IndexEntry>, ArchiveError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || ArchiveError::MalformedIndexLine {
            line: idx + 1,
            content: line.to_string(),
        };
        let (time, dataset) = line.split_once('\t').ok_or_else(malformed)?;
        let time: f64 = time.trim().parse().map_err(|_| malformed())?;
        let dataset = dataset.trim();
        if dataset.is_empty() {
            return Err(malformed());
        }
        entries.push(IndexEntry {
            time,
            dataset: dataset.to_string(),
        });
    }
    Ok(entries)
}

/// Render entries back to document form.
pub fn render(entries: &[IndexEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{}\t{}\n", entry.time, entry.dataset));
    }
    out
}
