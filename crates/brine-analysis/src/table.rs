//! Tab-separated analysis tables.
//!
//! The convention matches the tables the simulator's ecosystem reads:
//! one `# `-prefixed header line naming the columns, then one
//! tab-separated row per record. Values are written with the plain
//! shortest-round-trip float format, so a written table re-parses to
//! exactly the values it was built from.

use std::fs;
use std::path::Path;

use crate::error::AnalysisError;

/// A column-named table of f64 rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// An empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// The column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in insertion order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Append a row; its length must match the column count.
    pub fn push_row(&mut self, row: Vec<f64>) -> Result<(), AnalysisError> {
        if row.len() != self.columns.len() {
            return Err(AnalysisError::MalformedTable {
                detail: format!(
                    "row has {} values, table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// One column's values by name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Render to document form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# ");
        out.push_str(&self.columns.join("\t"));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Write to a file.
    pub fn write(&self, path: &Path) -> Result<(), AnalysisError> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Parse a table document.
    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| AnalysisError::MalformedTable {
            detail: "empty document".to_string(),
        })?;
        let header = header
            .strip_prefix("# ")
            .ok_or_else(|| AnalysisError::MalformedTable {
                detail: "missing '# ' header line".to_string(),
            })?;
        let columns: Vec<String> = header.split('\t').map(str::to_string).collect();
        let mut table = Self::new(columns);
        for (idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Result<Vec<f64>, _> = line.split('\t').map(|c| c.trim().parse()).collect();
            let row = row.map_err(|_| AnalysisError::MalformedTable {
                detail: format!("unparseable row {}: '{line}'", idx + 2),
            })?;
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Read a table from a file.
    pub fn read(path: &Path) -> Result<Self, AnalysisError> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn render_and_parse() {
        let mut table = Table::new(vec!["Step".into(), "Time".into(), "Mass".into()]);
        table.push_row(vec![0.0, 0.0, 1.5]).unwrap();
        table.push_row(vec![1.0, 0.08, 1.25]).unwrap();
        let text = table.render();
        assert!(text.starts_with("# Step\tTime\tMass\n"));
        assert_eq!(Table::parse(&text).unwrap(), table);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        assert!(table.push_row(vec![1.0]).is_err());
        assert!(Table::parse("# a\tb\n1.0\n").is_err());
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            Table::parse("1.0\t2.0\n"),
            Err(AnalysisError::MalformedTable { .. })
        ));
    }

    #[test]
    fn column_lookup() {
        let mut table = Table::new(vec!["Step".into(), "Time".into()]);
        table.push_row(vec![0.0, 0.0]).unwrap();
        table.push_row(vec![1.0, 0.08]).unwrap();
        assert_eq!(table.column("Step"), Some(vec![0.0, 1.0]));
        assert_eq!(table.column("Mass"), None);
    }

    proptest! {
        #[test]
        fn tables_round_trip_exactly(
            rows in proptest::collection::vec(
                (proptest::num::f64::NORMAL, proptest::num::f64::NORMAL),
                0..16,
            ),
        ) {
            let mut table = Table::new(vec!["x".into(), "y".into()]);
            for (x, y) in rows {
                table.push_row(vec![x, y]).unwrap();
            }
            prop_assert_eq!(Table::parse(&table.render()).unwrap(), table);
        }
    }
}
