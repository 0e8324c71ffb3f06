//! Report output.

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::plan::{Row, Value};

/// The ordered rows of one report, with its fixed column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub report: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Rows are rebuilt in `columns` order; a column a row lacks reads as missing.
    pub fn new(report: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = if columns.is_empty() {
            rows
        } else {
            rows.into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .fold(Row::new(), |out, c| out.with(c.as_str(), row.value(c)))
                })
                .collect()
        };
        Self {
            report: report.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Vec<Value> {
        self.rows.iter().map(|r| r.value(name)).collect()
    }

    /// Render as a plain-text table.
    pub fn to_table(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| self.columns.iter().map(|c| row.value(c).to_string()).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |values: &[String]| -> String {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = String::new();
        out.push_str(&line(&self.columns));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&format!("|-{}-|", rule.join("-|-")));
        out.push('\n');
        for row in &cells {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

/// A result set serializes as a JSON array of row objects.
impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
