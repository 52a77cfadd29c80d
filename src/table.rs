//! Row-oriented table model shared by all file formats.
//!
//! A `Table` is an ordered list of column names plus rows of scalar cells,
//! one cell per column. Columns can be appended after construction; every
//! existing row is back-filled with `Cell::Empty` so the "all rows share the
//! same column set" invariant holds at every point.

use std::fmt;

/// Scalar cell value. `Empty` is the absent/null marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell's textual form, or `None` for an absent value. This is the
    /// exact string used as the memo key, so no trimming happens here.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Cell::Number(n) => {
                // Integral values print without a trailing ".0" so a written
                // table reads back (and re-writes) byte-identically.
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

/// Ordered, column-named, row-oriented table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Append a row, padding or truncating it to the current column count.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Empty);
        self.rows.push(cells);
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column, appending it (with `Empty` back-fill) if missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Empty);
        }
        self.columns.len() - 1
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row][col]
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        self.rows[row][col] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(vec!["ip".into(), "host".into()]);
        t.push_row(vec![Cell::Text("1.1.1.1".into()), Cell::Text("a".into())]);
        t.push_row(vec![Cell::Empty, Cell::Text("b".into())]);
        t
    }

    #[test]
    fn ensure_column_backfills_existing_rows() {
        let mut t = sample();
        let idx = t.ensure_column("CountryCode");
        assert_eq!(idx, 2);
        assert_eq!(t.columns().len(), 3);
        for row in t.rows() {
            assert_eq!(row.len(), 3);
            assert!(row[2].is_empty());
        }

        // Idempotent: an existing column keeps its index and adds nothing.
        assert_eq!(t.ensure_column("CountryCode"), 2);
        assert_eq!(t.columns().len(), 3);
    }

    #[test]
    fn push_row_pads_short_rows() {
        let mut t = sample();
        t.push_row(vec![Cell::Text("8.8.8.8".into())]);
        assert_eq!(t.rows()[2].len(), 2);
        assert!(t.rows()[2][1].is_empty());
    }

    #[test]
    fn memo_key_is_exact_text() {
        assert_eq!(
            Cell::Text("1.2.3.4 ".into()).as_key(),
            Some("1.2.3.4 ".to_string())
        );
        assert_eq!(Cell::Empty.as_key(), None);
    }

    #[test]
    fn number_display_is_stable() {
        assert_eq!(Cell::Number(10.0).to_string(), "10");
        assert_eq!(Cell::Number(0.5).to_string(), "0.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn empty_string_reads_as_absent() {
        assert_eq!(Cell::from(String::new()), Cell::Empty);
        assert_eq!(Cell::from("x".to_string()), Cell::Text("x".into()));
    }
}
