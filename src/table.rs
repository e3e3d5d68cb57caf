use crate::error::{ParserError, Result};

/// Rows of string cells; the first row is the header and fixes the width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new<const N: usize>(header: [&str; N]) -> Self {
        Self {
            rows: vec![header.iter().map(|h| h.to_string()).collect()],
        }
    }

    pub fn push(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.width() {
            return Err(ParserError::RowArity {
                expected: self.width(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Header followed by every data row.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_first_row() {
        let mut t = ResultTable::new(["Status", "Count"]);
        t.push(vec!["Final".into(), "1".into()]).unwrap();
        assert_eq!(t.header(), ["Status", "Count"]);
        assert_eq!(t.rows().len(), 2);
        assert_eq!(t.records(), [vec!["Final".to_string(), "1".to_string()]]);
    }

    #[test]
    fn rejects_wrong_arity() {
        let mut t = ResultTable::new(["a", "b", "c"]);
        let err = t.push(vec!["only".into()]).unwrap_err();
        assert!(matches!(err, ParserError::RowArity { expected: 3, found: 1 }));
        assert!(t.records().is_empty());
    }
}
