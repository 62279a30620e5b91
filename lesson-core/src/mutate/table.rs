use super::check;
use crate::error::Rejection;
use crate::model::TableData;

/// Structural and content edits on a table block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEdit {
    SetTitle(String),
    /// Append an empty column
    AddColumn,
    /// Refused while only one column is left
    RemoveColumn(usize),
    /// Append a row of empty cells
    AddRow,
    /// Rows may go down to zero; headers stay
    RemoveRow(usize),
    UpdateCell {
        row: usize,
        col: usize,
        value: String,
    },
    UpdateHeader {
        col: usize,
        value: String,
    },
}

pub fn apply(table: &TableData, edit: TableEdit) -> Result<TableData, Rejection> {
    // Stored tables may be ragged; edits work on the rectangular form
    let mut next = table.clone();
    next.canonicalize();
    let width = next.headers.len();

    match edit {
        TableEdit::SetTitle(title) => next.title = title,
        TableEdit::AddColumn => {
            next.headers.push(String::new());
            for row in &mut next.rows {
                row.push(String::new());
            }
        }
        TableEdit::RemoveColumn(col) => {
            if width <= 1 {
                return Err(Rejection::MinimumColumns);
            }
            check(col, width, "column")?;
            next.headers.remove(col);
            for row in &mut next.rows {
                row.remove(col);
            }
        }
        TableEdit::AddRow => next.rows.push(vec![String::new(); width]),
        TableEdit::RemoveRow(row) => {
            check(row, next.rows.len(), "row")?;
            next.rows.remove(row);
        }
        TableEdit::UpdateCell { row, col, value } => {
            check(row, next.rows.len(), "row")?;
            check(col, width, "column")?;
            next.rows[row][col] = value;
        }
        TableEdit::UpdateHeader { col, value } => {
            check(col, width, "column")?;
            next.headers[col] = value;
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> TableData {
        TableData {
            title: String::new(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_add_column_extends_every_row() {
        let t = apply(&table(&["A"], &[&["1"], &["2"]]), TableEdit::AddColumn).unwrap();
        assert_eq!(t.headers, vec!["A", ""]);
        assert_eq!(t.rows, vec![vec!["1", ""], vec!["2", ""]]);
    }

    #[test]
    fn test_remove_first_column() {
        let t = apply(&table(&["A", "B"], &[&["1", "2"]]), TableEdit::RemoveColumn(0)).unwrap();
        assert_eq!(t.headers, vec!["B"]);
        assert_eq!(t.rows, vec![vec!["2"]]);
    }

    #[test]
    fn test_last_column_cannot_be_removed() {
        let original = table(&["A"], &[&["1"]]);
        assert_eq!(
            apply(&original, TableEdit::RemoveColumn(0)),
            Err(Rejection::MinimumColumns)
        );
    }

    #[test]
    fn test_add_row_matches_width() {
        let t = apply(&table(&["A", "B", "C"], &[]), TableEdit::AddRow).unwrap();
        assert_eq!(t.rows, vec![vec!["", "", ""]]);
    }

    #[test]
    fn test_rows_can_be_emptied() {
        let t = apply(&table(&["A"], &[&["1"]]), TableEdit::RemoveRow(0)).unwrap();
        assert!(t.rows.is_empty());
        assert_eq!(t.headers, vec!["A"]);
    }

    #[test]
    fn test_update_cell_and_header() {
        let t = table(&["A", "B"], &[&["1", "2"]]);
        let t = apply(
            &t,
            TableEdit::UpdateCell {
                row: 0,
                col: 1,
                value: "x".into(),
            },
        )
        .unwrap();
        let t = apply(
            &t,
            TableEdit::UpdateHeader {
                col: 0,
                value: "Name".into(),
            },
        )
        .unwrap();
        assert_eq!(t.headers, vec!["Name", "B"]);
        assert_eq!(t.rows, vec![vec!["1", "x"]]);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let t = table(&["A", "B"], &[&["1", "2"]]);
        assert_eq!(
            apply(&t, TableEdit::RemoveRow(3)),
            Err(Rejection::out_of_range("row", 3, 1))
        );
        assert_eq!(
            apply(&t, TableEdit::RemoveColumn(2)),
            Err(Rejection::out_of_range("column", 2, 2))
        );
        assert!(apply(
            &t,
            TableEdit::UpdateCell {
                row: 0,
                col: 5,
                value: String::new()
            }
        )
        .is_err());
    }

    #[test]
    fn test_input_is_not_modified() {
        let t = table(&["A", "B"], &[&["1", "2"]]);
        let _ = apply(&t, TableEdit::RemoveColumn(1)).unwrap();
        assert_eq!(t.headers.len(), 2);
    }

    #[test]
    fn test_update_cell_on_ragged_table() {
        let t = table(&["A", "B"], &[&["1"]]);
        let next = apply(
            &t,
            TableEdit::UpdateCell {
                row: 0,
                col: 1,
                value: "x".to_string(),
            },
        )
        .unwrap();
        assert_eq!(next.rows, vec![vec!["1".to_string(), "x".to_string()]]);

        let next = apply(&t, TableEdit::RemoveColumn(1)).unwrap();
        assert_eq!(next.rows, vec![vec!["1".to_string()]]);
    }
}
