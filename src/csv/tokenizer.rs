// src/csv/tokenizer.rs

/// One record of cells, in column order.
pub type Row = Vec<String>;

/// Split CSV text into rows of trimmed cells.
///
/// Quoting follows RFC 4180 closely enough for spreadsheet exports:
/// - `"` opens a quoted section, `""` inside it is a literal quote
/// - commas and line breaks inside quotes belong to the cell
/// - rows whose cells are all blank are dropped
///
/// Malformed input is never rejected. A quote left open at end of input
/// simply ends the last row.
pub fn parse(text: &str) -> Vec<Row> {
    let mut builder = RowBuilder::default();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if builder.in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    builder.cell.push('"');
                }
                '"' => builder.in_quotes = false,
                // CRLF inside a quoted cell keeps only the newline
                '\r' if chars.peek() == Some(&'\n') => {}
                _ => builder.cell.push(c),
            }
        } else {
            match c {
                '"' => builder.in_quotes = true,
                ',' => builder.end_cell(),
                '\n' => builder.end_row(),
                _ => builder.cell.push(c),
            }
        }
    }

    builder.end_row();
    builder.rows
}

#[derive(Default)]
struct RowBuilder {
    rows: Vec<Row>,
    row: Row,
    cell: String,
    in_quotes: bool,
}

impl RowBuilder {
    fn end_cell(&mut self) {
        self.row.push(self.cell.trim().to_string());
        self.cell.clear();
    }

    fn end_row(&mut self) {
        self.end_cell();
        let row = std::mem::take(&mut self.row);
        if row.iter().any(|cell| !cell.is_empty()) {
            self.rows.push(row);
        }
        self.in_quotes = false;
    }
}
