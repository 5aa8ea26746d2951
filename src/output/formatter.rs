//! Plain text table layout

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left,
    Right,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
}

impl Column {
    pub fn left(header: &str) -> Self {
        Self { header: header.to_string(), alignment: Alignment::Left }
    }

    pub fn right(header: &str) -> Self {
        Self { header: header.to_string(), alignment: Alignment::Right }
    }
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    /// Text placed between cells
    pub separator: String,
}

impl TableFormat {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, separator: "  ".to_string() }
    }

    /// Lay out the header line and one line per row, without colors.
    /// Missing cells render empty, extra cells are dropped.
    pub fn layout(&self, rows: &[RowData]) -> (String, Vec<String>) {
        let widths = self.column_widths(rows);
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();

        let header = self.create_row(&headers, &widths);
        let lines = rows.iter().map(|row| self.create_row(row, &widths)).collect();
        (header, lines)
    }

    fn column_widths(&self, rows: &[RowData]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                rows.iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| display_width(cell))
                    .fold(display_width(&column.header), usize::max)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, &width))| {
                let cell = data.get(idx).map(String::as_str).unwrap_or("");
                align_text(cell, width, column.alignment)
            })
            .collect();

        cells.join(&self.separator).trim_end().to_string()
    }
}

/// Width in terminal columns, counting each char as one
pub fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Align text within specified width
fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = display_width(text);
    if len >= width {
        return text.to_string();
    }

    let padding = " ".repeat(width - len);
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RowData {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_columns_grow_to_content() {
        let format = TableFormat::new(vec![Column::left("LS"), Column::left("IP"), Column::right("PORT")]);
        let (header, lines) = format.layout(&[row(&["0", "5.9.10.47", "19949"]), row(&["1", "1.2.3.4", "1"])]);

        assert_eq!(header, "LS  IP          PORT");
        assert_eq!(lines[0], "0   5.9.10.47  19949");
        assert_eq!(lines[1], "1   1.2.3.4        1");
    }

    #[test]
    fn test_multibyte_cells_are_counted_by_chars() {
        let format = TableFormat::new(vec![Column::left("Archive depth"), Column::left("X")]);
        let (_, lines) = format.layout(&[row(&["≈ 1y", "a"]), row(&["1y 2m 3d", "b"])]);
        assert_eq!(lines[0], "≈ 1y           a");
        assert_eq!(lines[1], "1y 2m 3d       b");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let format = TableFormat::new(vec![Column::left("A"), Column::left("B")]);
        let (_, lines) = format.layout(&[row(&["only"])]);
        assert_eq!(lines[0], "only");
    }
}
