//! Fixed-width report rows
//!
//! Rows are built from cells padded to a minimum column width and joined by
//! a single space. Text is left-justified and integers right-justified;
//! nothing is ever truncated.

/// Justification of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Pad on the right
    Left,
    /// Pad on the left
    Right,
}

/// One value in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    /// Text, left-justified
    Text(&'a str),
    /// Integer, right-justified
    Integer(u64),
}

/// Minimum widths of the columns of one section
#[derive(Debug, Clone, Copy)]
pub struct RowFormat<'w> {
    widths: &'w [Option<usize>],
}

impl<'w> RowFormat<'w> {
    /// Create a format; `None` leaves a column unpadded
    pub const fn new(widths: &'w [Option<usize>]) -> Self {
        Self { widths }
    }

    /// Render a row of cells
    pub fn row(&self, cells: &[Cell<'_>]) -> String {
        debug_assert_eq!(cells.len(), self.widths.len());
        let mut out = String::new();
        for (i, (cell, width)) in cells.iter().zip(self.widths).enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let width = width.unwrap_or(0);
            match cell {
                Cell::Text(text) => pad(&mut out, text, width, Align::Left),
                Cell::Integer(n) => pad(&mut out, &n.to_string(), width, Align::Right),
            }
        }
        out
    }

    /// Render a row of left-justified text
    pub fn text_row(&self, texts: &[&str]) -> String {
        let cells: Vec<Cell<'_>> = texts.iter().map(|t| Cell::Text(t)).collect();
        self.row(&cells)
    }
}

fn pad(out: &mut String, text: &str, width: usize, align: Align) {
    match align {
        Align::Left => out.push_str(&format!("{:<width$}", text, width = width)),
        Align::Right => out.push_str(&format!("{:>width$}", text, width = width)),
    }
}

/// Fixed-point number right-justified to a width
pub fn fixed(value: f64, width: usize, precision: usize) -> String {
    format!("{:>width$.precision$}", value, width = width, precision = precision)
}

/// Dashes the length of each header, for the separator under a header row
pub fn underline(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| "-".repeat(h.chars().count())).collect()
}

/// Run-length suppression of repeated leading columns
///
/// Tracks the key columns of the last printed row. A key column is printed
/// when it, or any key column to its left, differs from the previous row.
#[derive(Debug, Default)]
pub struct LastSeen {
    last: Option<Vec<String>>,
}

impl LastSeen {
    /// Create a tracker with no previous row
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a row's keys and return which of them must be printed
    pub fn advance(&mut self, keys: &[&str]) -> Vec<bool> {
        let changed_from = match &self.last {
            Some(last) if last.len() == keys.len() => last
                .iter()
                .zip(keys)
                .position(|(prev, key)| prev.as_str() != *key)
                .unwrap_or(keys.len()),
            _ => 0,
        };

        self.last = Some(keys.iter().map(|k| k.to_string()).collect());
        (0..keys.len()).map(|i| i >= changed_from).collect()
    }

    /// Like [`advance`](Self::advance), returning the keys with repeats
    /// blanked
    pub fn visible<'k>(&mut self, keys: &[&'k str]) -> Vec<&'k str> {
        self.advance(keys)
            .into_iter()
            .zip(keys)
            .map(|(show, key)| if show { *key } else { "" })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_left_justified() {
        let format = RowFormat::new(&[Some(6), Some(4)]);
        assert_eq!(format.text_row(&["ab", "c"]), "ab     c   ");
    }

    #[test]
    fn test_integers_are_right_justified() {
        let format = RowFormat::new(&[Some(6), Some(7)]);
        assert_eq!(
            format.row(&[Cell::Integer(5), Cell::Integer(120)]),
            "     5     120"
        );
    }

    #[test]
    fn test_unpadded_and_overflowing_columns() {
        let format = RowFormat::new(&[Some(3), None]);
        assert_eq!(format.text_row(&["abcdef", "x"]), "abcdef x");
        assert_eq!(format.text_row(&["a", ""]), "a   ");
    }

    #[test]
    fn test_fixed() {
        assert_eq!(fixed(1.5, 12, 3), "       1.500");
        assert_eq!(fixed(-20.0, 12, 3), "     -20.000");
    }

    #[test]
    fn test_underline() {
        assert_eq!(underline(&["Code", "Name"]), vec!["----", "----"]);
    }

    #[test]
    fn test_last_seen_hierarchy() {
        let mut seen = LastSeen::new();
        assert_eq!(seen.visible(&["Roads", "Streets"]), vec!["Roads", "Streets"]);
        assert_eq!(seen.visible(&["Roads", "Streets"]), vec!["", ""]);
        assert_eq!(seen.visible(&["Roads", "Bridges"]), vec!["", "Bridges"]);
        assert_eq!(seen.visible(&["Rail", "Bridges"]), vec!["Rail", "Bridges"]);
    }
}
