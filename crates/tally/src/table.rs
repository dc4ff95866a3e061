// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-width table rendering for command output.

/// Render a bordered fixed-width table. Column widths adapt to the
/// widest cell; every row must have one cell per header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            line.push_str(&format!(" {:<width$} |", cell, width = widths[i]));
        }
        line.push('\n');
        line
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = String::new();
    out.push_str(&separator);
    out.push_str(&render_row(&header_cells));
    out.push_str(&separator);
    for row in rows {
        out.push_str(&render_row(row));
    }
    out.push_str(&separator);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let rendered = render_table(
            &["name", "idsite"],
            &[
                vec!["done".to_string(), "1".to_string()],
                vec!["done5f4f9bafeda3443c3c2d4b2ef4dffadc".to_string(), "42".to_string()],
            ],
        );
        let expected = "\
+--------------------------------------+--------+
| name                                 | idsite |
+--------------------------------------+--------+
| done                                 | 1      |
| done5f4f9bafeda3443c3c2d4b2ef4dffadc | 42     |
+--------------------------------------+--------+
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn empty_rows_still_render_headers() {
        let rendered = render_table(&["name"], &[]);
        assert_eq!(rendered, "+------+\n| name |\n+------+\n+------+\n");
    }
}
