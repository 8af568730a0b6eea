//! Pipe table detection and rendering.

/// A pipe table parsed from a block of lines.
///
/// Cells hold already-escaped inline HTML and are emitted verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Header cells, in column order.
    pub headers: Vec<String>,
    /// Data rows, each in column order. Rows may be shorter than the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse a table block: header line, separator line, then data lines.
    ///
    /// The separator is discarded without checking column alignment syntax.
    /// Rows that yield no cells are dropped. Returns `None` for blocks with
    /// fewer than two lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat_markdown::Table;
    ///
    /// let table = Table::parse(&["| A | B |", "|---|---|", "| 1 | 2 |"]).unwrap();
    /// assert_eq!(table.headers, vec!["A", "B"]);
    /// assert_eq!(table.rows, vec![vec!["1", "2"]]);
    /// ```
    pub fn parse(lines: &[&str]) -> Option<Self> {
        if lines.len() < 2 {
            return None;
        }

        let headers = split_cells(lines[0]);
        let rows = lines[2..]
            .iter()
            .map(|line| split_cells(line))
            .filter(|row| !row.is_empty())
            .collect();

        Some(Self { headers, rows })
    }

    /// Render as HTML. Data rows are clipped to the header width; short rows
    /// are not padded.
    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<table class="markdown-table">"#);

        if !self.headers.is_empty() {
            out.push_str("<thead><tr>");
            for header in &self.headers {
                out.push_str("<th>");
                out.push_str(header);
                out.push_str("</th>");
            }
            out.push_str("</tr></thead>");
        }

        if !self.rows.is_empty() {
            out.push_str("<tbody>");
            for row in &self.rows {
                out.push_str("<tr>");
                for cell in row.iter().take(self.headers.len()) {
                    out.push_str("<td>");
                    out.push_str(cell);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody>");
        }

        out.push_str("</table>");
        out
    }
}

/// Find table blocks and replace them with rendered tables.
///
/// A block starts at a pipe line directly followed by a separator line and
/// extends over the pipe lines after the separator. Pipe lines before the
/// header are left as text.
pub(crate) fn render_tables(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        if is_pipe_row(lines[i]) && lines.get(i + 1).is_some_and(|l| is_separator_row(l)) {
            let mut end = i + 2;
            while end < lines.len() && is_pipe_row(lines[end]) {
                end += 1;
            }
            if let Some(table) = Table::parse(&lines[i..end]) {
                out.push(table.to_html());
                i = end;
                continue;
            }
        }
        out.push(lines[i].to_owned());
        i += 1;
    }

    out.join("\n")
}

fn is_pipe_row(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

fn is_separator_row(line: &str) -> bool {
    is_pipe_row(line)
        && line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

/// Split a pipe line into trimmed cells.
///
/// Only the fragments outside the outer pipes are discarded, so interior
/// empty cells keep their column. A row whose cells are all empty has no cells.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let cells: Vec<String> = inner.split('|').map(|c| c.trim().to_owned()).collect();
    if cells.iter().all(String::is_empty) {
        return Vec::new();
    }
    cells
}
