//! Hierarchical HTML row writer
//!
//! Rendering happens in two passes. [`RowSpans::compute`] is a pure pass over
//! the diffgram that works out how many physical rows every diff row covers;
//! [`RowWriter`] then walks the table hierarchy and emits nested rows where a
//! parent and its first child share one `<tr>` and the parent cells span all
//! rows of its subtree.

use crate::bookmark;
use crate::change_detection::{DiffRow, RowChange};
use crate::diffgram::Diffgram;
use crate::error::{DriftError, Result};
use crate::layout::BookmarkRole;
use crate::logging::LogContext;
use crate::snapshot::Value;
use std::fmt::Write;

/// CSS class marking rows a "changes only" view may hide
pub const CAN_HIDE_CLASS: &str = "CanHide";

/// Text of the padding cells after a row without children
pub const PLACEHOLDER: &str = "-";

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Number of physical rows each diff row occupies, per level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpans {
    spans: Vec<Vec<usize>>,
}

impl RowSpans {
    /// A row without children spans one row; otherwise it spans the sum of
    /// its children's spans (one per child plus each child's own extra rows).
    pub fn compute(diffgram: &Diffgram) -> Self {
        let tables = diffgram.tables();
        let mut spans: Vec<Vec<usize>> = tables.iter().map(|t| vec![1; t.len()]).collect();

        for level in (0..tables.len()).rev() {
            for index in 0..tables[level].len() {
                let children = diffgram.children(level, index);
                if children.is_empty() {
                    continue;
                }
                let total: usize = children.iter().map(|&c| spans[level + 1][c]).sum();
                spans[level][index] = total;
            }
        }

        Self { spans }
    }

    pub fn span(&self, level: usize, row: usize) -> usize {
        self.spans
            .get(level)
            .and_then(|rows| rows.get(row))
            .copied()
            .unwrap_or(1)
    }
}

/// Position of the writer within the physical row being emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCursor {
    position: usize,
    row_open: bool,
}

impl CellCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells written (or spanned from above) in the current physical row
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn row_open(&self) -> bool {
        self.row_open
    }
}

/// Writes the rows of one diffgram as nested table rows
pub struct RowWriter<'a> {
    diffgram: &'a Diffgram,
    spans: RowSpans,
    visible: Vec<Vec<usize>>,
    offsets: Vec<usize>,
    max_cells: usize,
    ctx: LogContext,
}

impl<'a> RowWriter<'a> {
    pub fn new(diffgram: &'a Diffgram) -> Self {
        let layout = diffgram.layout();
        let levels = diffgram.tables().len();
        Self {
            diffgram,
            spans: RowSpans::compute(diffgram),
            visible: (0..levels).map(|l| layout.visible_columns(l)).collect(),
            offsets: (0..levels).map(|l| layout.level_offset(l)).collect(),
            max_cells: layout.max_visible_cells(levels),
            ctx: LogContext::new(diffgram.name()),
        }
    }

    pub fn spans(&self) -> &RowSpans {
        &self.spans
    }

    /// Total cells in one physical row
    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    /// Write the complete table: header row plus every root row
    pub fn write_table<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_str("<table class=\"diffgram\">\n")?;
        self.write_header(out)?;
        let mut cursor = CellCursor::new();
        self.write_rows(out, 0, &self.diffgram.root_rows(), &mut cursor)?;
        out.write_str("</table>\n")?;
        Ok(())
    }

    /// Header row naming the visible columns of every level
    pub fn write_header<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_str("<tr class=\"header\">")?;
        for (level, columns) in self.visible.iter().enumerate() {
            let table = &self.diffgram.tables()[level];
            for &column in columns {
                write!(out, "<th>{}</th>", escape_html(&table.columns()[column].name))?;
            }
        }
        out.write_str("</tr>\n")?;
        Ok(())
    }

    /// Write `rows` of table `level`, recursing into their children.
    /// An empty slice writes nothing; an unknown level or row index is a
    /// caller error.
    pub fn write_rows<W: Write>(
        &self,
        out: &mut W,
        level: usize,
        rows: &[usize],
        cursor: &mut CellCursor,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let table = self.diffgram.table(level).ok_or_else(|| {
            DriftError::invalid_input(format!(
                "diffgram '{}' has no table level {}",
                self.diffgram.name(),
                level
            ))
        })?;

        for &index in rows {
            let row = table.rows().get(index).ok_or_else(|| {
                DriftError::invalid_input(format!(
                    "table '{}' has no row {}",
                    table.name(),
                    index
                ))
            })?;

            if !cursor.row_open {
                write!(out, "<tr class=\"{}\">", row_class(row))?;
                cursor.row_open = true;
                cursor.position = self.offsets[level];
            }

            let span = self.spans.span(level, index);
            for &column in &self.visible[level] {
                let content = self.render_cell(level, row, column)?;
                write!(out, "<td rowspan=\"{}\">{}</td>", span, content)?;
                cursor.position += 1;
            }

            let children = self.diffgram.children(level, index);
            if children.is_empty() {
                while cursor.position < self.max_cells {
                    write!(out, "<td rowspan=\"1\">{}</td>", PLACEHOLDER)?;
                    cursor.position += 1;
                }
                out.write_str("</tr>\n")?;
                cursor.position = 0;
                cursor.row_open = false;
            } else {
                self.write_rows(out, level + 1, children, cursor)?;
            }
        }

        Ok(())
    }

    fn render_cell(&self, level: usize, row: &DiffRow, column: usize) -> Result<String> {
        let table = &self.diffgram.tables()[level];
        let value = row.change.value(column).ok_or_else(|| {
            DriftError::layout(format!(
                "column {} out of range for table '{}'",
                column,
                table.name()
            ))
        })?;

        let ignored = self
            .diffgram
            .layout()
            .entry(level, column)
            .map(|e| e.change_ignored)
            .unwrap_or(false);
        if table.is_key_column(column) {
            return Ok(self.plain_or_bookmark(level, row, column, value));
        }

        let content = match &row.change {
            RowChange::Modified { .. } if !ignored && row.change.cell_changed(column) => {
                let old = row.change.old_value(column).cloned().unwrap_or(Value::Null);
                format!(
                    "<span class=\"Deleted\">{}</span><span class=\"Modified\">{}</span>",
                    escape_html(&old.to_string()),
                    escape_html(&value.to_string())
                )
            }
            RowChange::Deleted { old_values } => {
                let old = old_values.get(column).cloned().unwrap_or(Value::Null);
                format!("<span class=\"Deleted\">{}</span>", escape_html(&old.to_string()))
            }
            _ => self.plain_or_bookmark(level, row, column, value),
        };
        Ok(content)
    }

    fn plain_or_bookmark(&self, level: usize, row: &DiffRow, column: usize, value: &Value) -> String {
        let label = escape_html(&value.to_string());
        let Some(entry) = self.diffgram.layout().entry(level, column) else {
            return label;
        };

        let (text_column, scope, is_anchor) = match entry.bookmark_role() {
            Some(BookmarkRole::Anchor { text_column, scope }) => (text_column, scope, true),
            Some(BookmarkRole::Jump { text_column, scope }) => (text_column, scope, false),
            None => return label,
        };

        let text = row
            .change
            .value(text_column)
            .map(ToString::to_string)
            .unwrap_or_default();
        if text.is_empty() {
            self.ctx
                .debug(format!("empty bookmark text at level {} column {}", level, column));
            return label;
        }

        let scope = scope.unwrap_or(self.diffgram.name());
        if is_anchor {
            bookmark::anchor(scope, &text, &label)
        } else {
            bookmark::jump_link(scope, &text, &label)
        }
    }
}

fn row_class(row: &DiffRow) -> String {
    if row.can_hide {
        format!("{} {}", row.state(), CAN_HIDE_CLASS)
    } else {
        row.state().to_string()
    }
}
