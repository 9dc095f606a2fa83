//! Report assembly: table of contents, sections and the standalone page

use crate::bookmark;
use crate::config::ReportConfig;
use crate::diffgram::Diffgram;
use crate::error::Result;
use crate::html::{escape_html, RowWriter, CAN_HIDE_CLASS};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// One diffed subsection of the report
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub id: String,
    pub title: String,
    /// HTML heading level, 1 to 6
    pub heading_level: u8,
    pub diffgram: Diffgram,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>, diffgram: Diffgram) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            heading_level: 2,
            diffgram,
        }
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn hide_class(&self) -> String {
        if self.diffgram.can_hide() {
            format!(" {}", CAN_HIDE_CLASS)
        } else {
            String::new()
        }
    }
}

pub struct Report {
    config: ReportConfig,
    sections: Vec<ReportSection>,
    generated: DateTime<Utc>,
}

impl Report {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            sections: Vec::new(),
            generated: Utc::now(),
        }
    }

    /// Fix the generation timestamp, for reproducible output
    pub fn generated_at(mut self, generated: DateTime<Utc>) -> Self {
        self.generated = generated;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Add a section, unless the config drops sections without changes
    pub fn add_section(&mut self, section: ReportSection) -> bool {
        if !self.config.include_unchanged_sections && section.diffgram.can_hide() {
            log::debug!("Leaving out unchanged section '{}'", section.id);
            return false;
        }
        self.sections.push(section);
        true
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Table of contents linking every section heading
    pub fn write_toc<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_str("<div class=\"toc\"><h2>Contents</h2>\n<ul>\n")?;
        for section in &self.sections {
            writeln!(
                out,
                "<li class=\"toc{} toc-level-{}\"><a href=\"#{}\">{}</a></li>",
                section.hide_class(),
                section.heading_level,
                bookmark::bookmark_id("section:", &section.id),
                escape_html(&section.title)
            )?;
        }
        out.write_str("</ul></div>\n")?;
        Ok(())
    }

    /// One section: heading anchor plus its diff table
    pub fn write_section<W: Write>(&self, out: &mut W, section: &ReportSection) -> Result<()> {
        writeln!(out, "<div class=\"section{}\">", section.hide_class())?;
        writeln!(
            out,
            "<h{level}>{anchor}</h{level}>",
            level = section.heading_level,
            anchor = bookmark::section_anchor(&section.id, &section.title)
        )?;

        if section.diffgram.root_rows().is_empty() {
            out.write_str("<p class=\"empty\">Nothing configured.</p>\n")?;
        } else {
            RowWriter::new(&section.diffgram).write_table(out)?;
        }

        out.write_str("</div>\n")?;
        Ok(())
    }

    /// Standalone HTML page with inline style and script
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(32 * 1024);
        let title = escape_html(&self.config.title);

        write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n",
            title, REPORT_CSS
        )?;
        write!(
            out,
            "<body{}>\n<h1>{}</h1>\n",
            if self.config.changes_only { " class=\"changes-only\"" } else { "" },
            title
        )?;
        write!(
            out,
            "<p class=\"meta\">{} compared with {} &middot; generated {}</p>\n",
            escape_html(&self.config.pilot_label),
            escape_html(&self.config.production_label),
            self.generated.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        write!(
            out,
            "<label><input type=\"checkbox\" id=\"changes-only\" onclick=\"toggleChangesOnly(this)\"{}> Show changes only</label>\n",
            if self.config.changes_only { " checked" } else { "" }
        )?;

        self.write_toc(&mut out)?;
        for section in &self.sections {
            self.write_section(&mut out, section)?;
        }

        write!(out, "<script>{}</script>\n</body>\n</html>\n", REPORT_JS)?;
        Ok(out)
    }
}

const REPORT_CSS: &str = r#"
body { font-family: system-ui, 'Segoe UI', sans-serif; font-size: 13px; color: #111827; }
table.diffgram { border-collapse: collapse; margin-bottom: 1.5rem; }
table.diffgram th, table.diffgram td { border: 1px solid #d1d5db; padding: 2px 6px; vertical-align: top; }
table.diffgram th { background: #f3f4f6; text-align: left; }
tr.Added { background: #dcfce7; }
tr.Deleted { background: #fee2e2; }
tr.Modified { background: #fef9c3; }
span.Deleted { text-decoration: line-through; color: #b91c1c; margin-right: 4px; }
span.Modified { font-weight: 600; color: #a16207; }
.toc ul { list-style: none; padding-left: 0; }
.toc-level-3 { padding-left: 1rem; }
.toc-level-4 { padding-left: 2rem; }
.meta { color: #6b7280; }
body.changes-only .CanHide { display: none; }
"#;

const REPORT_JS: &str = r#"
function toggleChangesOnly(box) {
  document.body.classList.toggle('changes-only', box.checked);
}
"#;
