//! Logbook export
//!
//! Lays out a key result's logbook as a paginated A4 report: a header naming
//! the objective and key result, then one bold `date - [tag]` line per entry
//! followed by the wrapped entry text. Vertical positions are tracked in
//! millimetres so page breaks land where a printed report would break.

use super::{KeyResult, Objective};
use serde::Serialize;

/// Page geometry and line metrics, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_height: f64,
    /// Y position of the first line on every page
    pub top: f64,
    /// Space kept free at the bottom before an entry moves to the next page
    pub bottom_reserve: f64,
    pub heading_line_height: f64,
    pub body_line_height: f64,
    /// Characters per wrapped line
    pub line_width: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_height: 297.0,
            top: 20.0,
            bottom_reserve: 30.0,
            heading_line_height: 7.0,
            body_line_height: 5.0,
            line_width: 90,
        }
    }
}

impl PageLayout {
    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Title,
    Bold,
    Normal,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    pub style: LineStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub lines: Vec<DocumentLine>,
}

/// Rendered logbook report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookDocument {
    pub file_name: String,
    pub pages: Vec<Page>,
    #[serde(skip)]
    line_width: usize,
}

pub const REPORT_TITLE: &str = "Logbook Report";

impl LogbookDocument {
    /// Lay out the logbook of `kr`. Returns `None` when there is nothing to export.
    pub fn build(objective: &Objective, kr: &KeyResult, layout: PageLayout) -> Option<Self> {
        let entries = kr.logbook.as_deref().filter(|e| !e.is_empty())?;
        let mut writer = PageWriter::new(layout);

        writer.push(LineStyle::Title, REPORT_TITLE);
        writer.advance(15.0);

        let objective_lines = wrap(&format!("Objective: {}", objective.title), layout.line_width);
        let count = objective_lines.len();
        writer.push_all(LineStyle::Bold, objective_lines);
        writer.advance(count as f64 * layout.heading_line_height + 5.0);

        let kr_lines = wrap(&format!("Key Result: {}", kr.title), layout.line_width);
        let count = kr_lines.len();
        writer.push_all(LineStyle::Normal, kr_lines);
        writer.advance(count as f64 * layout.heading_line_height + 10.0);

        writer.push(LineStyle::Rule, "");
        writer.advance(10.0);

        for entry in entries {
            writer.break_if_exhausted();

            let heading = format!("{} - [{}]", entry.date.format("%Y-%m-%d"), entry.tag);
            writer.push(LineStyle::Bold, heading);
            writer.advance(layout.heading_line_height);

            let body = wrap(&entry.content, layout.line_width);
            let count = body.len();
            writer.push_all(LineStyle::Normal, body);
            writer.advance(count as f64 * layout.body_line_height + 10.0);
        }

        Some(Self {
            file_name: export_file_name(&kr.title),
            pages: writer.finish(),
            line_width: layout.line_width,
        })
    }

    /// Plain-text rendering. Bold lines are wrapped in `**`, pages are separated by a form feed.
    pub fn render_text(&self) -> String {
        let pages: Vec<String> = self
            .pages
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .map(|line| match line.style {
                        LineStyle::Title => center(&line.text, self.line_width),
                        LineStyle::Bold => format!("**{}**", line.text),
                        LineStyle::Normal => line.text.clone(),
                        LineStyle::Rule => "-".repeat(self.line_width),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        let mut out = pages.join("\n\u{c}\n");
        out.push('\n');
        out
    }
}

/// `logbook_<title>.txt` with whitespace replaced by underscores
pub fn export_file_name(kr_title: &str) -> String {
    let stem: String = kr_title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("logbook_{stem}.txt")
}

struct PageWriter {
    layout: PageLayout,
    y: f64,
    pages: Vec<Page>,
}

impl PageWriter {
    fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            y: layout.top,
            pages: vec![Page::default()],
        }
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn push(&mut self, style: LineStyle, text: impl Into<String>) {
        let text = text.into();
        self.current().lines.push(DocumentLine { style, text });
    }

    fn push_all(&mut self, style: LineStyle, lines: Vec<String>) {
        for text in lines {
            self.push(style, text);
        }
    }

    fn advance(&mut self, mm: f64) {
        self.y += mm;
    }

    fn break_if_exhausted(&mut self) {
        if self.y > self.layout.page_height - self.layout.bottom_reserve {
            self.pages.push(Page::default());
            self.y = self.layout.top;
        }
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

/// Greedy word wrap on character counts. Explicit newlines are kept and words
/// longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}
