// src/report.rs
//! Markdown analysis report parsed into display blocks

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_UNDERLINE: &str = "\x1b[4m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Ordered(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    ListItem { depth: usize, marker: ListMarker, spans: Vec<Span> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Code(String),
    Rule,
}

impl Block {
    /// Text content without styling.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { spans, .. } | Self::Paragraph(spans) | Self::ListItem { spans, .. } => {
                plain(spans)
            }
            Self::Table { header, rows } => std::iter::once(header)
                .chain(rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Code(code) => code.clone(),
            Self::Rule => String::new(),
        }
    }
}

fn plain(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

/// A rendered analysis report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn parse(markdown: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut builder = Builder::default();
        for event in Parser::new_ext(markdown, options) {
            builder.push(event);
        }
        builder.finish()
    }

    pub fn headings(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Heading { .. }))
    }

    pub fn list_items(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::ListItem { .. }))
    }

    /// Terminal rendering. With `ansi` off, emphasis falls back to
    /// markdown-like markers.
    pub fn to_terminal(&self, ansi: bool) -> String {
        let mut out = String::new();
        let mut previous: Option<&Block> = None;

        for block in &self.blocks {
            let in_list = matches!(
                (previous, block),
                (Some(Block::ListItem { .. }), Block::ListItem { .. })
            );
            if previous.is_some() && !in_list {
                out.push('\n');
            }

            match block {
                Block::Heading { level, spans } => {
                    let text = styled(spans, ansi);
                    if ansi {
                        let decoration = if *level <= 2 { ANSI_UNDERLINE } else { "" };
                        out.push_str(&format!("{ANSI_BOLD}{decoration}{text}{ANSI_RESET}\n"));
                    } else {
                        out.push_str(&format!("{} {}\n", "#".repeat(*level as usize), text));
                    }
                }
                Block::Paragraph(spans) => {
                    out.push_str(&styled(spans, ansi));
                    out.push('\n');
                }
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => {
                    let bullet = match marker {
                        ListMarker::Bullet => "•".to_string(),
                        ListMarker::Ordered(n) => format!("{}.", n),
                    };
                    out.push_str(&format!(
                        "{}{} {}\n",
                        "  ".repeat(*depth),
                        bullet,
                        styled(spans, ansi)
                    ));
                }
                Block::Table { header, rows } => out.push_str(&render_table(header, rows)),
                Block::Code(code) => {
                    for line in code.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Block::Rule => out.push_str(&format!("{}\n", "─".repeat(40))),
            }
            previous = Some(block);
        }

        out
    }
}

fn styled(spans: &[Span], ansi: bool) -> String {
    let mut out = String::new();
    for span in spans {
        let style = span.style;
        if style == SpanStyle::default() {
            out.push_str(&span.text);
            continue;
        }

        if ansi {
            if style.strong {
                out.push_str(ANSI_BOLD);
            }
            if style.emphasis {
                out.push_str(ANSI_ITALIC);
            }
            if style.code {
                out.push_str(ANSI_CYAN);
            }
            out.push_str(&span.text);
            out.push_str(ANSI_RESET);
        } else {
            let marker = match (style.code, style.strong, style.emphasis) {
                (true, _, _) => "`",
                (false, true, true) => "***",
                (false, true, false) => "**",
                _ => "_",
            };
            out.push_str(marker);
            out.push_str(&span.text);
            out.push_str(marker);
        }
    }
    out.trim().to_string()
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let columns = std::iter::once(header.len())
        .chain(rows.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = widths[i] - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        format!("| {} |\n", cells.join(" | "))
    };

    let mut out = format_row(header);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("|-{}-|\n", separator.join("-|-")));
    for row in rows {
        out.push_str(&format_row(row));
    }
    out
}

#[derive(Default)]
struct TableBuilder {
    in_head: bool,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    lists: Vec<Option<u64>>,
    item: Option<(usize, ListMarker)>,
    heading: Option<u8>,
    table: Option<TableBuilder>,
    code: Option<String>,
}

impl Builder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.push_str(&text),
                None => self.text(&text, false),
            },
            Event::Code(text) => self.text(&text, true),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html, false),
            Event::SoftBreak => self.text(" ", false),
            Event::HardBreak => self.text("\n", false),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }, false),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.heading = Some(level as u8);
            }
            Tag::List(start) => {
                self.flush_item();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_item();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = ListMarker::Ordered(*next);
                        *next += 1;
                        marker
                    }
                    _ => ListMarker::Bullet,
                };
                self.item = Some((depth, marker));
            }
            Tag::Table(_) => self.table = Some(TableBuilder::default()),
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::CodeBlock(_) => self.code = Some(String::new()),
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.item.is_some() {
                    // loose list items keep their paragraphs on one line
                    self.text(" ", false);
                } else {
                    self.flush_paragraph();
                }
            }
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                let spans = std::mem::take(&mut self.spans);
                self.blocks.push(Block::Heading { level, spans });
            }
            TagEnd::Item => self.flush_item(),
            TagEnd::List(_) => {
                self.flush_item();
                self.lists.pop();
            }
            TagEnd::TableCell => {
                let cell = plain(&std::mem::take(&mut self.spans));
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    if !table.row.is_empty() {
                        table.header = std::mem::take(&mut table.row);
                    }
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    if table.in_head {
                        table.header = row;
                    } else {
                        table.rows.push(row);
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table {
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.blocks.push(Block::Code(code.trim_end().to_string()));
                }
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            _ => {}
        }
    }

    fn text(&mut self, text: &str, code: bool) {
        self.spans.push(Span {
            text: text.to_string(),
            style: SpanStyle {
                strong: self.strong > 0,
                emphasis: self.emphasis > 0,
                code,
            },
        });
    }

    fn flush_item(&mut self) {
        match self.item.take() {
            Some((depth, marker)) => {
                let spans = std::mem::take(&mut self.spans);
                if !plain(&spans).is_empty() {
                    self.blocks.push(Block::ListItem {
                        depth,
                        marker,
                        spans,
                    });
                }
            }
            None => self.flush_paragraph(),
        }
    }

    fn flush_paragraph(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        if !plain(&spans).is_empty() {
            self.blocks.push(Block::Paragraph(spans));
        }
    }

    fn finish(mut self) -> ReportDocument {
        self.flush_item();
        ReportDocument {
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_bullets() {
        let doc = ReportDocument::parse("# Report\n- Strong\n- Improve formatting");
        assert_eq!(doc.blocks.len(), 3);
        assert!(matches!(&doc.blocks[0], Block::Heading { level: 1, .. }));
        assert_eq!(doc.blocks[0].plain_text(), "Report");

        let items: Vec<String> = doc.list_items().map(Block::plain_text).collect();
        assert_eq!(items, vec!["Strong", "Improve formatting"]);
    }

    #[test]
    fn test_ordered_and_nested_lists() {
        let doc = ReportDocument::parse("3. one\n4. two\n   - nested\n5. three\n");
        let items: Vec<(usize, ListMarker, String)> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => Some((*depth, *marker, plain(spans))),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (0, ListMarker::Ordered(3), "one".to_string()),
                (0, ListMarker::Ordered(4), "two".to_string()),
                (1, ListMarker::Bullet, "nested".to_string()),
                (0, ListMarker::Ordered(5), "three".to_string()),
            ]
        );
    }

    #[test]
    fn test_emphasis_spans() {
        let doc = ReportDocument::parse("Some **bold** and *soft* and `code`.");
        match &doc.blocks[0] {
            Block::Paragraph(spans) => {
                assert!(spans.iter().any(|s| s.text == "bold" && s.style.strong));
                assert!(spans.iter().any(|s| s.text == "soft" && s.style.emphasis));
                assert!(spans.iter().any(|s| s.text == "code" && s.style.code));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
        assert_eq!(
            doc.to_terminal(false),
            "Some **bold** and _soft_ and `code`.\n"
        );
    }

    #[test]
    fn test_table() {
        let doc = ReportDocument::parse("| Skill | Level |\n|---|---|\n| Rust | High |\n| Go | Mid |\n");
        assert_eq!(
            doc.blocks,
            vec![Block::Table {
                header: vec!["Skill".into(), "Level".into()],
                rows: vec![
                    vec!["Rust".into(), "High".into()],
                    vec!["Go".into(), "Mid".into()],
                ],
            }]
        );
        assert_eq!(
            doc.to_terminal(false),
            "| Skill | Level |\n|-------|-------|\n| Rust  | High  |\n| Go    | Mid   |\n"
        );
    }

    #[test]
    fn test_terminal_plain_layout() {
        let doc = ReportDocument::parse("## Strengths\n\n- Rust\n- Testing\n\nOverall good.");
        assert_eq!(
            doc.to_terminal(false),
            "## Strengths\n\n• Rust\n• Testing\n\nOverall good.\n"
        );
    }

    #[test]
    fn test_code_block_and_rule() {
        let doc = ReportDocument::parse("```\nfn main() {}\n```\n\n---\n");
        assert_eq!(
            doc.blocks,
            vec![Block::Code("fn main() {}".to_string()), Block::Rule]
        );
    }

    #[test]
    fn test_empty_report() {
        assert!(ReportDocument::parse("").blocks.is_empty());
    }
}
