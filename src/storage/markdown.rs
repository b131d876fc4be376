//! Markdown reading and writing
//!
//! [`parse_markdown`] turns text into an [`Ast`] using pulldown-cmark's
//! offset iterator. Only the shapes the board works with are built
//! structurally: headings, lists, list items, and paragraphs inside list
//! items. Everything else is captured as an opaque node holding its exact
//! source text, so [`render_markdown`] can write it back unchanged.
//!
//! ```text
//! "Intro\n\n### Todo\n\n- Task\n"
//!     ↓ parse_markdown
//! root
//! ├── other(paragraph) "Intro"
//! ├── heading(3) ── text "Todo"
//! └── list ── listItem ── paragraph ── text "Task"
//!     ↓ render_markdown
//! "Intro\n\n### Todo\n\n- Task\n"
//! ```

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag};

use crate::domain::{Ast, NodeId, NodeKind, Opaque};

/// Parses markdown text into a document tree
pub fn parse_markdown(source: &str) -> Ast {
    let events: Vec<(Event<'_>, Range<usize>)> =
        Parser::new_ext(source, Options::ENABLE_TABLES)
            .into_offset_iter()
            .collect();

    let mut builder = TreeBuilder {
        source,
        events,
        pos: 0,
        ast: Ast::new(),
    };

    let root = builder.ast.root();
    while !builder.done() {
        if let Some(node) = builder.block(false) {
            builder.ast.append_child(root, node);
        }
    }

    builder.ast
}

struct TreeBuilder<'a> {
    source: &'a str,
    events: Vec<(Event<'a>, Range<usize>)>,
    pos: usize,
    ast: Ast,
}

impl<'a> TreeBuilder<'a> {
    fn done(&self) -> bool {
        self.pos >= self.events.len()
    }

    fn current(&self) -> (Event<'a>, Range<usize>) {
        self.events[self.pos].clone()
    }

    /// Builds one block starting at the current event
    fn block(&mut self, in_item: bool) -> Option<NodeId> {
        let (event, range) = self.current();
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.pos += 1;
                let children = self.inline_run(false);
                self.pos += 1;
                Some(self.ast.alloc(
                    NodeKind::Heading {
                        depth: level as u8,
                    },
                    children,
                ))
            }
            Event::Start(Tag::List(start)) => {
                self.pos += 1;
                Some(self.list(start))
            }
            Event::Start(Tag::Paragraph) if in_item => {
                self.pos += 1;
                let children = self.inline_run(false);
                self.pos += 1;
                Some(self.ast.alloc(NodeKind::Paragraph, children))
            }
            Event::Start(tag) => {
                self.skip_element();
                Some(self.opaque(tag_name(&tag), range))
            }
            Event::End(_) => {
                self.pos += 1;
                None
            }
            other => {
                self.pos += 1;
                Some(self.opaque(event_name(&other), range))
            }
        }
    }

    fn list(&mut self, start: Option<u64>) -> NodeId {
        let mut items = Vec::new();
        let mut spread = false;

        while !self.done() {
            match self.current().0 {
                Event::End(_) => {
                    self.pos += 1;
                    break;
                }
                Event::Start(Tag::Item) => {
                    self.pos += 1;
                    let (item, loose) = self.item();
                    spread |= loose;
                    items.push(item);
                }
                _ => self.pos += 1,
            }
        }

        // A lone empty item is how an empty list is written out
        if items.len() == 1 && self.ast.children(items[0]).is_empty() {
            items.clear();
        }

        self.ast.alloc(
            NodeKind::List {
                ordered: start.is_some(),
                start,
                spread,
            },
            items,
        )
    }

    /// Builds a list item; tight items carry their text without a paragraph
    /// event, so bare inline runs are wrapped in one here
    fn item(&mut self) -> (NodeId, bool) {
        let mut children = Vec::new();
        let mut loose = false;

        while !self.done() {
            match self.current().0 {
                Event::End(_) => {
                    self.pos += 1;
                    break;
                }
                Event::Start(tag) if is_block_tag(&tag) => {
                    loose |= matches!(tag, Tag::Paragraph);
                    if let Some(node) = self.block(true) {
                        children.push(node);
                    }
                }
                _ => {
                    let inlines = self.inline_run(true);
                    children.push(self.ast.alloc(NodeKind::Paragraph, inlines));
                }
            }
        }

        (self.ast.alloc(NodeKind::ListItem, children), loose)
    }

    /// Collects inline content up to (not including) the closing event.
    ///
    /// Adjacent text merges into one text node; soft breaks become `\n`.
    /// With `stop_at_blocks`, a block-level start also ends the run.
    fn inline_run(&mut self, stop_at_blocks: bool) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut pending: Option<String> = None;

        while !self.done() {
            let (event, range) = self.current();
            match event {
                Event::End(_) => break,
                Event::Start(ref tag) if stop_at_blocks && is_block_tag(tag) => break,
                Event::Text(text) => {
                    pending.get_or_insert_with(String::new).push_str(&text);
                    self.pos += 1;
                }
                Event::SoftBreak => {
                    pending.get_or_insert_with(String::new).push('\n');
                    self.pos += 1;
                }
                Event::Start(tag) => {
                    self.flush_text(&mut pending, &mut children);
                    self.skip_element();
                    children.push(self.opaque(tag_name(&tag), range));
                }
                other => {
                    self.flush_text(&mut pending, &mut children);
                    self.pos += 1;
                    children.push(self.opaque(event_name(&other), range));
                }
            }
        }

        self.flush_text(&mut pending, &mut children);
        children
    }

    fn flush_text(&mut self, pending: &mut Option<String>, children: &mut Vec<NodeId>) {
        if let Some(text) = pending.take() {
            children.push(self.ast.new_text(text));
        }
    }

    /// Skips from a start event past its matching end
    fn skip_element(&mut self) {
        let mut depth = 0usize;
        while !self.done() {
            match self.events[self.pos].0 {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                break;
            }
        }
    }

    fn opaque(&mut self, tag: &str, range: Range<usize>) -> NodeId {
        let source = dedent(self.source, range);
        self.ast
            .alloc(NodeKind::Other(Opaque::markdown(tag, source)), Vec::new())
    }
}

/// Source of a range with the container's indentation removed from
/// continuation lines
fn dedent(source: &str, range: Range<usize>) -> String {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let column = range.start - line_start;
    let text = source[range].trim_end_matches(['\n', '\r']);

    if column == 0 || !text.contains('\n') {
        return text.to_string();
    }

    text.split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                return line;
            }
            let strip = line
                .bytes()
                .take(column)
                .take_while(|b| *b == b' ')
                .count();
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_block_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(..)
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::List(_)
            | Tag::Item
            | Tag::FootnoteDefinition(_)
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::MetadataBlock(_)
    )
}

fn tag_name(tag: &Tag<'_>) -> &'static str {
    match tag {
        Tag::Paragraph => "paragraph",
        Tag::Heading { .. } => "heading",
        Tag::BlockQuote(..) => "blockquote",
        Tag::CodeBlock(_) => "code",
        Tag::HtmlBlock => "html",
        Tag::List(_) => "list",
        Tag::Item => "listItem",
        Tag::FootnoteDefinition(_) => "footnoteDefinition",
        Tag::Table(_) => "table",
        Tag::TableHead | Tag::TableRow => "tableRow",
        Tag::TableCell => "tableCell",
        Tag::Emphasis => "emphasis",
        Tag::Strong => "strong",
        Tag::Strikethrough => "delete",
        Tag::Link { .. } => "link",
        Tag::Image { .. } => "image",
        Tag::MetadataBlock(_) => "yaml",
        _ => "unknown",
    }
}

fn event_name(event: &Event<'_>) -> &'static str {
    match event {
        Event::Text(_) | Event::SoftBreak => "text",
        Event::Code(_) => "inlineCode",
        Event::Html(_) | Event::InlineHtml(_) => "html",
        Event::Rule => "thematicBreak",
        Event::HardBreak => "break",
        Event::FootnoteReference(_) => "footnoteReference",
        _ => "unknown",
    }
}

// ----------------------------------------------------------------------
// Rendering
// ----------------------------------------------------------------------

/// Renders a document tree back to markdown.
///
/// Blocks are separated by blank lines and the output ends with a newline.
/// Opaque nodes are written verbatim.
pub fn render_markdown(ast: &Ast) -> String {
    let mut out = render_blocks(ast, ast.children(ast.root()), "\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_blocks(ast: &Ast, blocks: &[NodeId], separator: &str) -> String {
    // (ordered, alternate marker) of the block just written, if it was a list
    let mut previous_list: Option<(bool, bool)> = None;

    blocks
        .iter()
        .map(|&block| match ast.kind(block) {
            NodeKind::List {
                ordered,
                start,
                spread,
            } => {
                // Two lists of one kind in a row merge unless their markers differ
                let alternate =
                    matches!(previous_list, Some((o, alt)) if o == *ordered && !alt);
                previous_list = Some((*ordered, alternate));
                render_list(ast, block, *ordered, *start, *spread, alternate)
            }
            _ => {
                previous_list = None;
                render_block(ast, block)
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_block(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Root => render_blocks(ast, ast.children(id), "\n\n"),
        NodeKind::Heading { depth } => {
            let hashes = "#".repeat(usize::from(*depth));
            let content = render_inlines(ast, id);
            if content.is_empty() {
                hashes
            } else {
                format!("{} {}", hashes, content)
            }
        }
        NodeKind::List {
            ordered,
            start,
            spread,
        } => render_list(ast, id, *ordered, *start, *spread, false),
        NodeKind::ListItem => render_item(ast, id, "- ", false),
        NodeKind::Paragraph => render_inlines(ast, id),
        NodeKind::Text { value } => escape_text(value),
        NodeKind::Other(opaque) => render_opaque(opaque),
    }
}

/// Writes a list; `alternate` switches to `*` bullets or `)` delimiters
fn render_list(
    ast: &Ast,
    id: NodeId,
    ordered: bool,
    start: Option<u64>,
    spread: bool,
    alternate: bool,
) -> String {
    let items = ast.children(id);
    let bullet = if alternate { '*' } else { '-' };
    let delimiter = if alternate { ')' } else { '.' };

    // A list needs at least one item to exist in markdown; a bare marker
    // keeps an empty lane's list through a save and re-parse.
    if items.is_empty() {
        return if ordered {
            format!("{}{}", start.unwrap_or(1), delimiter)
        } else {
            bullet.to_string()
        };
    }

    let separator = if spread { "\n\n" } else { "\n" };
    items
        .iter()
        .enumerate()
        .map(|(i, &item)| {
            let marker = if ordered {
                format!("{}{} ", start.unwrap_or(1) + i as u64, delimiter)
            } else {
                format!("{} ", bullet)
            };
            match ast.kind(item) {
                NodeKind::ListItem => render_item(ast, item, &marker, spread),
                _ => indent_under(&marker, &render_block(ast, item)),
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_item(ast: &Ast, item: NodeId, marker: &str, spread: bool) -> String {
    let children = ast.children(item);
    if children.is_empty() {
        return marker.trim_end().to_string();
    }

    let separator = if spread { "\n\n" } else { "\n" };
    indent_under(marker, &render_blocks(ast, children, separator))
}

/// Prefixes the first line with `marker` and indents the rest to match
fn indent_under(marker: &str, body: &str) -> String {
    let indent = " ".repeat(marker.len());
    let mut out = String::with_capacity(body.len() + marker.len());

    for (i, line) in body.split('\n').enumerate() {
        if i == 0 {
            out.push_str(marker);
            out.push_str(line);
            continue;
        }
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&indent);
            out.push_str(line);
        }
    }

    out
}

fn render_inlines(ast: &Ast, id: NodeId) -> String {
    let children = ast.children(id);
    children
        .iter()
        .enumerate()
        .map(|(i, &child)| match ast.kind(child) {
            NodeKind::Text { value } => escape_inline(value, i == 0, i + 1 == children.len()),
            NodeKind::Other(opaque) => render_opaque(opaque),
            _ => render_block(ast, child),
        })
        .collect()
}

fn render_opaque(opaque: &Opaque) -> String {
    if let Some(source) = &opaque.source {
        return source.clone();
    }
    opaque.json.as_ref().map(json_text).unwrap_or_default()
}

/// Best-effort text of an mdast object that has no markdown source
fn json_text(value: &serde_json::Value) -> String {
    if let Some(text) = value.get("value").and_then(|v| v.as_str()) {
        return text.to_string();
    }
    value
        .get("children")
        .and_then(|c| c.as_array())
        .map(|children| children.iter().map(json_text).collect())
        .unwrap_or_default()
}

/// Escapes text so it re-parses as the same literal text.
///
/// Escaping is kept to what the text would otherwise turn into: block
/// markers at the start of a line, emphasis and code spans, entity and
/// HTML openers, and `[` only where it would open a link. Checkbox-style
/// titles (`[ ] Task`) come back exactly as written.
fn escape_text(value: &str) -> String {
    escape_inline(value, true, true)
}

/// Escapes a text run that may sit between other inline content.
///
/// Line-edge rules apply to its first line only `at_start` of the
/// paragraph and to its last line only `at_end`.
fn escape_inline(value: &str, at_start: bool, at_end: bool) -> String {
    let mut out = String::with_capacity(value.len());
    let lines: Vec<&str> = value.split('\n').collect();

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        escape_line(line, i > 0 || at_start, i + 1 < lines.len() || at_end, &mut out);
    }

    out
}

fn escape_line(line: &str, line_start: bool, line_end: bool, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let marker = block_marker(&chars).filter(|_| line_start);
    let closing = closing_hashes(&chars).filter(|_| line_end);
    let last = chars.len().saturating_sub(1);

    for (j, &c) in chars.iter().enumerate() {
        // Edge whitespace is stripped by the reader, so it goes out as a
        // character reference
        if matches!(c, ' ' | '\t') && ((j == 0 && line_start) || (j == last && line_end)) {
            out.push_str(&format!("&#{};", u32::from(c)));
            continue;
        }

        let next = chars.get(j + 1).copied();
        let escape = Some(j) == marker
            || Some(j) == closing
            || match c {
                '\\' | '*' | '`' => true,
                '_' => {
                    let before = j.checked_sub(1).map(|k| chars[k]);
                    !(before.is_some_and(char::is_alphanumeric)
                        && next.is_some_and(char::is_alphanumeric))
                }
                '&' => forms_entity(&chars[j + 1..]),
                '<' => next
                    .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')),
                '[' => opens_link(&chars, j),
                _ => false,
            };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Index of the character that would make the line start a block
fn block_marker(chars: &[char]) -> Option<usize> {
    let first = *chars.first()?;
    let second = chars.get(1).copied();

    match first {
        '#' | '>' => return Some(0),
        '-' | '+' if matches!(second, None | Some(' ') | Some('\t')) => return Some(0),
        '~' if chars.starts_with(&['~', '~', '~']) => return Some(0),
        _ => {}
    }

    // Thematic breaks, setext underlines and table delimiter rows
    if !first.is_whitespace()
        && chars.iter().any(|&c| c == '-' || c == '=')
        && chars
            .iter()
            .all(|&c| matches!(c, '-' | '=' | '|' | ':' | ' ' | '\t'))
    {
        return Some(0);
    }

    // Ordered list markers: the backslash goes before the delimiter since
    // digits cannot be escaped
    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    (digits > 0
        && matches!(chars.get(digits), Some('.') | Some(')'))
        && matches!(chars.get(digits + 1), None | Some(' ') | Some('\t')))
    .then_some(digits)
}

/// Index of a trailing `#` run that a heading would drop as its closing
/// sequence
fn closing_hashes(chars: &[char]) -> Option<usize> {
    let run = chars.iter().rev().take_while(|&&c| c == '#').count();
    let start = chars.len() - run;
    (run > 0 && start > 0 && matches!(chars[start - 1], ' ' | '\t')).then_some(start)
}

/// True if the text after an `&` reads as a character reference
fn forms_entity(rest: &[char]) -> bool {
    let body = rest.strip_prefix(&['#']).unwrap_or(rest);
    let name = body.iter().take_while(|c| c.is_ascii_alphanumeric()).count();
    name > 0 && body.get(name) == Some(&';')
}

/// True if the `[` at `open` would start a link, image or reference
/// definition
fn opens_link(chars: &[char], open: usize) -> bool {
    let Some(close) = chars[open + 1..].iter().position(|&c| c == ']') else {
        return false;
    };
    match chars.get(open + 1 + close + 1) {
        Some('(') | Some('[') => true,
        Some(':') => open == 0,
        _ => false,
    }
}

/// Undoes `\[` escaping added by serializers that escape brackets
pub fn unescape_brackets(text: &str) -> String {
    text.replace("\\[", "[")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, SequentialIds};

    fn reparse(source: &str) -> (Ast, String) {
        let ast = parse_markdown(source);
        let rendered = render_markdown(&ast);
        (ast, rendered)
    }

    #[test]
    fn parses_lane_and_card() {
        let ast = parse_markdown("### Todo\n\n- Task\n");
        let root = ast.root();
        let children = ast.children(root);

        assert_eq!(children.len(), 2);
        assert!(ast.is_lane_heading(children[0]));
        assert!(ast.is_task_list(children[1]));
        assert_eq!(ast.first_text_value(children[0]).unwrap(), "Todo");

        let item = ast.children(children[1])[0];
        assert_eq!(ast.first_text_value(item).unwrap(), "Task");
    }

    #[test]
    fn keeps_checkbox_prefix_in_title() {
        let source = "### Todo\n\n- [ ] Work on the website ~3d #feat @john 2020-03-20  \n- [ ] Fix the homepage ~1d #bug @jane  \n";
        let board = Board::parse(parse_markdown(source), &mut SequentialIds::new("id"));
        let cards = &board.lanes()[0].cards;

        assert_eq!(cards[0].title, "[ ] Work on the website ~3d #feat @john 2020-03-20");
        assert_eq!(cards[1].title, "[ ] Fix the homepage ~1d #bug @jane");

        let rendered = render_markdown(board.ast());
        assert!(rendered.contains("- [ ] Work on the website"));
        assert!(!rendered.contains("\\["));
    }

    #[test]
    fn nested_single_item_list_is_description() {
        let ast = parse_markdown("### Todo\n\n- Task\n  - A great task\n");
        let board = Board::parse(ast, &mut SequentialIds::new("id"));
        let card = &board.lanes()[0].cards[0];

        assert_eq!(card.title, "Task");
        assert_eq!(card.description.as_deref(), Some("A great task"));
    }

    #[test]
    fn unrecognized_content_round_trips_verbatim() {
        let source = "# Project\n\nSome *intro* text.\n\n```rust\nfn main() {}\n```\n\n### Todo\n\n- Task\n\n> quoted\n";
        let (_, rendered) = reparse(source);
        assert_eq!(rendered, source);
    }

    #[test]
    fn inline_formatting_is_kept() {
        let source = "### Todo\n\n- Fix `parse` in **core**\n";
        let (_, rendered) = reparse(source);
        assert_eq!(rendered, source);
    }

    #[test]
    fn spaces_next_to_inline_content_are_written_plainly() {
        let source = "### Todo\n\n- Fix `parse` in **core** now\n";
        let (_, rendered) = reparse(source);
        assert_eq!(rendered, source);
        assert!(!rendered.contains("&#32;"));
    }

    #[test]
    fn loose_and_ordered_lists_round_trip() {
        let source = "### Todo\n\n1. First\n2. Second\n\n### Done\n\n- One\n\n- Two\n";
        let (ast, rendered) = reparse(source);
        assert_eq!(rendered, source);
        assert_eq!(parse_markdown(&rendered), ast);
    }

    #[test]
    fn multi_line_item_is_reindented() {
        let (ast, rendered) = reparse("- first line\n  second line\n");
        assert_eq!(rendered, "- first line\n  second line\n");
        assert_eq!(parse_markdown(&rendered), ast);
    }

    #[test]
    fn empty_list_survives_reparse_as_lane() {
        let mut board = Board::parse(Ast::new(), &mut SequentialIds::new("id"));
        board.add_new_lane("lane", "Backlog").unwrap();

        let rendered = render_markdown(board.ast());
        assert_eq!(rendered, "### Backlog\n\n-\n");

        let mut reparsed = Board::parse(parse_markdown(&rendered), &mut SequentialIds::new("id"));
        assert_eq!(reparsed.lanes().len(), 1);
        assert!(reparsed.lanes()[0].cards.is_empty());

        let lane = reparsed.lanes()[0].id.clone();
        reparsed.add_new_task(&lane, "card", "Task").unwrap();
        assert_eq!(render_markdown(reparsed.ast()), "### Backlog\n\n- Task\n");
    }

    #[test]
    fn escapes_markdown_syntax_in_text() {
        assert_eq!(escape_text("a * b"), "a \\* b");
        assert_eq!(escape_text("snake_case"), "snake_case");
        assert_eq!(escape_text("_leading"), "\\_leading");
        assert_eq!(escape_text("# not a heading"), "\\# not a heading");
        assert_eq!(escape_text("1. not a list"), "1\\. not a list");
        assert_eq!(escape_text("2) not a list"), "2\\) not a list");
        assert_eq!(escape_text("1.5 release"), "1.5 release");
        assert_eq!(escape_text("[ ] task"), "[ ] task");
        assert_eq!(escape_text("AT&T"), "AT&T");
    }

    /// Sets the only card's title, saves, and reads the board back
    fn titles_after_save(title: &str) -> (String, Vec<String>) {
        let mut board = Board::parse(
            parse_markdown("### Todo\n\n- Task\n"),
            &mut SequentialIds::new("id"),
        );
        let card = board.lanes()[0].cards[0].id.clone();
        board.edit_card_title(&card, title).unwrap();

        let rendered = render_markdown(board.ast());
        let reparsed = Board::parse(parse_markdown(&rendered), &mut SequentialIds::new("id"));
        let titles = reparsed.lanes()[0]
            .cards
            .iter()
            .map(|c| c.title.clone())
            .collect();
        (rendered, titles)
    }

    #[test]
    fn edited_titles_with_syntax_reparse_literally() {
        let titles = [
            "# use *stars*",
            "1. Step one",
            "2) Step",
            "- dash",
            "+ plus",
            "> quote",
            "---",
            "***",
            "___",
            "===",
            "- - -",
            "~~~",
            "```",
            "[link](x)",
            "![image](x.png)",
            "[ref][x]",
            "[x]: https://example.com",
            "a &amp; b",
            "&#42;",
            "<div>",
            "<https://example.com>",
            "a < b & c",
            "snake_case and __dunder__",
            "back\\slash",
            "    indented",
            "trailing  ",
            "[ ] Task",
            "[x] Done",
        ];

        for title in titles {
            let (rendered, reparsed) = titles_after_save(title);
            assert_eq!(reparsed, [title], "rendered as {:?}", rendered);
        }
    }

    #[test]
    fn ordered_marker_escape_keeps_digits_clean() {
        let (rendered, titles) = titles_after_save("1. Step one");
        assert_eq!(rendered, "### Todo\n\n- 1\\. Step one\n");
        assert_eq!(titles, ["1. Step one"]);
    }

    #[test]
    fn multi_line_titles_do_not_become_headings_or_tables() {
        for title in ["Title\n---", "Title\n===", "a | b\n--- | ---", "a\n> b"] {
            let (rendered, reparsed) = titles_after_save(title);
            assert_eq!(reparsed, [title], "rendered as {:?}", rendered);
        }
    }

    #[test]
    fn lane_titles_keep_trailing_hashes() {
        let mut board = Board::parse(
            parse_markdown("### Todo\n\n- Task\n"),
            &mut SequentialIds::new("id"),
        );
        let lane = board.lanes()[0].id.clone();

        for title in ["Release #", "C#", "# 1"] {
            board.edit_lane_title(&lane, title).unwrap();
            let rendered = render_markdown(board.ast());
            let reparsed =
                Board::parse(parse_markdown(&rendered), &mut SequentialIds::new("id"));
            assert_eq!(reparsed.lanes()[0].title, title, "rendered as {:?}", rendered);
        }
    }

    #[test]
    fn adjacent_lists_stay_separate() {
        let source = "### Todo\n\n- a\n\n* b\n";
        let (ast, rendered) = reparse(source);
        assert_eq!(ast.children(ast.root()).len(), 3);
        assert_eq!(rendered, source);

        let board = Board::parse(parse_markdown(&rendered), &mut SequentialIds::new("id"));
        assert_eq!(board.lanes().len(), 1);
        let cards: Vec<&str> = board.lanes()[0].cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(cards, ["a"]);
    }

    #[test]
    fn runs_of_adjacent_lists_alternate_markers() {
        let source = "- a\n\n* b\n\n- c\n\n1. d\n\n1) e\n";
        let (ast, rendered) = reparse(source);
        assert_eq!(ast.children(ast.root()).len(), 5);
        assert_eq!(rendered, source);
        assert_eq!(parse_markdown(&rendered), ast);
    }

    #[test]
    fn empty_list_after_list_keeps_its_own_marker() {
        let mut ast = parse_markdown("### Todo\n\n- Task\n");
        let root = ast.root();
        let list = ast.new_task_list();
        ast.append_child(root, list);

        let rendered = render_markdown(&ast);
        assert_eq!(rendered, "### Todo\n\n- Task\n\n*\n");
        let reparsed = parse_markdown(&rendered);
        assert_eq!(reparsed.children(reparsed.root()).len(), 3);
    }

    #[test]
    fn unescape_brackets_restores_checkboxes() {
        assert_eq!(unescape_brackets("- \\[ ] Task"), "- [ ] Task");
    }

    #[test]
    fn empty_document() {
        let (ast, rendered) = reparse("");
        assert!(ast.children(ast.root()).is_empty());
        assert_eq!(rendered, "");
    }
}
