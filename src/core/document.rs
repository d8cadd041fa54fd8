//! Immutable document tree: paragraphs holding inline content.
//!
//! Positions use nested tokens. Every paragraph contributes an opening and a
//! closing position around its content, text contributes one position per
//! Unicode scalar, and leaf nodes (hard breaks, mention nodes) contribute one.
//! A document `[p("ab"), p("c")]` therefore has content size 7, the first
//! paragraph's text lives at 1..3 and the second's at 5..6.

use crate::error::DocumentError;

/// Stand-in character for an atomic mention node in flattened text.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Closed classification of a suggestion and of the mention it commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Person,
    Command,
    Tag,
}

impl Category {
    /// Glyph written in front of the label.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Person => "@",
            Category::Tag => "#",
            Category::Command => "✨",
        }
    }

    pub fn style_class(self) -> &'static str {
        match self {
            Category::Person => "mention mention-person",
            Category::Command => "mention mention-command",
            Category::Tag => "mention mention-tag",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Person => "person",
            Category::Command => "command",
            Category::Tag => "tag",
        }
    }
}

/// Attributes of an atomic mention node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionAttrs {
    pub style_class: String,
    pub category: Category,
    pub description: Option<String>,
    pub label: String,
}

impl MentionAttrs {
    pub fn new(category: Category, label: impl Into<String>, description: Option<String>) -> Self {
        Self {
            style_class: category.style_class().to_string(),
            category,
            description,
            label: label.into(),
        }
    }

    /// Prefix glyph followed by the label, as shown to the user.
    pub fn display_text(&self) -> String {
        format!("{}{}", self.category.prefix(), self.label)
    }
}

/// Attributes of a mark-based mention (styled text run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionMark {
    pub style_class: String,
    pub category: Category,
    pub description: Option<String>,
}

impl MentionMark {
    pub fn new(category: Category, description: Option<String>) -> Self {
        Self {
            style_class: category.style_class().to_string(),
            category,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Mention(MentionMark),
}

impl Mark {
    pub fn as_mention(&self) -> Option<&MentionMark> {
        match self {
            Mark::Mention(mark) => Some(mark),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn size(&self) -> usize {
        self.text.chars().count()
    }

    pub fn mention_mark(&self) -> Option<&MentionMark> {
        self.marks.iter().find_map(Mark::as_mention)
    }

    fn slice_chars(&self, from: usize, to: usize) -> TextRun {
        TextRun {
            text: self
                .text
                .chars()
                .skip(from)
                .take(to.saturating_sub(from))
                .collect(),
            marks: self.marks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    HardBreak,
    Mention(MentionAttrs),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(text))
    }

    pub fn size(&self) -> usize {
        match self {
            Inline::Text(run) => run.size(),
            Inline::HardBreak | Inline::Mention(_) => 1,
        }
    }

    /// Plain text with `\n` turned into hard breaks.
    pub fn from_plain_text(text: &str) -> Vec<Inline> {
        let mut out = Vec::new();
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                out.push(Inline::HardBreak);
            }
            if !line.is_empty() {
                out.push(Inline::text(line));
            }
        }
        out
    }
}

/// Content of a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit<'a> {
    Char { ch: char, marks: &'a [Mark] },
    HardBreak,
    Mention(&'a MentionAttrs),
}

impl<'a> Unit<'a> {
    pub fn mention_mark(&self) -> Option<&'a MentionMark> {
        match self {
            Unit::Char { marks, .. } => marks.iter().find_map(Mark::as_mention),
            _ => None,
        }
    }

    pub fn is_mention_node(&self) -> bool {
        matches!(self, Unit::Mention(_))
    }

    pub fn as_char(&self) -> char {
        match self {
            Unit::Char { ch, .. } => *ch,
            Unit::HardBreak => '\n',
            Unit::Mention(_) => OBJECT_REPLACEMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    content: Vec<Inline>,
}

impl Paragraph {
    pub fn new(content: Vec<Inline>) -> Self {
        Self {
            content: normalize(content),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(Inline::size).sum()
    }

    pub fn node_size(&self) -> usize {
        self.content_size() + 2
    }

    pub fn unit_at(&self, offset: usize) -> Option<Unit<'_>> {
        let mut start = 0;
        for inline in &self.content {
            let size = inline.size();
            if offset < start + size {
                return Some(match inline {
                    Inline::Text(run) => Unit::Char {
                        ch: run.text.chars().nth(offset - start)?,
                        marks: &run.marks,
                    },
                    Inline::HardBreak => Unit::HardBreak,
                    Inline::Mention(attrs) => Unit::Mention(attrs),
                });
            }
            start += size;
        }
        None
    }

    /// Inline content between two content offsets.
    pub fn slice(&self, from: usize, to: usize) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut start = 0;
        for inline in &self.content {
            let size = inline.size();
            let end = start + size;
            if end <= from {
                start = end;
                continue;
            }
            if start >= to {
                break;
            }
            match inline {
                Inline::Text(run) => {
                    let local_from = from.saturating_sub(start);
                    let local_to = (to - start).min(size);
                    out.push(Inline::Text(run.slice_chars(local_from, local_to)));
                }
                leaf => out.push(leaf.clone()),
            }
            start = end;
        }
        out
    }

    /// One character per position; hard breaks flatten to `\n` and mention
    /// nodes to [`OBJECT_REPLACEMENT`].
    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.content {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::HardBreak => out.push('\n'),
                Inline::Mention(_) => out.push(OBJECT_REPLACEMENT),
            }
        }
        out
    }

    fn replace(&self, from: usize, to: usize, insert: Vec<Inline>) -> Paragraph {
        let mut content = self.slice(0, from);
        content.extend(insert);
        content.extend(self.slice(to, self.content_size()));
        Paragraph::new(content)
    }

    fn add_mark(&self, from: usize, to: usize, mark: &Mark) -> Paragraph {
        let mut content = self.slice(0, from);
        content.extend(self.slice(from, to).into_iter().map(|inline| match inline {
            Inline::Text(mut run) => {
                if !run.marks.contains(mark) {
                    run.marks.push(mark.clone());
                }
                Inline::Text(run)
            }
            leaf => leaf,
        }));
        content.extend(self.slice(to, self.content_size()));
        Paragraph::new(content)
    }
}

fn normalize(content: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());
    for inline in content {
        if let Inline::Text(run) = &inline {
            if run.text.is_empty() {
                continue;
            }
            if let Some(Inline::Text(previous)) = out.last_mut() {
                if previous.marks == run.marks {
                    previous.text.push_str(&run.text);
                    continue;
                }
            }
        }
        out.push(inline);
    }
    out
}

/// A position located inside a paragraph's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPos {
    pub pos: usize,
    pub paragraph: usize,
    pub offset: usize,
}

impl ResolvedPos {
    /// Position of the first content slot of the containing paragraph.
    pub fn content_start(&self) -> usize {
        self.pos - self.offset
    }
}

/// Which representation a committed mention uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Node,
    Mark,
}

/// A mention found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    pub from: usize,
    pub to: usize,
    pub category: Category,
    pub label: String,
    pub kind: MentionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Builds a document; an empty paragraph list becomes one empty paragraph.
    pub fn new(mut paragraphs: Vec<Paragraph>) -> Self {
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph::empty());
        }
        Self { paragraphs }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Blank-line runs separate paragraphs, single newlines become hard breaks.
    pub fn from_text(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current: Vec<Inline> = Vec::new();
        let mut pending_newlines = 0usize;
        let mut buffer = String::new();

        let flush_newlines = |current: &mut Vec<Inline>,
                              paragraphs: &mut Vec<Paragraph>,
                              count: usize| {
            if count >= 2 {
                paragraphs.push(Paragraph::new(std::mem::take(current)));
            } else if count == 1 {
                current.push(Inline::HardBreak);
            }
        };

        for ch in text.chars() {
            if ch == '\n' {
                if !buffer.is_empty() {
                    current.push(Inline::text(std::mem::take(&mut buffer)));
                }
                pending_newlines += 1;
                continue;
            }
            if pending_newlines > 0 {
                flush_newlines(&mut current, &mut paragraphs, pending_newlines);
                pending_newlines = 0;
            }
            buffer.push(ch);
        }
        if !buffer.is_empty() {
            current.push(Inline::text(buffer));
        }
        flush_newlines(&mut current, &mut paragraphs, pending_newlines);
        paragraphs.push(Paragraph::new(current));

        Self::new(paragraphs)
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn content_size(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::node_size).sum()
    }

    /// First content position of the paragraph at `index`.
    pub fn content_start(&self, index: usize) -> Option<usize> {
        if index >= self.paragraphs.len() {
            return None;
        }
        let before: usize = self.paragraphs[..index]
            .iter()
            .map(Paragraph::node_size)
            .sum();
        Some(before + 1)
    }

    pub fn start_pos(&self) -> usize {
        1
    }

    pub fn end_pos(&self) -> usize {
        self.content_size() - 1
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, DocumentError> {
        let size = self.content_size();
        if pos > size {
            return Err(DocumentError::OutOfRange { pos, size });
        }
        let mut start = 0;
        for (paragraph, node) in self.paragraphs.iter().enumerate() {
            let content_start = start + 1;
            let content_end = content_start + node.content_size();
            if pos >= content_start && pos <= content_end {
                return Ok(ResolvedPos {
                    pos,
                    paragraph,
                    offset: pos - content_start,
                });
            }
            start += node.node_size();
        }
        Err(DocumentError::NotInTextblock { pos })
    }

    /// Closest position inside a paragraph, preferring later positions.
    pub fn nearest_inline_pos(&self, pos: usize) -> usize {
        if self.resolve(pos).is_ok() {
            return pos;
        }
        let mut start = 0;
        for node in &self.paragraphs {
            let content_start = start + 1;
            if content_start >= pos {
                return content_start;
            }
            start += node.node_size();
        }
        self.end_pos()
    }

    pub fn unit_before(&self, pos: usize) -> Option<Unit<'_>> {
        let resolved = self.resolve(pos).ok()?;
        if resolved.offset == 0 {
            return None;
        }
        self.paragraphs[resolved.paragraph].unit_at(resolved.offset - 1)
    }

    pub fn unit_after(&self, pos: usize) -> Option<Unit<'_>> {
        let resolved = self.resolve(pos).ok()?;
        self.paragraphs[resolved.paragraph].unit_at(resolved.offset)
    }

    /// Flattened text between two positions, with `block_separator` between
    /// paragraphs.
    pub fn text_between(&self, from: usize, to: usize, block_separator: &str) -> String {
        let mut pieces = Vec::new();
        let mut start = 0;
        for node in &self.paragraphs {
            let end = start + node.node_size();
            if end > from && start < to {
                let content_start = start + 1;
                let local_from = from.saturating_sub(content_start);
                let local_to = to
                    .saturating_sub(content_start)
                    .min(node.content_size());
                let piece: String = node
                    .text()
                    .chars()
                    .skip(local_from)
                    .take(local_to.saturating_sub(local_from))
                    .collect();
                pieces.push(piece);
            }
            start = end;
        }
        pieces.join(block_separator)
    }

    /// Text of the current line before `pos`, bounded to `max_chars`.
    ///
    /// Paragraph starts and hard breaks end the line. Every returned character
    /// corresponds to exactly one position.
    pub fn line_text_before(&self, pos: usize, max_chars: usize) -> String {
        let Ok(resolved) = self.resolve(pos) else {
            return String::new();
        };
        let text: Vec<char> = self.paragraphs[resolved.paragraph]
            .text()
            .chars()
            .take(resolved.offset)
            .collect();
        let window_start = text.len().saturating_sub(max_chars);
        let window = &text[window_start..];
        let line_start = window
            .iter()
            .rposition(|ch| *ch == '\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        window[line_start..].iter().collect()
    }

    /// Human-readable text: mentions as prefix and label, hard breaks as `\n`,
    /// paragraphs separated by a blank line.
    pub fn display_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|node| {
                let mut out = String::new();
                for inline in node.content() {
                    match inline {
                        Inline::Text(run) => out.push_str(&run.text),
                        Inline::HardBreak => out.push('\n'),
                        Inline::Mention(attrs) => out.push_str(&attrs.display_text()),
                    }
                }
                out
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn mentions(&self) -> Vec<MentionSpan> {
        let mut spans = Vec::new();
        let mut start = 0;
        for node in &self.paragraphs {
            let mut pos = start + 1;
            for inline in node.content() {
                let size = inline.size();
                match inline {
                    Inline::Mention(attrs) => spans.push(MentionSpan {
                        from: pos,
                        to: pos + 1,
                        category: attrs.category,
                        label: attrs.label.clone(),
                        kind: MentionKind::Node,
                    }),
                    Inline::Text(run) => {
                        if let Some(mark) = run.mention_mark() {
                            let label = run
                                .text
                                .strip_prefix(mark.category.prefix())
                                .unwrap_or(&run.text);
                            spans.push(MentionSpan {
                                from: pos,
                                to: pos + size,
                                category: mark.category,
                                label: label.to_string(),
                                kind: MentionKind::Mark,
                            });
                        }
                    }
                    Inline::HardBreak => {}
                }
                pos += size;
            }
            start += node.node_size();
        }
        spans
    }

    pub(crate) fn replace(
        &self,
        from: usize,
        to: usize,
        content: Vec<Inline>,
    ) -> Result<Document, DocumentError> {
        if from > to {
            return Err(DocumentError::InvalidRange { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        let mut paragraphs = self.paragraphs.clone();

        if start.paragraph == end.paragraph {
            paragraphs[start.paragraph] =
                self.paragraphs[start.paragraph].replace(start.offset, end.offset, content);
        } else {
            let first = &self.paragraphs[start.paragraph];
            let last = &self.paragraphs[end.paragraph];
            let mut merged = first.slice(0, start.offset);
            merged.extend(content);
            merged.extend(last.slice(end.offset, last.content_size()));
            paragraphs.splice(
                start.paragraph..=end.paragraph,
                std::iter::once(Paragraph::new(merged)),
            );
        }

        Ok(Document { paragraphs })
    }

    pub(crate) fn split(&self, pos: usize) -> Result<Document, DocumentError> {
        let resolved = self.resolve(pos)?;
        let node = &self.paragraphs[resolved.paragraph];
        let left = Paragraph::new(node.slice(0, resolved.offset));
        let right = Paragraph::new(node.slice(resolved.offset, node.content_size()));
        let mut paragraphs = self.paragraphs.clone();
        paragraphs.splice(resolved.paragraph..=resolved.paragraph, [left, right]);
        Ok(Document { paragraphs })
    }

    pub(crate) fn add_mark(
        &self,
        from: usize,
        to: usize,
        mark: &Mark,
    ) -> Result<Document, DocumentError> {
        if from > to {
            return Err(DocumentError::InvalidRange { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        let mut paragraphs = self.paragraphs.clone();
        for index in start.paragraph..=end.paragraph {
            let node = &self.paragraphs[index];
            let local_from = if index == start.paragraph { start.offset } else { 0 };
            let local_to = if index == end.paragraph {
                end.offset
            } else {
                node.content_size()
            };
            paragraphs[index] = node.add_mark(local_from, local_to, mark);
        }
        Ok(Document { paragraphs })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
