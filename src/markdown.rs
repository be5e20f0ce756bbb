//! Light Markdown handling for model answers.
//!
//! Models answer with a small Markdown subset: headings, bullet and numbered
//! lists, `**bold**`, `*italic*` and `` `code` ``.  [`parse`] turns an answer
//! into [`Block`]s the UI renders with egui rich text; [`strip_emphasis`]
//! produces the plain variant shown above it.

/// Remove every `*` from `text`.
///
/// ```
/// assert_eq!(doc_qa::markdown::strip_emphasis("**K2** is *tall*"), "K2 is tall");
/// ```
pub fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A run of text with uniform styling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// One line of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#`..`######` heading; `level` is 1-6.
    Heading { level: u8, spans: Vec<Span> },
    /// `-`, `*` or `+` list item.
    Bullet(Vec<Span>),
    /// `1.` / `1)` list item; `number` keeps the source numbering.
    Numbered { number: String, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    /// One or more empty lines.
    Blank,
}

// ---------------------------------------------------------------------------
// Block parsing
// ---------------------------------------------------------------------------

/// Split `text` into blocks, one per non-empty line.
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !matches!(blocks.last(), Some(Block::Blank) | None) {
                blocks.push(Block::Blank);
            }
            continue;
        }
        blocks.push(parse_line(trimmed));
    }

    if matches!(blocks.last(), Some(Block::Blank)) {
        blocks.pop();
    }
    blocks
}

fn parse_line(line: &str) -> Block {
    if let Some((level, rest)) = heading(line) {
        return Block::Heading {
            level,
            spans: parse_inline(rest),
        };
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Block::Bullet(parse_inline(rest.trim_start()));
        }
    }

    if let Some((number, rest)) = numbered(line) {
        return Block::Numbered {
            number: number.to_string(),
            spans: parse_inline(rest),
        };
    }

    Block::Paragraph(parse_inline(line))
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    rest.strip_prefix(' ')
        .map(|r| (level as u8, r.trim()))
}

fn numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))?;
    Some((&line[..digits], rest.trim_start()))
}

// ---------------------------------------------------------------------------
// Inline parsing
// ---------------------------------------------------------------------------

/// Split a line into styled spans.
///
/// Backticks delimit code, inside which `*` is literal.  `**` toggles bold and
/// a single `*` toggles italic.  Unclosed markers style the rest of the line.
pub fn parse_inline(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current = Span::default();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' => {
                flush(&mut current, &mut spans);
                current.code = !current.code;
            }
            '*' if !current.code => {
                flush(&mut current, &mut spans);
                if chars.peek() == Some(&'*') {
                    chars.next();
                    current.bold = !current.bold;
                } else {
                    current.italic = !current.italic;
                }
            }
            _ => current.text.push(c),
        }
    }
    flush(&mut current, &mut spans);

    spans
}

fn flush(current: &mut Span, spans: &mut Vec<Span>) {
    if !current.text.is_empty() {
        spans.push(current.clone());
    }
    current.text.clear();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Span {
        Span {
            text: text.into(),
            bold: true,
            ..Span::default()
        }
    }

    #[test]
    fn strip_removes_all_asterisks() {
        assert_eq!(strip_emphasis("* item\n**bold** and *it*"), " item\nbold and it");
        assert_eq!(strip_emphasis("no markers"), "no markers");
    }

    #[test]
    fn inline_styles() {
        let spans = parse_inline("The **capital** is *Islamabad* (`ISB`).");
        assert_eq!(
            spans,
            vec![
                Span::plain("The "),
                bold("capital"),
                Span::plain(" is "),
                Span {
                    text: "Islamabad".into(),
                    italic: true,
                    ..Span::default()
                },
                Span::plain(" ("),
                Span {
                    text: "ISB".into(),
                    code: true,
                    ..Span::default()
                },
                Span::plain(")."),
            ]
        );
    }

    #[test]
    fn asterisks_inside_code_are_literal() {
        let spans = parse_inline("`a*b`");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "a*b");
        assert!(spans[0].code && !spans[0].italic);
    }

    #[test]
    fn bold_italic_nesting() {
        let spans = parse_inline("***both***");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].bold && spans[0].italic);
    }

    #[test]
    fn block_kinds() {
        let text = "## Key facts\n\n* **Capital:** Islamabad\n- Area: 881,913 km²\n1. Punjab\n2) Sindh\nPakistan is in South Asia.";
        let blocks = parse(text);

        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 2,
                spans: vec![Span::plain("Key facts")]
            }
        );
        assert_eq!(blocks[1], Block::Blank);
        assert_eq!(
            blocks[2],
            Block::Bullet(vec![bold("Capital:"), Span::plain(" Islamabad")])
        );
        assert!(matches!(blocks[3], Block::Bullet(_)));
        assert!(matches!(&blocks[4], Block::Numbered { number, .. } if number == "1"));
        assert!(matches!(&blocks[5], Block::Numbered { number, .. } if number == "2"));
        assert!(matches!(blocks[6], Block::Paragraph(_)));
        assert_eq!(blocks.len(), 7);
    }

    #[test]
    fn blank_runs_collapse_and_edges_are_trimmed() {
        let blocks = parse("\n\nfirst\n\n\n\nsecond\n\n");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![Span::plain("first")]),
                Block::Blank,
                Block::Paragraph(vec![Span::plain("second")]),
            ]
        );
    }

    #[test]
    fn not_headings_or_lists() {
        assert!(matches!(parse_line("#hashtag"), Block::Paragraph(_)));
        assert!(matches!(parse_line("####### seven"), Block::Paragraph(_)));
        assert!(matches!(parse_line("2024 was a year"), Block::Paragraph(_)));
        assert!(matches!(parse_line("*emphasis* first"), Block::Paragraph(_)));
    }

    #[test]
    fn empty_answer_has_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("   \n  ").is_empty());
    }
}
