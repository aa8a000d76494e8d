//! Line classification for activity-diagram source
//!
//! The lexer turns source text into a flat list of [`Token`]s. Block notes and
//! block comments span several lines and are folded here, so the lowering pass
//! only ever sees complete statements. Lines matching no grammar rule are
//! dropped.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// A recognised diagram statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    /// `title <text>`
    Title(String),
    /// `start`
    Start,
    /// `stop`, `end`, `kill` or `detach`
    Stop(String),
    /// `:Label;`
    Action(String),
    /// `:A --> :B;` or `A --> B;`
    Transition { from: String, to: String },
    /// `if (cond) then (tag)`
    If { condition: String, tag: Option<String> },
    /// `else if (cond) then (tag)`
    ElseIf { condition: String, tag: Option<String> },
    /// `else (tag)`
    Else { tag: Option<String> },
    /// `endif`
    EndIf,
    /// `repeat` or `repeat :Label;`
    Repeat { label: Option<String> },
    /// `repeat while (cond) is (tag) not (tag)`
    RepeatWhile {
        condition: Option<String>,
        is_tag: Option<String>,
        not_tag: Option<String>,
    },
    /// Any of the three note forms, already folded into one body
    Note { target: Option<String>, body: String },
}

/// A statement with the 1-based line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub line: usize,
    pub statement: Statement,
}

struct LinePatterns {
    note_inline: Regex,
    note_block: Regex,
    if_open: Regex,
    else_if: Regex,
    else_branch: Regex,
    end_if: Regex,
    repeat_while: Regex,
    repeat: Regex,
    stop: Regex,
    title: Regex,
    transition: Regex,
    action: Regex,
}

impl LinePatterns {
    fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("diagram pattern must compile");
        Self {
            note_inline: compile(
                r"(?i)^(?:floating\s+)?note\s+(left|right|top|bottom)(?:\s+of\s+([^:]+?))?\s*:\s*(.*)$",
            ),
            note_block: compile(
                r"(?i)^(?:floating\s+)?note\s+(left|right|top|bottom)(?:\s+of\s+(.+?))?\s*$",
            ),
            if_open: compile(
                r"(?i)^if\s*\((.*?)\)\s*(?:is\s*\(([^)]*)\)\s*)?(?:then\s*(?:\(([^)]*)\))?)?\s*$",
            ),
            else_if: compile(
                r"(?i)^else\s*if\s*\((.*?)\)\s*(?:is\s*\(([^)]*)\)\s*)?(?:then\s*(?:\(([^)]*)\))?)?\s*$",
            ),
            else_branch: compile(r"(?i)^else\s*(?:\(([^)]*)\))?\s*$"),
            end_if: compile(r"(?i)^end\s*if$"),
            repeat_while: compile(
                r"(?i)^repeat\s*while\s*(?:\((.*?)\))?\s*(?:is\s*\(([^)]*)\))?\s*(?:not\s*\(([^)]*)\))?\s*;?$",
            ),
            repeat: compile(r"(?i)^repeat\s*(?::(.*);)?$"),
            stop: compile(r"(?i)^(stop|end|kill|detach)$"),
            title: compile(r"(?i)^title\s+(.+)$"),
            transition: compile(
                r"^:?\s*([^;]+?)\s*;?\s*-+(?:\[[^\]]*\])?-*>\s*:?\s*([^;]+?)\s*;?\s*$",
            ),
            action: compile(r"^:(.*);$"),
        }
    }

    fn get() -> &'static Self {
        static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();
        PATTERNS.get_or_init(LinePatterns::new)
    }
}

/// Return a trimmed, non-empty capture group
fn group(captures: &Captures<'_>, index: usize) -> Option<String> {
    captures
        .get(index)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Splits diagram text into statements
pub(crate) struct Lexer<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            position: 0,
        }
    }

    /// Classify every line, folding multi-line constructs
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.position < self.lines.len() {
            let line_number = self.position + 1;
            let line = self.lines[self.position].trim();
            self.position += 1;

            if line.is_empty() || line.starts_with('\'') || line.starts_with('@') {
                continue;
            }

            if line.starts_with("/'") {
                self.skip_block_comment(line);
                continue;
            }

            match self.classify(line) {
                Some(statement) => tokens.push(Token {
                    line: line_number,
                    statement,
                }),
                None => {
                    tracing::trace!("Skipping unrecognised diagram line {}: {}", line_number, line);
                }
            }
        }

        tokens
    }

    fn classify(&mut self, line: &str) -> Option<Statement> {
        let patterns = LinePatterns::get();

        if let Some(caps) = patterns.note_inline.captures(line) {
            return Some(Statement::Note {
                target: group(&caps, 2),
                body: caps.get(3).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
            });
        }

        if let Some(caps) = patterns.note_block.captures(line) {
            let target = group(&caps, 2);
            let body = self.collect_block_note();
            return Some(Statement::Note { target, body });
        }

        if let Some(caps) = patterns.else_if.captures(line) {
            return Some(Statement::ElseIf {
                condition: group(&caps, 1).unwrap_or_default(),
                tag: group(&caps, 3).or_else(|| group(&caps, 2)),
            });
        }

        if let Some(caps) = patterns.if_open.captures(line) {
            return Some(Statement::If {
                condition: group(&caps, 1).unwrap_or_default(),
                tag: group(&caps, 3).or_else(|| group(&caps, 2)),
            });
        }

        if let Some(caps) = patterns.else_branch.captures(line) {
            return Some(Statement::Else {
                tag: group(&caps, 1),
            });
        }

        if patterns.end_if.is_match(line) {
            return Some(Statement::EndIf);
        }

        if let Some(caps) = patterns.repeat_while.captures(line) {
            return Some(Statement::RepeatWhile {
                condition: group(&caps, 1),
                is_tag: group(&caps, 2),
                not_tag: group(&caps, 3),
            });
        }

        if let Some(caps) = patterns.repeat.captures(line) {
            return Some(Statement::Repeat {
                label: group(&caps, 1),
            });
        }

        if line.eq_ignore_ascii_case("start") {
            return Some(Statement::Start);
        }

        if let Some(caps) = patterns.stop.captures(line) {
            return Some(Statement::Stop(caps[1].to_lowercase()));
        }

        if let Some(caps) = patterns.title.captures(line) {
            return group(&caps, 1).map(Statement::Title);
        }

        if let Some(caps) = patterns.transition.captures(line) {
            if let (Some(from), Some(to)) = (group(&caps, 1), group(&caps, 2)) {
                return Some(Statement::Transition { from, to });
            }
        }

        if let Some(caps) = patterns.action.captures(line) {
            return group(&caps, 1).map(Statement::Action);
        }

        None
    }

    /// Consume lines up to `end note`, returning the dedented body.
    /// An unterminated block note takes everything up to end of input.
    fn collect_block_note(&mut self) -> String {
        let mut body = Vec::new();

        while self.position < self.lines.len() {
            let raw = self.lines[self.position];
            self.position += 1;

            let trimmed = raw.trim();
            if trimmed.eq_ignore_ascii_case("end note") || trimmed.eq_ignore_ascii_case("endnote")
            {
                return dedent(&body);
            }
            body.push(raw.trim_end());
        }

        tracing::debug!("Block note reached end of input without 'end note'");
        dedent(&body)
    }

    fn skip_block_comment(&mut self, first_line: &str) {
        if first_line[2..].contains("'/") {
            return;
        }
        while self.position < self.lines.len() {
            let line = self.lines[self.position];
            self.position += 1;
            if line.contains("'/") {
                return;
            }
        }
    }
}

/// Strip the indentation shared by all non-blank lines
fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
