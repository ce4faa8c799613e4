use super::fence_marker;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Characters after a directive keyword taken as the directive's action.
pub const ACTION_WINDOW: usize = 30;

// ---------------------------------------------------------------------------
// Directive keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Must,
    Never,
    Always,
    Required,
    Forbidden,
    Critical,
    DoNot,
    Dont,
}

impl Keyword {
    /// Match order. A line is attributed to the first keyword that matches.
    pub fn all() -> &'static [Keyword] {
        &[
            Keyword::Must,
            Keyword::Never,
            Keyword::Always,
            Keyword::Required,
            Keyword::Forbidden,
            Keyword::Critical,
            Keyword::DoNot,
            Keyword::Dont,
        ]
    }

    fn pattern(self) -> &'static str {
        match self {
            Keyword::Must => r"\bMUST\b",
            Keyword::Never => r"\bNEVER\b",
            Keyword::Always => r"\bALWAYS\b",
            Keyword::Required => r"\bREQUIRED\b",
            Keyword::Forbidden => r"\bFORBIDDEN\b",
            Keyword::Critical => r"\bCRITICAL\b",
            Keyword::DoNot => r"\bDO NOT\b",
            Keyword::Dont => r"\b(?i:don't|don’t|dont)\b",
        }
    }
}

static KEYWORD_RES: OnceLock<Vec<(Keyword, Regex)>> = OnceLock::new();

fn keyword_res() -> &'static [(Keyword, Regex)] {
    KEYWORD_RES.get_or_init(|| {
        Keyword::all()
            .iter()
            .map(|k| (*k, Regex::new(k.pattern()).unwrap()))
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalInstruction {
    /// The line, trimmed.
    pub line: String,
    /// 1-based line number within the body.
    pub line_number: usize,
    pub keyword: Keyword,
}

/// Lines of `body` carrying a directive keyword. Headers, blank lines, and
/// fenced code blocks are skipped; each line is reported at most once.
pub fn extract_critical_instructions(body: &str) -> Vec<CriticalInstruction> {
    let mut out = Vec::new();
    let mut open_fence: Option<&'static str> = None;

    for (idx, raw) in body.lines().enumerate() {
        if let Some(marker) = fence_marker(raw) {
            match open_fence {
                Some(open) if open == marker => open_fence = None,
                Some(_) => {}
                None => open_fence = Some(marker),
            }
            continue;
        }
        if open_fence.is_some() {
            continue;
        }

        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((keyword, _)) = keyword_res().iter().find(|(_, re)| re.is_match(line)) {
            out.push(CriticalInstruction {
                line: line.to_string(),
                line_number: idx + 1,
                keyword: *keyword,
            });
        }
    }

    out
}

/// Canonical form used to compare instructions across files: lowercase,
/// no list markers or emphasis, single spaces, no trailing punctuation.
pub fn normalize_instruction(line: &str) -> String {
    let mut s = line.trim();
    loop {
        let stripped = s
            .strip_prefix("- ")
            .or_else(|| s.strip_prefix("* "))
            .or_else(|| s.strip_prefix("+ "))
            .or_else(|| s.strip_prefix("> "))
            .or_else(|| strip_ordinal(s));
        match stripped {
            Some(rest) => s = rest.trim_start(),
            None => break,
        }
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ':', '!', ';'])
        .to_string()
}

fn strip_ordinal(s: &str) -> Option<&str> {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    s[digits..]
        .strip_prefix(". ")
        .or_else(|| s[digits..].strip_prefix(") "))
}

// ---------------------------------------------------------------------------
// Directive actions
// ---------------------------------------------------------------------------

static ALWAYS_RE: OnceLock<Regex> = OnceLock::new();
static NEVER_RE: OnceLock<Regex> = OnceLock::new();

fn always_re() -> &'static Regex {
    ALWAYS_RE.get_or_init(|| Regex::new(&format!(r"\bALWAYS\b\s*(.{{0,{ACTION_WINDOW}}})")).unwrap())
}

fn never_re() -> &'static Regex {
    NEVER_RE.get_or_init(|| {
        Regex::new(&format!(r"\b(?:NEVER|DO NOT)\b\s*(.{{0,{ACTION_WINDOW}}})")).unwrap()
    })
}

/// Text following `ALWAYS` in `line`, if present.
pub fn always_action(line: &str) -> Option<String> {
    capture_action(always_re(), line)
}

/// Text following `NEVER` or `DO NOT` in `line`, if present.
pub fn never_action(line: &str) -> Option<String> {
    capture_action(never_re(), line)
}

fn capture_action(re: &Regex, line: &str) -> Option<String> {
    let action = re.captures(line)?.get(1)?.as_str().trim();
    if action.is_empty() {
        None
    } else {
        Some(action.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
