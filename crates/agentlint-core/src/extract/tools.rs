//! Tool-usage evidence in agent and skill bodies.
//!
//! A tool counts as used when the body shows any of the mention families in
//! [`MENTION_POLICY`]. Text inside `<bad-example>` blocks and inside fenced
//! blocks whose info string contains `bad` is illustrative, not usage, and is
//! removed before matching.

use super::fence_marker;
use crate::platform::Platform;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Mention policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionFamily {
    /// `Write({ ... })`
    CallSyntax,
    /// "use the Grep tool", "invoke Task", "call Read", "with Edit"
    VerbPhrase,
    /// "the Bash tool"
    NounPhrase,
}

/// One pattern family. `{tool}` in the template is replaced by the escaped
/// tool name; the tool name itself always matches case-sensitively.
#[derive(Debug, Clone, Copy)]
pub struct MentionPattern {
    pub family: MentionFamily,
    pub template: &'static str,
}

pub const MENTION_POLICY: &[MentionPattern] = &[
    MentionPattern {
        family: MentionFamily::CallSyntax,
        template: r"\b{tool}\(",
    },
    MentionPattern {
        family: MentionFamily::VerbPhrase,
        template: r"\b(?i:use|uses|using|invoke|invokes|invoking|call|calls|calling|with)\s+(?i:the\s+)?`?{tool}\b",
    },
    MentionPattern {
        family: MentionFamily::NounPhrase,
        template: r"\b{tool}`?\s+(?i:tool)s?\b",
    },
];

/// Shell invocations that imply the platform's shell tool even when it is
/// never named.
static SHELL_COMMAND_RE: OnceLock<Regex> = OnceLock::new();

fn shell_command_re() -> &'static Regex {
    SHELL_COMMAND_RE.get_or_init(|| {
        Regex::new(concat!(
            r"\b(?:",
            r"git\s+(?:add|commit|push|pull|status|diff|log|checkout|switch|branch|merge|rebase|fetch|clone|stash|reset|tag|show|rev-parse|remote|worktree|cherry-pick)\b",
            r"|npm\s+(?:install|i|ci|run|test|publish|pack|version|audit|exec)\b",
            r"|npx\s+[\w@]",
            r"|(?:pnpm|yarn)\s+(?:install|add|run|test|build)\b",
            r"|cargo\s+(?:build|test|run|check|clippy|fmt|install|add)\b",
            r"|go\s+(?:build|test|run|mod)\b",
            r"|gh\s+(?:pr|issue|api|run|repo|release)\b",
            r"|pytest\b",
            r"|pip3?\s+install\b",
            r")"
        ))
        .unwrap()
    })
}

static BAD_EXAMPLE_RE: OnceLock<Regex> = OnceLock::new();

fn bad_example_re() -> &'static Regex {
    BAD_EXAMPLE_RE.get_or_init(|| {
        Regex::new(r"(?is)<bad[-_]example\b[^>]*>.*?</bad[-_]example\s*>").unwrap()
    })
}

// ---------------------------------------------------------------------------
// ToolMatcher
// ---------------------------------------------------------------------------

struct CompiledTool {
    name: String,
    patterns: Vec<(MentionFamily, Regex)>,
}

/// Mention patterns compiled once for a known-tools list.
pub struct ToolMatcher {
    tools: Vec<CompiledTool>,
    shell_tool: Option<String>,
}

impl ToolMatcher {
    /// `shell_tool` enables shell-command inference for that tool; it is
    /// ignored unless it is also in `known_tools`.
    pub fn new(known_tools: &[String], shell_tool: Option<&str>) -> Self {
        let tools = known_tools
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|name| CompiledTool {
                name: name.clone(),
                patterns: MENTION_POLICY
                    .iter()
                    .filter_map(|p| {
                        let src = p.template.replace("{tool}", &regex::escape(name));
                        Regex::new(&src).ok().map(|re| (p.family, re))
                    })
                    .collect(),
            })
            .collect();
        let shell_tool = shell_tool
            .filter(|s| known_tools.iter().any(|t| t == s))
            .map(str::to_string);
        Self { tools, shell_tool }
    }

    /// Build a matcher whose shell tool is whichever platform shell tool
    /// appears in `known_tools`.
    pub fn for_known_tools(known_tools: &[String]) -> Self {
        let shell = Platform::all()
            .iter()
            .map(|p| p.shell_tool())
            .find(|s| known_tools.iter().any(|t| t == s));
        Self::new(known_tools, shell)
    }

    pub fn extract(&self, body: &str) -> BTreeSet<String> {
        let text = strip_bad_examples(body);
        let mut used = BTreeSet::new();

        for tool in &self.tools {
            if tool.patterns.iter().any(|(_, re)| re.is_match(&text)) {
                used.insert(tool.name.clone());
            }
        }

        if let Some(shell) = &self.shell_tool {
            if !used.contains(shell) && detect_shell_usage(&text) {
                used.insert(shell.clone());
            }
        }

        used
    }

    /// Which mention families matched `tool` in `body`. Empty for unknown tools.
    pub fn evidence(&self, body: &str, tool: &str) -> Vec<MentionFamily> {
        let text = strip_bad_examples(body);
        self.tools
            .iter()
            .find(|t| t.name == tool)
            .map(|t| {
                t.patterns
                    .iter()
                    .filter(|(_, re)| re.is_match(&text))
                    .map(|(family, _)| *family)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Set of `known_tools` the body shows evidence of using.
pub fn extract_tool_mentions(body: &str, known_tools: &[String]) -> BTreeSet<String> {
    ToolMatcher::for_known_tools(known_tools).extract(body)
}

/// True when the text contains a recognizable shell command.
pub fn detect_shell_usage(text: &str) -> bool {
    shell_command_re().is_match(text)
}

/// Remove `<bad-example>` blocks and fenced blocks whose info string
/// mentions `bad`. Line structure outside removed regions is kept.
pub fn strip_bad_examples(body: &str) -> String {
    let without_tags = bad_example_re().replace_all(body, "");

    let mut out = String::with_capacity(without_tags.len());
    let mut skipping: Option<&'static str> = None;
    let mut in_other_fence: Option<&'static str> = None;

    for line in without_tags.lines() {
        let marker = fence_marker(line);

        if let Some(open) = skipping {
            if marker == Some(open) {
                skipping = None;
            }
            out.push('\n');
            continue;
        }

        if let Some(open) = in_other_fence {
            if marker == Some(open) {
                in_other_fence = None;
            }
            out.push_str(line);
            out.push('\n');
            continue;
        }

        if let Some(m) = marker {
            let info = line.trim_start().trim_start_matches(m);
            if info.to_ascii_lowercase().contains("bad") {
                skipping = Some(m);
                out.push('\n');
                continue;
            }
            in_other_fence = Some(m);
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        Platform::Claude.default_tools()
    }

    fn used(body: &str) -> BTreeSet<String> {
        extract_tool_mentions(body, &known())
    }

    #[test]
    fn call_syntax() {
        assert!(used("Then run Write({ file_path: 'x' })").contains("Write"));
    }

    #[test]
    fn verb_phrase() {
        assert!(used("Use the Grep tool to search.").contains("Grep"));
        assert!(used("invoke Task with the reviewer").contains("Task"));
        assert!(used("Search with Glob first").contains("Glob"));
    }

    #[test]
    fn noun_phrase() {
        assert!(used("The Read tool returns file contents.").contains("Read"));
    }

    #[test]
    fn tool_name_is_case_sensitive() {
        let tools = used("Read the docs and write a summary.");
        assert!(!tools.contains("Write"));
        assert!(!tools.contains("Read"));
    }

    #[test]
    fn word_boundary_prevents_substring_matches() {
        let tools = used("Call TodoWrite({ todos: [] })");
        assert!(tools.contains("TodoWrite"));
        assert!(!tools.contains("Write"));
    }

    #[test]
    fn bad_example_block_is_ignored() {
        let body = "Good text.\n<bad-example>\nWrite({ path })\n</bad-example>\n";
        assert!(!used(body).contains("Write"));
    }

    #[test]
    fn bad_fenced_block_is_ignored() {
        let body = "Intro\n```js bad\nEdit({ old: 1 })\n```\nOutro\n";
        assert!(!used(body).contains("Edit"));
    }

    #[test]
    fn regular_fenced_block_counts() {
        let body = "```js\nEdit({ old: 1 })\n```\n";
        assert!(used(body).contains("Edit"));
    }

    #[test]
    fn shell_commands_imply_bash() {
        assert!(used("Run `git status` and then `npm test`.").contains("Bash"));
        assert!(used("```\ncargo test --all\n```").contains("Bash"));
        assert!(used("go build ./...").contains("Bash"));
    }

    #[test]
    fn shell_inference_respects_bad_examples() {
        let body = "<bad-example>\ngit push --force\n</bad-example>";
        assert!(!used(body).contains("Bash"));
    }

    #[test]
    fn shell_inference_needs_known_shell_tool() {
        let tools = vec!["Read".to_string()];
        assert!(extract_tool_mentions("git commit -m x", &tools).is_empty());
    }

    #[test]
    fn plain_prose_has_no_shell_usage() {
        assert!(!detect_shell_usage("Let's go over the plan and make sure it works."));
    }

    #[test]
    fn evidence_reports_matching_families() {
        let matcher = ToolMatcher::for_known_tools(&known());
        let families = matcher.evidence("Use Read. Read(path). The Read tool.", "Read");
        assert_eq!(
            families,
            vec![
                MentionFamily::CallSyntax,
                MentionFamily::VerbPhrase,
                MentionFamily::NounPhrase
            ]
        );
        assert!(matcher.evidence("nothing", "Nope").is_empty());
    }

    #[test]
    fn strip_keeps_text_outside_blocks() {
        let stripped = strip_bad_examples("a\n```bad\nx\n```\nb\n");
        assert!(stripped.contains('a'));
        assert!(stripped.contains('b'));
        assert!(!stripped.contains('x'));
    }
}
