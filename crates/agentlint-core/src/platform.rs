use crate::error::LintError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const CLAUDE_TOOLS: &[&str] = &[
    "Task",
    "Bash",
    "Glob",
    "Grep",
    "Read",
    "Edit",
    "MultiEdit",
    "Write",
    "NotebookEdit",
    "WebFetch",
    "WebSearch",
    "TodoWrite",
    "Skill",
    "AskUserQuestion",
    "LSP",
];

const OPENCODE_TOOLS: &[&str] = &[
    "bash", "edit", "write", "read", "grep", "glob", "list", "patch", "todowrite", "todoread",
    "webfetch", "task", "skill", "question", "lsp",
];

const CODEX_TOOLS: &[&str] = &[
    "shell",
    "apply_patch",
    "read_file",
    "list_dir",
    "grep_files",
    "update_plan",
    "view_image",
    "web_search",
];

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// The agent runtime a corpus targets. Decides the built-in tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Claude,
    OpenCode,
    Codex,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Platform::Claude, Platform::OpenCode, Platform::Codex]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Claude => "claude",
            Platform::OpenCode => "opencode",
            Platform::Codex => "codex",
        }
    }

    /// State directory the runtime keeps in a project root.
    pub fn marker_dir(self) -> &'static str {
        match self {
            Platform::Claude => ".claude",
            Platform::OpenCode => ".opencode",
            Platform::Codex => ".codex",
        }
    }

    pub fn default_tools(self) -> Vec<String> {
        let tools = match self {
            Platform::Claude => CLAUDE_TOOLS,
            Platform::OpenCode => OPENCODE_TOOLS,
            Platform::Codex => CODEX_TOOLS,
        };
        tools.iter().map(|t| t.to_string()).collect()
    }

    /// The generic shell-execution tool, inferred from shell command text.
    pub fn shell_tool(self) -> &'static str {
        match self {
            Platform::Claude => "Bash",
            Platform::OpenCode => "bash",
            Platform::Codex => "shell",
        }
    }

    /// Detect the platform from runtime marker directories under `root`.
    /// Falls back to Claude.
    pub fn detect(root: &Path) -> Platform {
        Self::detect_from_dirs(root).unwrap_or_default()
    }

    pub fn detect_from_dirs(root: &Path) -> Option<Platform> {
        Platform::all()
            .iter()
            .copied()
            .find(|p| root.join(p.marker_dir()).is_dir())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "claude-code" => Ok(Platform::Claude),
            "opencode" => Ok(Platform::OpenCode),
            "codex" => Ok(Platform::Codex),
            _ => Err(LintError::InvalidPlatform(s.to_string())),
        }
    }
}
