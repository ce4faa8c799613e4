use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PLUGINS_DIR: &str = "plugins";
pub const AGENTS_DIR: &str = "agents";
pub const SKILLS_DIR: &str = "skills";

pub const SKILL_FILE: &str = "SKILL.md";
pub const AGENTS_README: &str = "README.md";
pub const CONFIG_FILE: &str = ".agentlint.yaml";

/// Directory names never descended into while walking the plugin tree.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "out", "target"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn plugins_dir(root: &Path) -> PathBuf {
    root.join(PLUGINS_DIR)
}

pub fn agents_dir(root: &Path, plugin: &str) -> PathBuf {
    plugins_dir(root).join(plugin).join(AGENTS_DIR)
}

pub fn skills_dir(root: &Path, plugin: &str) -> PathBuf {
    plugins_dir(root).join(plugin).join(SKILLS_DIR)
}

pub fn skill_file(root: &Path, plugin: &str, skill: &str) -> PathBuf {
    skills_dir(root, plugin).join(skill).join(SKILL_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// True for vendored/build directories and hidden directories.
pub fn is_excluded_dir(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

/// Render `path` relative to `root` with `/` separators, the form every
/// record and finding uses to cite a file.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
