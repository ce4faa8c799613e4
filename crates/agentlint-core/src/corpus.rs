//! Loading agent and skill definitions from a `plugins/` tree.
//!
//! Layout:
//!
//! ```text
//! <root>/plugins/<plugin>/agents/<agent>.md
//! <root>/plugins/<plugin>/skills/<skill>/SKILL.md
//! ```
//!
//! Loading is best-effort. Unreadable files and directories are skipped with a
//! warning and a missing `plugins/` directory yields no records.

use crate::frontmatter::{self, Frontmatter, FrontmatterValue};
use crate::paths;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Agent,
    Skill,
}

/// One loaded definition file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub kind: RecordKind,
    pub plugin: String,
    pub name: String,
    /// Root-relative path with `/` separators.
    pub path: String,
    pub frontmatter: Frontmatter,
    pub body: String,
}

pub type AgentRecord = Record;
pub type SkillRecord = Record;

impl Record {
    pub fn field(&self, key: &str) -> Option<&FrontmatterValue> {
        self.frontmatter.get(key)
    }

    /// The first of `keys` present in the frontmatter.
    pub fn first_field(&self, keys: &[&str]) -> Option<&FrontmatterValue> {
        keys.iter().find_map(|k| self.field(k))
    }
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Every agent and skill under one root, loaded fresh per analysis run.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub root: PathBuf,
    pub agents: Vec<AgentRecord>,
    pub skills: Vec<SkillRecord>,
}

impl Corpus {
    pub fn load(root: &Path) -> Self {
        let agents = load_all_agents(root);
        let skills = load_all_skills(root);
        debug!(
            agents = agents.len(),
            skills = skills.len(),
            "corpus loaded from {}",
            root.display()
        );
        Self {
            root: root.to_path_buf(),
            agents,
            skills,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.agents.iter().chain(self.skills.iter())
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.records().any(|r| r.path == path)
    }
}

/// All `plugins/*/agents/*.md` files except `README.md`, in sorted order.
pub fn load_all_agents(root: &Path) -> Vec<AgentRecord> {
    let mut out = Vec::new();
    for plugin in plugin_names(root) {
        let dir = paths::agents_dir(root, &plugin);
        for path in sorted_entries(&dir) {
            if !path.is_file() || !is_agent_file(&path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = stem.to_string();
            if let Some(record) = load_record(root, &path, RecordKind::Agent, &plugin, name) {
                out.push(record);
            }
        }
    }
    out
}

/// All `plugins/*/skills/*/SKILL.md` files, in sorted order.
pub fn load_all_skills(root: &Path) -> Vec<SkillRecord> {
    let mut out = Vec::new();
    for plugin in plugin_names(root) {
        let dir = paths::skills_dir(root, &plugin);
        for skill_dir in sorted_entries(&dir) {
            if !skill_dir.is_dir() {
                continue;
            }
            let Some(dir_name) = skill_dir.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if paths::is_excluded_dir(dir_name) {
                continue;
            }
            let file = paths::skill_file(root, &plugin, dir_name);
            if !file.is_file() {
                continue;
            }
            let dir_name = dir_name.to_string();
            if let Some(mut record) = load_record(root, &file, RecordKind::Skill, &plugin, dir_name)
            {
                if let Some(name) = record
                    .field("name")
                    .and_then(FrontmatterValue::as_scalar)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                {
                    record.name = name;
                }
                out.push(record);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_record(
    root: &Path,
    path: &Path,
    kind: RecordKind,
    plugin: &str,
    name: String,
) -> Option<Record> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };
    let doc = frontmatter::parse(&raw);
    let rel = paths::relative_display(root, path);
    debug!(kind = ?kind, plugin, name = %name, path = %rel, "loaded");
    Some(Record {
        kind,
        plugin: plugin.to_string(),
        name,
        path: rel,
        frontmatter: doc.frontmatter,
        body: doc.body,
    })
}

fn is_agent_file(path: &Path) -> bool {
    let is_md = path.extension().and_then(|e| e.to_str()) == Some("md");
    let is_readme = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(paths::AGENTS_README));
    is_md && !is_readme
}

/// Plugin directory names under `root/plugins`, sorted, excluded names removed.
fn plugin_names(root: &Path) -> Vec<String> {
    sorted_entries(&paths::plugins_dir(root))
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .filter(|n| !paths::is_excluded_dir(n))
        .collect()
}

/// Entries of `dir` sorted by file name. Empty when `dir` is missing or
/// unreadable.
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
            }
            return Vec::new();
        }
    };
    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());
    entries.into_iter().map(|e| e.path()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_plugins_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_all_agents(dir.path()).is_empty());
        assert!(load_all_skills(dir.path()).is_empty());
    }

    #[test]
    fn loads_agents_sorted_and_skips_readme() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plugins/b/agents/zeta.md", "---\ntools: Read\n---\nZ");
        write(dir.path(), "plugins/a/agents/alpha.md", "A body");
        write(dir.path(), "plugins/a/agents/README.md", "# Agents");
        write(dir.path(), "plugins/a/agents/notes.txt", "not markdown");

        let agents = load_all_agents(dir.path());
        let paths: Vec<_> = agents.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["plugins/a/agents/alpha.md", "plugins/b/agents/zeta.md"]);
        assert_eq!(agents[0].plugin, "a");
        assert_eq!(agents[0].name, "alpha");
        assert_eq!(agents[0].body, "A body");
        assert_eq!(agents[1].kind, RecordKind::Agent);
        assert_eq!(
            agents[1].field("tools"),
            Some(&FrontmatterValue::Scalar("Read".into()))
        );
    }

    #[test]
    fn loads_skills_with_frontmatter_name() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "plugins/a/skills/review/SKILL.md",
            "---\nname: code-review\nallowed-tools: Read, Grep\n---\nbody",
        );
        write(dir.path(), "plugins/a/skills/plain/SKILL.md", "no frontmatter");
        write(dir.path(), "plugins/a/skills/empty/notes.md", "not a skill");

        let skills = load_all_skills(dir.path());
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "plain");
        assert_eq!(skills[1].name, "code-review");
        assert_eq!(skills[1].path, "plugins/a/skills/review/SKILL.md");
        assert_eq!(skills[1].kind, RecordKind::Skill);
    }

    #[test]
    fn skips_excluded_plugin_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plugins/node_modules/agents/x.md", "x");
        write(dir.path(), "plugins/.hidden/agents/y.md", "y");
        write(dir.path(), "plugins/real/agents/z.md", "z");

        let agents = load_all_agents(dir.path());
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].plugin, "real");
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plugins/a/agents/ok.md", "fine");
        // Invalid UTF-8 fails read_to_string regardless of permissions.
        let bad = dir.path().join("plugins/a/agents/bad.md");
        fs::write(&bad, [0xff, 0xfe, 0xfd]).unwrap();

        let agents = load_all_agents(dir.path());
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "ok");
    }

    #[test]
    fn corpus_tracks_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plugins/a/agents/one.md", "1");
        write(dir.path(), "plugins/a/skills/s/SKILL.md", "s");
        let corpus = Corpus::load(dir.path());
        assert_eq!(corpus.records().count(), 2);
        assert!(corpus.contains_path("plugins/a/agents/one.md"));
        assert!(!corpus.contains_path("plugins/a/agents/two.md"));
    }
}
