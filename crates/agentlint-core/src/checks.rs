//! Pattern checks.
//!
//! Every check is a fn-pointer predicate over one [`Facts`] variant. A check
//! returns `None` for facts it has nothing to say about (including variants
//! it does not handle), so checks can be unit-tested with synthetic facts and
//! the analyzer only decides which facts to feed to which check.

use crate::extract::AgentRef;
use crate::frontmatter::FrontmatterValue;
use crate::types::{Category, Certainty, Finding};
use serde::Serialize;
use std::collections::BTreeSet;

/// Word-level Jaccard similarity an ALWAYS/NEVER pair must exceed.
pub const CONTRADICTION_THRESHOLD: f64 = 0.6;

/// Distinct files an instruction must appear in to count as duplicated.
pub const DUPLICATE_MIN_FILES: usize = 3;

/// Name fragments marking an agent as a workflow entry point. Entry points are
/// expected to be launched directly rather than referenced.
pub const ENTRY_POINT_MARKERS: &[&str] = &["orchestrator", "discoverer", "validator", "monitor"];

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// One ALWAYS or NEVER directive located in a file.
#[derive(Debug, Clone, Copy)]
pub struct Directive<'a> {
    pub file: &'a str,
    pub line_number: usize,
    pub action: &'a str,
}

/// Inputs a check can be evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Facts<'a> {
    /// `tool` has usage evidence in `file`, whose frontmatter declares `declared`.
    ToolUsage {
        file: &'a str,
        subject: &'a str,
        tool: &'a str,
        declared: &'a [String],
    },
    /// `file` delegates to `reference` via `subagent_type`.
    AgentReference {
        file: &'a str,
        reference: &'a str,
        known: &'a KnownAgents,
    },
    /// The normalized `instruction` appears in each of `files`.
    SharedInstruction {
        instruction: &'a str,
        files: &'a [String],
    },
    /// An ALWAYS directive and a NEVER/DO NOT directive.
    DirectivePair {
        always: Directive<'a>,
        never: Directive<'a>,
    },
    /// Whether any other agent or skill references the agent `name`.
    AgentReach {
        file: &'a str,
        name: &'a str,
        referenced: bool,
    },
}

/// `(plugin, agent)` pairs present in the corpus.
#[derive(Debug, Clone, Default)]
pub struct KnownAgents {
    agents: BTreeSet<(String, String)>,
}

impl KnownAgents {
    pub fn new<I, P, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, N)>,
        P: Into<String>,
        N: Into<String>,
    {
        Self {
            agents: pairs
                .into_iter()
                .map(|(p, n)| (p.into(), n.into()))
                .collect(),
        }
    }

    pub fn resolves(&self, reference: &AgentRef) -> bool {
        self.agents.iter().any(|(p, n)| reference.matches(p, n))
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// What a check reports before it is stamped with id and certainty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub file: String,
    pub issue: String,
}

/// A fn-pointer rule. Stateless; allocates only when it fires.
pub struct Check {
    pub id: &'static str,
    pub certainty: Certainty,
    pub category: Category,
    pub description: &'static str,
    pub predicate: fn(&Facts<'_>) -> Option<Issue>,
}

impl Check {
    pub fn run(&self, facts: &Facts<'_>) -> Option<Finding> {
        (self.predicate)(facts).map(|issue| Finding {
            pattern_id: self.id.to_string(),
            certainty: self.certainty,
            category: self.category,
            file: issue.file,
            issue: issue.issue,
        })
    }

    pub fn info(&self) -> CheckInfo {
        CheckInfo {
            id: self.id,
            certainty: self.certainty,
            category: self.category,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInfo {
    pub id: &'static str,
    pub certainty: Certainty,
    pub category: Category,
    pub description: &'static str,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub static TOOL_NOT_IN_ALLOWED_LIST: Check = Check {
    id: "tool_not_in_allowed_list",
    certainty: Certainty::High,
    category: Category::ToolConsistency,
    description: "Agent body uses a tool its `tools` frontmatter does not declare",
    predicate: tool_not_in_allowed_list,
};

pub static MISSING_WORKFLOW_AGENT: Check = Check {
    id: "missing_workflow_agent",
    certainty: Certainty::High,
    category: Category::Workflow,
    description: "`subagent_type` names an agent that does not exist in the corpus",
    predicate: missing_workflow_agent,
};

pub static DUPLICATE_INSTRUCTIONS: Check = Check {
    id: "duplicate_instructions",
    certainty: Certainty::Medium,
    category: Category::Consistency,
    description: "The same critical instruction is repeated in three or more files",
    predicate: duplicate_instructions,
};

pub static CONTRADICTORY_RULES: Check = Check {
    id: "contradictory_rules",
    certainty: Certainty::Medium,
    category: Category::Consistency,
    description: "An ALWAYS rule and a NEVER/DO NOT rule in different files describe the same action",
    predicate: contradictory_rules,
};

pub static ORPHANED_PROMPT: Check = Check {
    id: "orphaned_prompt",
    certainty: Certainty::Low,
    category: Category::Workflow,
    description: "Agent is never referenced and is not named like an entry point",
    predicate: orphaned_prompt,
};

pub static SKILL_TOOL_MISMATCH: Check = Check {
    id: "skill_tool_mismatch",
    certainty: Certainty::High,
    category: Category::SkillAlignment,
    description: "Skill body uses a tool its `allowed-tools` frontmatter does not declare",
    predicate: skill_tool_mismatch,
};

/// Every check in reporting order.
pub fn default_checks() -> Vec<&'static Check> {
    vec![
        &TOOL_NOT_IN_ALLOWED_LIST,
        &MISSING_WORKFLOW_AGENT,
        &ORPHANED_PROMPT,
        &DUPLICATE_INSTRUCTIONS,
        &CONTRADICTORY_RULES,
        &SKILL_TOOL_MISMATCH,
    ]
}

pub fn catalog() -> Vec<CheckInfo> {
    default_checks().into_iter().map(Check::info).collect()
}

pub fn find_check(id: &str) -> Option<&'static Check> {
    default_checks().into_iter().find(|c| c.id == id)
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn tool_not_in_allowed_list(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::ToolUsage {
        file,
        subject,
        tool,
        declared,
    } = *facts
    else {
        return None;
    };
    if !is_undeclared(tool, declared) {
        return None;
    }
    Some(Issue {
        file: file.to_string(),
        issue: format!(
            "Agent '{subject}' uses {tool} but its tools list only allows: {}",
            declared.join(", ")
        ),
    })
}

fn skill_tool_mismatch(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::ToolUsage {
        file,
        subject,
        tool,
        declared,
    } = *facts
    else {
        return None;
    };
    if !is_undeclared(tool, declared) {
        return None;
    }
    Some(Issue {
        file: file.to_string(),
        issue: format!(
            "Skill '{subject}' uses {tool} but allowed-tools only lists: {}",
            declared.join(", ")
        ),
    })
}

fn missing_workflow_agent(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::AgentReference {
        file,
        reference,
        known,
    } = *facts
    else {
        return None;
    };
    let parsed = AgentRef::parse(reference);
    if known.resolves(&parsed) {
        return None;
    }
    let issue = match &parsed.plugin {
        Some(plugin) => format!(
            "subagent_type \"{reference}\" does not match any agent: no agent '{}' in plugin '{plugin}'",
            parsed.agent
        ),
        None => format!(
            "subagent_type \"{reference}\" does not match any agent in any plugin"
        ),
    };
    Some(Issue {
        file: file.to_string(),
        issue,
    })
}

fn duplicate_instructions(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::SharedInstruction { instruction, files } = *facts else {
        return None;
    };
    let distinct: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    if distinct.len() < DUPLICATE_MIN_FILES {
        return None;
    }
    let first = files.first()?;
    let others: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|f| *f != first.as_str())
        .collect();
    Some(Issue {
        file: first.clone(),
        issue: format!(
            "Instruction \"{instruction}\" is repeated in {} files (also in: {})",
            distinct.len(),
            dedup_preserving_order(&others).join(", ")
        ),
    })
}

fn contradictory_rules(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::DirectivePair { always, never } = *facts else {
        return None;
    };
    if always.file == never.file {
        return None;
    }
    let similarity = jaccard_similarity(&action_words(always.action), &action_words(never.action));
    if similarity <= CONTRADICTION_THRESHOLD {
        return None;
    }
    Some(Issue {
        file: always.file.to_string(),
        issue: format!(
            "Line {} says ALWAYS \"{}\" but {}:{} says NEVER \"{}\" (similarity {:.2})",
            always.line_number, always.action, never.file, never.line_number, never.action, similarity
        ),
    })
}

fn orphaned_prompt(facts: &Facts<'_>) -> Option<Issue> {
    let Facts::AgentReach {
        file,
        name,
        referenced,
    } = *facts
    else {
        return None;
    };
    if referenced || is_entry_point(name) {
        return None;
    }
    Some(Issue {
        file: file.to_string(),
        issue: format!(
            "Agent '{name}' is never referenced via subagent_type by any other agent or skill"
        ),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when a restriction is declared and `tool` is not covered by it.
fn is_undeclared(tool: &str, declared: &[String]) -> bool {
    if declared.is_empty() {
        return false;
    }
    !declared
        .iter()
        .any(|d| normalize_tool_declaration(d) == tool)
}

/// `Bash(git:*)` → `Bash`. Unscoped entries are returned trimmed.
pub fn normalize_tool_declaration(entry: &str) -> &str {
    let entry = entry.trim();
    match entry.find('(') {
        Some(i) => entry[..i].trim_end(),
        None => entry,
    }
}

/// Declared tool entries from a frontmatter value. Scalars are split on
/// commas outside parentheses, so `Bash(git:*, npm:*)` stays one entry.
pub fn parse_tool_list(value: &FrontmatterValue) -> Vec<String> {
    match value {
        FrontmatterValue::List(items) => items
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        FrontmatterValue::Scalar(s) => split_top_level(s),
    }
}

fn split_top_level(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    out.push(current);
    out.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased words longer than two characters.
pub fn action_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`, or 0 when both are empty.
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

pub fn is_entry_point(name: &str) -> bool {
    let lower = name.to_lowercase();
    ENTRY_POINT_MARKERS.iter().any(|m| lower.contains(m))
}

fn dedup_preserving_order<'a>(items: &[&'a str]) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    items.iter().copied().filter(|i| seen.insert(*i)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
