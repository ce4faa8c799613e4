//! Corpus-wide analysis.
//!
//! [`analyze`] loads the corpus once, extracts facts from each record, feeds
//! them to the checks of the requested categories, and summarizes the
//! findings. Nothing is cached between calls.

use crate::checks::{
    self, parse_tool_list, Directive, Facts, KnownAgents, CONTRADICTORY_RULES,
    DUPLICATE_INSTRUCTIONS, MISSING_WORKFLOW_AGENT, ORPHANED_PROMPT, SKILL_TOOL_MISMATCH,
    TOOL_NOT_IN_ALLOWED_LIST,
};
use crate::config::Config;
use crate::corpus::{Corpus, Record};
use crate::extract::instructions::{always_action, never_action};
use crate::extract::{
    extract_agent_references, extract_critical_instructions, normalize_instruction, AgentRef,
    ToolMatcher,
};
use crate::paths;
use crate::platform::Platform;
use crate::types::{Category, Certainty, Finding};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Frontmatter keys declaring an agent's tool restriction, in lookup order.
pub const AGENT_TOOL_KEYS: &[&str] = &["tools", "allowed-tools"];
/// Frontmatter keys declaring a skill's tool restriction, in lookup order.
pub const SKILL_TOOL_KEYS: &[&str] = &["allowed-tools", "tools"];

// ---------------------------------------------------------------------------
// Options / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Keep LOW-certainty findings.
    pub verbose: bool,
    /// Categories to run. Empty = all.
    pub categories: Vec<Category>,
    /// Overrides the platform's built-in tool list.
    pub known_tools: Option<Vec<String>>,
    pub platform: Option<Platform>,
}

impl AnalyzeOptions {
    /// Fill unset options from `config`, then detect the platform from `root`.
    /// Explicit options win over the config file.
    pub fn merged_with(mut self, config: &Config, root: &Path) -> Self {
        self.verbose |= config.verbose;
        if self.categories.is_empty() {
            self.categories = config.categories.clone();
        }
        if self.known_tools.is_none() {
            self.known_tools = config.known_tools.clone();
        }
        if self.platform.is_none() {
            self.platform = Some(config.platform.unwrap_or_else(|| Platform::detect(root)));
        }
        self
    }

    pub fn selected_categories(&self) -> BTreeSet<Category> {
        if self.categories.is_empty() {
            Category::all().iter().copied().collect()
        } else {
            self.categories.iter().copied().collect()
        }
    }

    /// Explicit tool list, else the platform's built-ins.
    pub fn resolved_known_tools(&self) -> Vec<String> {
        self.known_tools
            .clone()
            .unwrap_or_else(|| self.platform.unwrap_or_default().default_tools())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub agents_analyzed: usize,
    pub skills_analyzed: usize,
    pub total_findings: usize,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    pub summary: Summary,
}

impl AnalysisResult {
    pub fn max_certainty(&self) -> Option<Certainty> {
        self.findings.iter().map(|f| f.certainty).max()
    }

    pub fn count_at_least(&self, certainty: Certainty) -> usize {
        self.findings
            .iter()
            .filter(|f| f.certainty >= certainty)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Analyze the `plugins/` tree under `root`.
///
/// Never fails. A root without a `plugins/` directory (including a root that
/// does not exist) yields an empty result, and an unreadable or malformed
/// `.agentlint.yaml` is logged and replaced by defaults.
pub fn analyze(root: &Path, options: &AnalyzeOptions) -> AnalysisResult {
    if !root.is_dir() {
        warn!(root = %root.display(), "root directory not found, nothing to analyze");
    }
    let config = Config::load(root).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring {}", paths::CONFIG_FILE);
        Config::default()
    });
    let options = options.clone().merged_with(&config, root);
    let corpus = Corpus::load(root);
    analyze_corpus(&corpus, &options)
}

/// Run the selected checks over an already loaded corpus.
pub fn analyze_corpus(corpus: &Corpus, options: &AnalyzeOptions) -> AnalysisResult {
    let categories = options.selected_categories();
    let known_tools = options.resolved_known_tools();
    let matcher = match options.platform {
        Some(p) => ToolMatcher::new(&known_tools, Some(p.shell_tool())),
        None => ToolMatcher::for_known_tools(&known_tools),
    };

    let mut findings = Vec::new();
    if categories.contains(&Category::ToolConsistency) {
        findings.extend(tool_consistency(corpus, &matcher));
    }
    if categories.contains(&Category::Workflow) {
        findings.extend(workflow(corpus));
    }
    if categories.contains(&Category::Consistency) {
        findings.extend(consistency(corpus));
    }
    if categories.contains(&Category::SkillAlignment) {
        findings.extend(skill_alignment(corpus, &matcher));
    }

    if !options.verbose {
        findings.retain(|f| f.certainty > Certainty::Low);
    }
    debug_assert!(findings.iter().all(|f| corpus.contains_path(&f.file)));

    let summary = summarize(corpus, &findings);
    info!(
        agents = summary.agents_analyzed,
        skills = summary.skills_analyzed,
        findings = summary.total_findings,
        "analysis complete"
    );
    AnalysisResult { findings, summary }
}

fn summarize(corpus: &Corpus, findings: &[Finding]) -> Summary {
    let mut by_category: BTreeMap<String, usize> = Category::all()
        .iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();
    for f in findings {
        *by_category.entry(f.category.as_str().to_string()).or_default() += 1;
    }
    Summary {
        agents_analyzed: corpus.agents.len(),
        skills_analyzed: corpus.skills.len(),
        total_findings: findings.len(),
        by_category,
    }
}

// ---------------------------------------------------------------------------
// tool-consistency / skill-alignment
// ---------------------------------------------------------------------------

fn tool_consistency(corpus: &Corpus, matcher: &ToolMatcher) -> Vec<Finding> {
    corpus
        .agents
        .iter()
        .flat_map(|agent| undeclared_tools(agent, AGENT_TOOL_KEYS, matcher, &TOOL_NOT_IN_ALLOWED_LIST))
        .collect()
}

fn skill_alignment(corpus: &Corpus, matcher: &ToolMatcher) -> Vec<Finding> {
    corpus
        .skills
        .iter()
        .flat_map(|skill| undeclared_tools(skill, SKILL_TOOL_KEYS, matcher, &SKILL_TOOL_MISMATCH))
        .collect()
}

fn undeclared_tools(
    record: &Record,
    keys: &[&str],
    matcher: &ToolMatcher,
    check: &checks::Check,
) -> Vec<Finding> {
    let declared = record
        .first_field(keys)
        .map(parse_tool_list)
        .unwrap_or_default();
    if declared.is_empty() {
        return Vec::new();
    }
    let used = matcher.extract(&record.body);
    debug!(path = %record.path, used = ?used, declared = ?declared, "tool usage");
    used.iter()
        .filter_map(|tool| {
            let finding = check.run(&Facts::ToolUsage {
                file: &record.path,
                subject: &record.name,
                tool,
                declared: &declared,
            })?;
            debug!(
                path = %record.path,
                tool = %tool,
                evidence = ?matcher.evidence(&record.body, tool),
                "undeclared tool"
            );
            Some(finding)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// workflow
// ---------------------------------------------------------------------------

fn workflow(corpus: &Corpus) -> Vec<Finding> {
    let known = KnownAgents::new(
        corpus
            .agents
            .iter()
            .map(|a| (a.plugin.clone(), a.name.clone())),
    );

    // Unique references per record, in order of first appearance.
    let references: Vec<(&Record, Vec<String>)> = corpus
        .records()
        .map(|r| {
            let mut seen = BTreeSet::new();
            let refs = extract_agent_references(&r.body)
                .into_iter()
                .filter(|s| seen.insert(s.clone()))
                .collect();
            (r, refs)
        })
        .collect();

    let mut findings = Vec::new();
    for (record, refs) in &references {
        for reference in refs {
            findings.extend(MISSING_WORKFLOW_AGENT.run(&Facts::AgentReference {
                file: &record.path,
                reference,
                known: &known,
            }));
        }
    }

    for agent in &corpus.agents {
        let referenced = references.iter().any(|(record, refs)| {
            record.path != agent.path
                && refs
                    .iter()
                    .any(|r| AgentRef::parse(r).matches(&agent.plugin, &agent.name))
        });
        findings.extend(ORPHANED_PROMPT.run(&Facts::AgentReach {
            file: &agent.path,
            name: &agent.name,
            referenced,
        }));
    }

    findings
}

// ---------------------------------------------------------------------------
// consistency
// ---------------------------------------------------------------------------

struct Site<'a> {
    file: &'a str,
    line_number: usize,
    action: String,
}

fn consistency(corpus: &Corpus) -> Vec<Finding> {
    // normalized instruction -> files carrying it, in corpus order
    let mut shared: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut always_sites: Vec<Site<'_>> = Vec::new();
    let mut never_sites: Vec<Site<'_>> = Vec::new();

    for record in corpus.records() {
        for instr in extract_critical_instructions(&record.body) {
            let normalized = normalize_instruction(&instr.line);
            if !normalized.is_empty() {
                let files = shared.entry(normalized).or_default();
                if !files.iter().any(|f| *f == record.path) {
                    files.push(record.path.clone());
                }
            }
            if let Some(action) = always_action(&instr.line) {
                always_sites.push(Site {
                    file: &record.path,
                    line_number: instr.line_number,
                    action,
                });
            }
            if let Some(action) = never_action(&instr.line) {
                never_sites.push(Site {
                    file: &record.path,
                    line_number: instr.line_number,
                    action,
                });
            }
        }
    }

    let mut findings: Vec<Finding> = shared
        .iter()
        .filter_map(|(instruction, files)| {
            DUPLICATE_INSTRUCTIONS.run(&Facts::SharedInstruction { instruction, files })
        })
        .collect();

    for always in &always_sites {
        for never in &never_sites {
            findings.extend(CONTRADICTORY_RULES.run(&Facts::DirectivePair {
                always: Directive {
                    file: always.file,
                    line_number: always.line_number,
                    action: &always.action,
                },
                never: Directive {
                    file: never.file,
                    line_number: never.line_number,
                    action: &never.action,
                },
            }));
        }
    }

    findings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
