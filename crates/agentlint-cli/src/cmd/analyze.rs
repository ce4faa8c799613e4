use super::ExitCode;
use crate::output::{print_json, print_table};
use agentlint_core::platform::Platform;
use agentlint_core::{analyze, AnalysisResult, AnalyzeOptions, Category, Certainty};
use clap::Args;
use std::path::Path;

/// Exit status when findings reach the `--fail-on` threshold.
pub const FINDINGS_EXIT_CODE: ExitCode = 2;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Category to run (repeatable): tool-consistency, workflow, consistency, skill-alignment
    #[arg(long = "category", short = 'c', value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Include LOW-certainty findings and log per-file detail
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Comma-separated known tool names (replaces the platform defaults)
    #[arg(long, value_delimiter = ',', value_name = "TOOLS")]
    pub tools: Option<Vec<String>>,

    /// Platform whose built-in tool names to use: claude, opencode, codex
    #[arg(long, env = super::PLATFORM_ENV)]
    pub platform: Option<String>,

    /// Exit with status 2 when a finding at or above this certainty exists
    #[arg(long, value_name = "CERTAINTY")]
    pub fail_on: Option<String>,
}

impl AnalyzeArgs {
    fn to_options(&self) -> anyhow::Result<AnalyzeOptions> {
        let categories = self
            .categories
            .iter()
            .map(|c| c.parse::<Category>())
            .collect::<Result<Vec<_>, _>>()?;
        let platform = self
            .platform
            .as_deref()
            .map(str::parse::<Platform>)
            .transpose()?;
        let known_tools = self.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        });
        Ok(AnalyzeOptions {
            verbose: self.verbose,
            categories,
            known_tools,
            platform,
        })
    }
}

pub fn run(root: &Path, args: AnalyzeArgs, json: bool) -> anyhow::Result<ExitCode> {
    let options = args.to_options()?;
    let fail_on = args
        .fail_on
        .as_deref()
        .map(str::parse::<Certainty>)
        .transpose()?;

    let result = analyze(root, &options);

    if json {
        print_json(&result)?;
    } else {
        print_report(&result);
    }

    match fail_on {
        Some(threshold) if result.count_at_least(threshold) > 0 => Ok(FINDINGS_EXIT_CODE),
        _ => Ok(0),
    }
}

fn print_report(result: &AnalysisResult) {
    let summary = &result.summary;

    if result.findings.is_empty() {
        println!(
            "No findings ({} agents, {} skills analyzed).",
            summary.agents_analyzed, summary.skills_analyzed
        );
        return;
    }

    let rows: Vec<Vec<String>> = result
        .findings
        .iter()
        .map(|f| {
            vec![
                f.certainty.to_string(),
                f.pattern_id.clone(),
                f.file.clone(),
                f.issue.clone(),
            ]
        })
        .collect();
    print_table(&["CERTAINTY", "PATTERN", "FILE", "ISSUE"], rows);

    println!();
    println!(
        "{} findings in {} agents and {} skills",
        summary.total_findings, summary.agents_analyzed, summary.skills_analyzed
    );
    for (category, count) in &summary.by_category {
        println!("  {category:<18} {count}");
    }
}
