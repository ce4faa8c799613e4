use agentlint_core::checks::catalog;
use agentlint_core::platform::Platform;
use agentlint_core::{analyze, AnalyzeOptions, Category, Certainty, Finding};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn options() -> AnalyzeOptions {
    AnalyzeOptions {
        platform: Some(Platform::Claude),
        ..AnalyzeOptions::default()
    }
}

fn of_pattern<'a>(findings: &'a [Finding], id: &str) -> Vec<&'a Finding> {
    findings.iter().filter(|f| f.pattern_id == id).collect()
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn undeclared_write_in_agent_body() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/demo/agents/agent-a.md",
        "---\nname: agent-a\ntools: [Read, Grep]\n---\n\nRead the file, then:\n\nWrite({ file_path: \"out.md\", content })\n",
    );
    write(
        dir.path(),
        "plugins/demo/agents/agent-b.md",
        "---\ntools: [Read]\n---\nUse the Read tool.\n",
    );
    write(
        dir.path(),
        "plugins/demo/agents/agent-c.md",
        "No restrictions here. Write(x) and Edit(y) are fine.\n",
    );

    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "tool_not_in_allowed_list");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].certainty, Certainty::High);
    assert_eq!(hits[0].file, "plugins/demo/agents/agent-a.md");
    assert!(hits[0].issue.contains("Write"));
    assert_eq!(result.summary.agents_analyzed, 3);
}

#[test]
fn missing_subagent_reference() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/pluginX/agents/caller.md",
        "Task({ subagent_type: \"pluginX:missingAgent\", prompt: \"go\" })\n",
    );
    write(dir.path(), "plugins/pluginX/agents/present.md", "Here.\n");

    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "missing_workflow_agent");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].certainty, Certainty::High);
    assert_eq!(hits[0].file, "plugins/pluginX/agents/caller.md");
    assert!(hits[0].issue.contains("missingAgent"));
}

#[test]
fn skill_uses_undeclared_tool() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/demo/skills/report/SKILL.md",
        "---\nname: report\nallowed-tools: Read, Grep\n---\n\nGrep(\"TODO\")\nWrite(\"report.md\")\n",
    );

    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "skill_tool_mismatch");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].certainty, Certainty::High);
    assert_eq!(hits[0].file, "plugins/demo/skills/report/SKILL.md");
    assert!(hits[0].issue.contains("Write"));
    assert_eq!(result.summary.skills_analyzed, 1);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn no_declaration_means_no_tool_findings() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/demo/agents/free.md",
        "---\nname: free\n---\nWrite(a) Edit(b) Bash(c) git push\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "tool_not_in_allowed_list").is_empty());
}

#[test]
fn scoped_bash_declaration_covers_bash() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/demo/agents/gitter.md",
        "---\ntools: Read, Bash(git:*)\n---\nUse the Bash tool: git status\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "tool_not_in_allowed_list").is_empty());
}

#[test]
fn bad_examples_are_not_usage() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/demo/agents/coach.md",
        "---\ntools: Read\n---\n<bad-example>\nWrite({ x })\n</bad-example>\n\n```js bad\nEdit({ y })\n```\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "tool_not_in_allowed_list").is_empty());
}

#[test]
fn duplicate_instructions_threshold() {
    let dir = TempDir::new().unwrap();
    for name in ["one", "two"] {
        write(
            dir.path(),
            &format!("plugins/demo/agents/{name}.md"),
            "NEVER commit secrets to the repository.\n",
        );
    }
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "duplicate_instructions").is_empty());

    write(
        dir.path(),
        "plugins/demo/skills/three/SKILL.md",
        "never commit SECRETS to the repository\n",
    );
    // Lowercase "never" is not a directive keyword, so the third copy must
    // carry one too.
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "duplicate_instructions").is_empty());

    write(
        dir.path(),
        "plugins/demo/skills/three/SKILL.md",
        "NEVER commit SECRETS to the repository\n",
    );
    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "duplicate_instructions");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].certainty, Certainty::Medium);
    assert!(hits[0].issue.contains("3 files"));
}

#[test]
fn headers_and_code_blocks_do_not_carry_instructions() {
    let dir = TempDir::new().unwrap();
    for name in ["one", "two", "three"] {
        write(
            dir.path(),
            &format!("plugins/demo/agents/{name}.md"),
            "## You MUST read this\n\n```\nNEVER do this in code\n```\n",
        );
    }
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "duplicate_instructions").is_empty());
}

#[test]
fn rerun_is_identical() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        "---\ntools: Read\n---\nWrite(a)\nsubagent_type: 'a:nobody'\nALWAYS deploy on fridays after lunch\n",
    );
    write(
        dir.path(),
        "plugins/b/agents/y.md",
        "NEVER deploy on fridays after lunch\n",
    );
    write(dir.path(), "plugins/b/skills/s/SKILL.md", "---\ntools: Grep\n---\nRead(z)\n");

    let opts = AnalyzeOptions {
        verbose: true,
        ..options()
    };
    let first = analyze(dir.path(), &opts);
    let second = analyze(dir.path(), &opts);
    assert_eq!(first, second);
    let as_set: BTreeSet<_> = first
        .findings
        .iter()
        .map(|f| (f.pattern_id.as_str(), f.file.as_str()))
        .collect();
    assert_eq!(as_set.len(), first.findings.len());
    assert!(first.summary.total_findings >= 5);
}

#[test]
fn findings_only_cite_scanned_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        "---\ntools: Read\n---\nWrite(a)\nsubagent_type: 'a:nobody'\n",
    );
    write(dir.path(), "plugins/a/agents/README.md", "Write(a) subagent_type: 'a:ghost'");
    write(dir.path(), "plugins/node_modules/agents/z.md", "Write(a)");

    let result = analyze(
        dir.path(),
        &AnalyzeOptions {
            verbose: true,
            ..options()
        },
    );
    assert!(!result.findings.is_empty());
    assert!(result
        .findings
        .iter()
        .all(|f| f.file == "plugins/a/agents/x.md"));
}

#[test]
fn yaml_comment_in_tools_declaration() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/a-orchestrator.md",
        "---\ntools: Read, Grep # read-only agent\n---\nUse the Grep tool.\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "tool_not_in_allowed_list").is_empty());
}

#[test]
fn quoted_scoped_tool_in_inline_list() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/a-orchestrator.md",
        "---\ntools: [Read, \"Bash(git:*, npm:*)\"]\n---\nUse the Bash tool: git status\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "tool_not_in_allowed_list").is_empty());
}

#[test]
fn multiline_description_keeps_tool_restriction() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/a-orchestrator.md",
        "---\ndescription: Reviews code for bugs\n  and style issues.\ntools: Read\n---\nWrite({ x })\n",
    );
    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "tool_not_in_allowed_list");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].issue.contains("Write"));
}

#[test]
fn contradiction_only_compares_the_action_window() {
    // The first 30 characters after each keyword share no words; the long
    // identical tails would push whole-line similarity above the threshold.
    let tail = " then push release branches to production servers tonight after every \
                green build passes smoke checks across staging canary fleets regions clusters";
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        &format!("ALWAYS review each pending migrations{tail}\n"),
    );
    write(
        dir.path(),
        "plugins/a/agents/y.md",
        &format!("NEVER rewrite old schema definitions{tail}\n"),
    );
    let result = analyze(dir.path(), &options());
    assert!(of_pattern(&result.findings, "contradictory_rules").is_empty());

    write(
        dir.path(),
        "plugins/a/agents/y.md",
        &format!("NEVER review each pending migrations{tail}\n"),
    );
    let result = analyze(dir.path(), &options());
    let hits = of_pattern(&result.findings, "contradictory_rules");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, "plugins/a/agents/x.md");
}

// ---------------------------------------------------------------------------
// Configuration and errors
// ---------------------------------------------------------------------------

#[test]
fn missing_plugins_dir_is_empty_result() {
    let dir = TempDir::new().unwrap();
    let result = analyze(dir.path(), &options());
    assert!(result.findings.is_empty());
    assert_eq!(result.summary.agents_analyzed, 0);
    assert_eq!(result.summary.skills_analyzed, 0);
}

#[test]
fn missing_root_is_empty_result() {
    let dir = TempDir::new().unwrap();
    let result = analyze(&dir.path().join("nope"), &options());
    assert!(result.findings.is_empty());
    assert_eq!(result.summary.total_findings, 0);
    assert_eq!(result.summary.by_category.len(), Category::all().len());
}

#[test]
fn malformed_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".agentlint.yaml", "categories: [unclosed\n");
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        "---\ntools: Read\n---\nWrite(a)\n",
    );
    let result = analyze(dir.path(), &options());
    assert_eq!(of_pattern(&result.findings, "tool_not_in_allowed_list").len(), 1);
}

#[test]
fn config_file_selects_categories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".agentlint.yaml", "categories: [skill-alignment]\n");
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        "---\ntools: Read\n---\nWrite(a)\n",
    );
    let result = analyze(dir.path(), &options());
    assert!(result.findings.is_empty());
    assert_eq!(
        result.summary.by_category[Category::ToolConsistency.as_str()],
        0
    );
}

#[test]
fn config_file_known_tools_for_opencode() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".agentlint.yaml", "platform: opencode\n");
    write(
        dir.path(),
        "plugins/a/agents/x.md",
        "---\ntools: [read]\n---\nRun npm test before finishing.\n",
    );
    let result = analyze(dir.path(), &AnalyzeOptions::default());
    let hits = of_pattern(&result.findings, "tool_not_in_allowed_list");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].issue.contains("bash"));
}

#[test]
fn catalog_covers_every_category() {
    let categories: BTreeSet<_> = catalog().iter().map(|c| c.category).collect();
    assert_eq!(categories.len(), Category::all().len());
}
