use super::ExitCode;
use crate::output::print_json;
use agentlint_core::config::Config;
use agentlint_core::platform::Platform;
use agentlint_core::AnalyzeOptions;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, platform: Option<&str>, json: bool) -> anyhow::Result<ExitCode> {
    let platform = platform.map(str::parse::<Platform>).transpose()?;
    let config = Config::load(root).context("failed to load .agentlint.yaml")?;
    let options = AnalyzeOptions {
        platform,
        ..AnalyzeOptions::default()
    }
    .merged_with(&config, root);

    let platform = options.platform.unwrap_or_default();
    let tools = options.resolved_known_tools();
    let source = if options.known_tools.is_some() {
        "config"
    } else {
        "built-in"
    };

    if json {
        print_json(&serde_json::json!({
            "platform": platform,
            "shellTool": platform.shell_tool(),
            "source": source,
            "knownTools": tools,
        }))?;
    } else {
        println!("Platform:    {platform}");
        println!("Shell tool:  {}", platform.shell_tool());
        println!("Tools ({source}):");
        for tool in &tools {
            println!("  {tool}");
        }
    }
    Ok(0)
}
