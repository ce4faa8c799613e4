//! Fact extraction from document bodies.
//!
//! Extractors are pure functions over text; the pattern checks consume their
//! output and never look at raw markdown themselves.

pub mod instructions;
pub mod references;
pub mod tools;

pub use instructions::{extract_critical_instructions, normalize_instruction, CriticalInstruction};
pub use references::{extract_agent_references, AgentRef};
pub use tools::{extract_tool_mentions, ToolMatcher};

/// Opening or closing fence marker of a fenced code block.
pub(crate) fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}
