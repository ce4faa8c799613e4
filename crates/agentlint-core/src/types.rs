use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Certainty
// ---------------------------------------------------------------------------

/// Confidence that a finding is a real problem. Ordered so that
/// `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Certainty {
    Low,
    Medium,
    High,
}

impl Certainty {
    pub fn as_str(self) -> &'static str {
        match self {
            Certainty::High => "HIGH",
            Certainty::Medium => "MEDIUM",
            Certainty::Low => "LOW",
        }
    }
}

impl fmt::Display for Certainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Certainty {
    type Err = crate::error::LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Certainty::High),
            "medium" => Ok(Certainty::Medium),
            "low" => Ok(Certainty::Low),
            _ => Err(crate::error::LintError::InvalidCertainty(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Check groups a caller can select for a partial scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ToolConsistency,
    Workflow,
    Consistency,
    SkillAlignment,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::ToolConsistency,
            Category::Workflow,
            Category::Consistency,
            Category::SkillAlignment,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::ToolConsistency => "tool-consistency",
            Category::Workflow => "workflow",
            Category::Consistency => "consistency",
            Category::SkillAlignment => "skill-alignment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool-consistency" | "tool_consistency" | "tools" => Ok(Category::ToolConsistency),
            "workflow" => Ok(Category::Workflow),
            "consistency" => Ok(Category::Consistency),
            "skill-alignment" | "skill_alignment" | "skills" => Ok(Category::SkillAlignment),
            _ => Err(crate::error::LintError::InvalidCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// One reported inconsistency. Never mutated after a check creates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub pattern_id: String,
    pub certainty: Certainty,
    pub category: Category,
    pub file: String,
    pub issue: String,
}
