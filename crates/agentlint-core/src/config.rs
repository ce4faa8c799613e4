use crate::error::Result;
use crate::paths;
use crate::platform::Platform;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Optional project settings read from `<root>/.agentlint.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Replaces the platform's built-in tool list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_tools: Option<Vec<String>>,
    /// Categories to run when the caller does not choose any. Empty = all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub verbose: bool,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            platform: None,
            known_tools: None,
            categories: Vec::new(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load `.agentlint.yaml` from `root`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unknown config version {} (expected 1)", self.version),
            });
        }

        if let Some(tools) = &self.known_tools {
            // 1. An empty list disables every tool check
            if tools.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "known_tools is empty: tool checks will never fire".to_string(),
                });
            }

            let mut seen = BTreeSet::new();
            let defaults = self.platform.unwrap_or_default().default_tools();
            for tool in tools {
                // 2. Tool names are matched verbatim in prose
                if tool.trim().is_empty() || tool.chars().any(|c| c.is_whitespace() || c == '(') {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("invalid tool name '{tool}' in known_tools"),
                    });
                    continue;
                }

                // 3. Duplicates
                if !seen.insert(tool.as_str()) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("duplicate tool '{tool}' in known_tools"),
                    });
                }

                // 4. Likely casing mistakes against the platform's built-ins
                if let Some(canonical) = defaults
                    .iter()
                    .find(|d| d.eq_ignore_ascii_case(tool) && *d != tool)
                {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "tool '{tool}' differs in case from built-in '{canonical}'; matching is case-sensitive"
                        ),
                    });
                }
            }
        }

        // 5. Duplicate categories
        let mut seen = BTreeSet::new();
        for category in &self.categories {
            if !seen.insert(*category) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("duplicate category '{category}' in categories"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
