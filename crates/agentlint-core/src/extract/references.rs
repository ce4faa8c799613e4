use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

static SUBAGENT_RE: OnceLock<Regex> = OnceLock::new();

fn subagent_re() -> &'static Regex {
    SUBAGENT_RE.get_or_init(|| {
        Regex::new(r#"\bsubagent_type\b["']?\s*[:=]\s*(?:"([^"\n]+)"|'([^'\n]+)')"#).unwrap()
    })
}

/// Every `subagent_type` string literal in `body`, in order of appearance.
pub fn extract_agent_references(body: &str) -> Vec<String> {
    subagent_re()
        .captures_iter(body)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// AgentRef
// ---------------------------------------------------------------------------

/// A parsed `plugin:agent` reference. `plugin` is `None` for a bare agent name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AgentRef {
    pub plugin: Option<String>,
    pub agent: String,
}

impl AgentRef {
    pub fn parse(reference: &str) -> Self {
        match reference.split_once(':') {
            Some((plugin, agent)) if !plugin.trim().is_empty() => Self {
                plugin: Some(plugin.trim().to_string()),
                agent: agent.trim().to_string(),
            },
            Some((_, agent)) => Self {
                plugin: None,
                agent: agent.trim().to_string(),
            },
            None => Self {
                plugin: None,
                agent: reference.trim().to_string(),
            },
        }
    }

    /// True when this reference resolves to the agent `name` in `plugin`.
    pub fn matches(&self, plugin: &str, name: &str) -> bool {
        self.agent == name && self.plugin.as_deref().map_or(true, |p| p == plugin)
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plugin {
            Some(p) => write!(f, "{p}:{}", self.agent),
            None => f.write_str(&self.agent),
        }
    }
}
