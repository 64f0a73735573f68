//! Scenario files: an arena config plus an optional `[[script]]` input track.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use skirmish_gameplay::ArenaConfig;
use tracing::info;

use crate::script::ScriptStep;

/// Scenario compiled into the binary.
const EMBEDDED: &str = include_str!("../scenarios/skirmish.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScriptTable {
    script: Vec<ScriptStep>,
}

/// A loaded scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Where the scenario came from
    pub name: String,
    /// Arena layout and tuning
    pub arena: ArenaConfig,
    /// Player input track
    pub script: Vec<ScriptStep>,
}

impl Scenario {
    /// Parse scenario text.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let arena = ArenaConfig::from_toml_str(text)
            .with_context(|| format!("invalid arena in scenario {name}"))?;
        let script = toml::from_str::<ScriptTable>(text)
            .with_context(|| format!("invalid script in scenario {name}"))?
            .script;

        Ok(Self {
            name: name.to_string(),
            arena,
            script,
        })
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let scenario = Self::parse(&path.display().to_string(), &text)?;
        info!(
            "Loaded scenario {} ({} enemies, {} script steps)",
            scenario.name,
            scenario.arena.enemies.len(),
            scenario.script.len()
        );
        Ok(scenario)
    }

    /// The built-in scenario.
    pub fn embedded() -> Result<Self> {
        Self::parse("embedded", EMBEDDED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_gameplay::BehaviorType;

    #[test]
    fn test_embedded_scenario_parses() {
        let scenario = Scenario::embedded().expect("embedded scenario");
        let behaviors: Vec<_> = scenario
            .arena
            .enemies
            .iter()
            .map(|enemy| enemy.tuning.behavior)
            .collect();

        assert!(scenario.arena.player.is_some());
        assert_eq!(
            behaviors,
            vec![BehaviorType::Patrol, BehaviorType::Stationary, BehaviorType::Ranged]
        );
        assert!(!scenario.script.is_empty());
    }

    #[test]
    fn test_scenario_without_script() {
        let scenario = Scenario::parse("bare", "gravity = 0.0").expect("bare scenario");
        assert!(scenario.script.is_empty());
        assert_eq!(scenario.arena.gravity, 0.0);
    }

    #[test]
    fn test_bad_scenario_reports_name() {
        let err = Scenario::parse("broken", "fixed_dt = []").expect_err("must fail");
        assert!(err.to_string().contains("broken"));
    }
}
