//! Commitlint rule discovery for prompt injection.
//!
//! Lookup is gated on a `node_modules` marker directory in the repository
//! root. Resolution preference:
//! 1. `npx --no-install commitlint --print-config` (fully expanded rules)
//! 2. a dedicated rule file's raw content
//! 3. the `commitlint` key in package.json
//!
//! Every failure here is soft: the prompt simply goes out without rules.

use std::env;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default timeout for the npx subprocess (20 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "EPIGRAM_NPX_TIMEOUT";

/// Dedicated rule files, checked in order.
const RULE_FILES: [&str; 10] = [
    ".commitlintrc",
    ".commitlintrc.json",
    ".commitlintrc.yml",
    ".commitlintrc.yaml",
    ".commitlintrc.js",
    ".commitlintrc.cjs",
    "commitlint.config.js",
    "commitlint.config.cjs",
    "commitlint.config.mjs",
    "commitlint.config.ts",
];

/// Commitlint rules resolved for a repository root.
///
/// `resolved` is true when the fully-expanded CLI config was used; raw rule
/// file or package.json content leaves it false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitlintRules {
    pub text: Option<String>,
    pub resolved: bool,
}

fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Look up commitlint rules for a repository root.
pub async fn load_rules(root: &Path) -> CommitlintRules {
    if !root.join("node_modules").is_dir() {
        debug!("No node_modules marker, skipping commitlint lookup");
        return CommitlintRules::default();
    }

    if let Some(text) = rules_from_cli(root).await {
        return CommitlintRules {
            text: Some(text),
            resolved: true,
        };
    }

    if let Some(text) = rules_from_file(root).or_else(|| rules_from_package_json(root)) {
        return CommitlintRules {
            text: Some(text),
            resolved: false,
        };
    }

    CommitlintRules::default()
}

/// Run the commitlint CLI to print the fully expanded config.
async fn rules_from_cli(root: &Path) -> Option<String> {
    if which::which("npx").is_err() {
        debug!("npx not found, skipping commitlint CLI resolution");
        return None;
    }

    let output = timeout(
        get_timeout(),
        Command::new("npx")
            .args(["--no-install", "commitlint", "--print-config"])
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .ok()?
    .ok()?;

    if !output.status.success() {
        debug!(
            "commitlint --print-config failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let config: serde_json::Value = serde_json::from_str(stdout.trim()).ok()?;
    let rules = config.get("rules")?;
    if rules.as_object().is_some_and(|map| map.is_empty()) {
        return None;
    }
    serde_json::to_string_pretty(rules).ok()
}

/// Read the first dedicated rule file found, verbatim.
fn rules_from_file(root: &Path) -> Option<String> {
    for name in RULE_FILES {
        let path = root.join(name);
        if path.is_file() {
            match std::fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Using commitlint rules from {name}");
                    return Some(text);
                }
                Ok(_) => {}
                Err(e) => debug!("Failed to read {name}: {e}"),
            }
        }
    }
    None
}

/// Extract the `commitlint` key from package.json.
fn rules_from_package_json(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join("package.json")).ok()?;
    let manifest: serde_json::Value = serde_json::from_str(&text).ok()?;
    let rules = manifest.get("commitlint")?;
    debug!("Using commitlint rules from package.json");
    serde_json::to_string_pretty(rules).ok()
}
