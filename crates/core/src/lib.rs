//! jfold-core — shallow, regex-driven rewriting of Java sources between
//! Lombok-style markers and the explicit code they stand for.
//!
//! The pipeline per file is scan → extract fields → synthesize → plan an anchor →
//! splice. [`drivers`] composes those stages into the four whole-file rewrites,
//! and [`walk`] runs drivers over a source tree.

pub mod drivers;
pub mod error;
pub mod fields;
pub mod loginspect;
pub mod planner;
pub mod scanner;
pub mod synth;
pub mod types;
pub mod walk;

use std::path::Path;
use tracing::{debug, warn};
use types::WalkConfig;

pub const CONFIG_FILE: &str = ".jfold.toml";

// ---------------------------------------------------------------------------
// .jfold.toml config loading
// ---------------------------------------------------------------------------

/// Known keys in `.jfold.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["scan_dirs", "skip_dirs", "extensions"];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn string_list(table: &toml::Table, key: &str) -> Option<Vec<String>> {
    let values = table.get(key)?.as_array()?;
    Some(values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
}

/// Load walk configuration from `.jfold.toml` in the given root.
///
/// Missing or unparsable files fall back to defaults. `skip_dirs` merges with
/// the defaults; `scan_dirs` and `extensions` replace them. Extensions are
/// accepted with or without a leading dot.
pub fn load_jfold_config(root: &Path) -> WalkConfig {
    let mut config = WalkConfig::new(root.to_path_buf());
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return config;
    }

    debug!("Loading {CONFIG_FILE}");
    let table = match std::fs::read_to_string(&config_path).map(|c| c.parse::<toml::Table>()) {
        Ok(Ok(table)) => table,
        Ok(Err(e)) => {
            warn!(error = %e, "Ignoring unparsable {CONFIG_FILE}");
            return config;
        }
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable {CONFIG_FILE}");
            return config;
        }
    };

    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS.iter().min_by_key(|k| edit_distance(key, k));
        match suggestion {
            Some(s) if edit_distance(key, s) <= 3 => {
                warn!(
                    key = key.as_str(),
                    suggestion = *s,
                    "Unknown key in {CONFIG_FILE}, did you mean '{s}'?"
                );
            }
            _ => warn!(
                key = key.as_str(),
                "Unknown key in {CONFIG_FILE} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    if let Some(dirs) = string_list(&table, "scan_dirs") {
        config.scan_dirs = dirs;
    }
    if let Some(dirs) = string_list(&table, "skip_dirs") {
        config.skip_dirs.extend(dirs);
    }
    if let Some(exts) = string_list(&table, "extensions") {
        config.extensions = exts.into_iter().map(|e| e.trim_start_matches('.').to_string()).collect();
    }
    config
}
