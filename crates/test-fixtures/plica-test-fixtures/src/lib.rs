//! Shared JSON fixtures (geometric models and scene scripts) for Plica tests.
//!
//! Fixtures live in the workspace-level `fixtures/` directory and are indexed by
//! `fixtures/manifest.json`. Each scene script fixture names the model it is
//! written against, so tests can load the pair in one call.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    models: HashMap<String, String>,
    scripts: HashMap<String, ScriptEntry>,
}

#[derive(Debug, Deserialize)]
struct ScriptEntry {
    path: String,
    model: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod models {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.models.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.models, "model", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.models, "model", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.models, "model", name)?;
        Ok(resolve_path(rel))
    }
}

pub mod scripts {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.scripts.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        read_to_string(&entry.path)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        super::load_json(&entry.path)
    }

    /// Name of the model fixture the script was written against.
    pub fn model_name(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        Ok(entry.model.clone())
    }

    /// Load a script together with its model.
    pub fn load_with_model<S: DeserializeOwned, M: DeserializeOwned>(name: &str) -> Result<(S, M)> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        let script = super::load_json(&entry.path)?;
        let model = super::models::load(&entry.model)?;
        Ok((script, model))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.scripts, "script", name)?;
        Ok(resolve_path(&entry.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_is_readable_json() {
        for name in models::keys() {
            let value: serde_json::Value = models::load(&name).unwrap();
            assert!(value.get("baseGeometry").is_some(), "model {name}");
        }
        for name in scripts::keys() {
            let value: serde_json::Value = scripts::load(&name).unwrap();
            assert!(value.get("scenes").is_some(), "script {name}");
            assert!(models::keys().contains(&scripts::model_name(&name).unwrap()));
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        assert!(models::json("does-not-exist").is_err());
    }
}
