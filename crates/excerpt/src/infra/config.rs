//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".excerpt/config.toml";

const ENV_LIMIT_PERCENT: &str = "EXCERPT_LIMIT_PERCENT";
const ENV_OUTLINE_WIDTH: &str = "EXCERPT_OUTLINE_WIDTH";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub quota: Quota,
    #[serde(default)]
    pub outline: Outline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    /// Share of a document that may be revealed, in percent.
    #[serde(default = "Quota::default_limit_percent")]
    pub limit_percent: f64,
}

impl Quota {
    fn default_limit_percent() -> f64 {
        crate::app::slice::DEFAULT_LIMIT_PERCENT
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            limit_percent: Self::default_limit_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default = "Outline::default_width")]
    pub width: usize,
    #[serde(default = "Outline::default_background")]
    pub background: String,
    #[serde(default = "Outline::default_excerpt")]
    pub excerpt: String,
    #[serde(default = "Outline::default_quota")]
    pub quota: String,
    #[serde(default = "Outline::default_overlap")]
    pub overlap: String,
    #[serde(default = "Outline::default_exceeded")]
    pub exceeded: String,
}

impl Outline {
    fn default_width() -> usize {
        60
    }

    fn default_background() -> String {
        ".".into()
    }

    fn default_excerpt() -> String {
        "#".into()
    }

    fn default_quota() -> String {
        "q".into()
    }

    fn default_overlap() -> String {
        "*".into()
    }

    fn default_exceeded() -> String {
        "!".into()
    }
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            background: Self::default_background(),
            excerpt: Self::default_excerpt(),
            quota: Self::default_quota(),
            overlap: Self::default_overlap(),
            exceeded: Self::default_exceeded(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    limit_percent: Option<String>,
    outline_width: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            limit_percent: env::var(ENV_LIMIT_PERCENT).ok(),
            outline_width: env::var(ENV_OUTLINE_WIDTH).ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(limit_percent: &str, outline_width: &str) -> Self {
        Self {
            limit_percent: Some(limit_percent.to_owned()),
            outline_width: Some(outline_width.to_owned()),
        }
    }
}

/// One configuration file. Only the keys a file actually sets are `Some`.
#[derive(Debug, Clone, Default, Deserialize)]
struct Layer {
    #[serde(default)]
    quota: QuotaLayer,
    #[serde(default)]
    outline: OutlineLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QuotaLayer {
    #[serde(default)]
    limit_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutlineLayer {
    #[serde(default)]
    width: Option<usize>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    quota: Option<String>,
    #[serde(default)]
    overlap: Option<String>,
    #[serde(default)]
    exceeded: Option<String>,
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Load defaults plus one explicit file, still honoring env overrides. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::from_str(&DEFAULT_CONFIG)?.merge(Self::read_layer(path)?);
        Ok(apply_env_overrides(config, EnvOverrides::from_env()))
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut config = Self::from_str(&DEFAULT_CONFIG)?;

        if let Some(global_path) = global.filter(|path| path.exists()) {
            config = config.merge(Self::read_layer(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            config = config.merge(Self::read_layer(&workspace_path)?);
        }

        Ok(apply_env_overrides(config, env_overrides))
    }

    fn read_layer(path: &Path) -> Result<Layer> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, layer: Layer) -> Self {
        Self {
            quota: merge_quota(self.quota, layer.quota),
            outline: merge_outline(self.outline, layer.outline),
        }
    }
}

fn merge_quota(mut base: Quota, overlay: QuotaLayer) -> Quota {
    if let Some(value) = overlay.limit_percent {
        base.limit_percent = value;
    }
    base
}

fn merge_outline(mut base: Outline, overlay: OutlineLayer) -> Outline {
    if let Some(value) = overlay.width {
        base.width = value;
    }
    if let Some(value) = overlay.background {
        base.background = value;
    }
    if let Some(value) = overlay.excerpt {
        base.excerpt = value;
    }
    if let Some(value) = overlay.quota {
        base.quota = value;
    }
    if let Some(value) = overlay.overlap {
        base.overlap = value;
    }
    if let Some(value) = overlay.exceeded {
        base.exceeded = value;
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("excerpt/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(raw) = env.limit_percent {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => config.quota.limit_percent = value,
            _ => warn!(variable = ENV_LIMIT_PERCENT, value = %raw, "ignoring invalid override"),
        }
    }
    if let Some(raw) = env.outline_width {
        match raw.trim().parse::<usize>() {
            Ok(value) => config.outline.width = value,
            Err(_) => warn!(variable = ENV_OUTLINE_WIDTH, value = %raw, "ignoring invalid override"),
        }
    }
    config
}
