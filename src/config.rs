use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Category subdirectories under `data/`.
pub const CATEGORY_DIRS: &[&str] = &["product", "competitor", "customer", "catalog"];

/// Task subdirectories under `output/`.
pub const TASK_DIRS: &[&str] = &[
    "extracted",
    "analysis",
    "pitches",
    "presentations",
    "recommendations",
    "emails",
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub vault: VaultConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl WorkspaceConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn category_dir(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    pub fn encrypted_dir(&self) -> PathBuf {
        self.data_dir().join("encrypted")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn task_dir(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Create the full workspace layout. Idempotent.
    pub fn ensure_layout(&self) -> Result<()> {
        let mut dirs = vec![self.data_dir(), self.encrypted_dir(), self.output_dir()];
        for cat in CATEGORY_DIRS {
            dirs.push(self.category_dir(cat));
        }
        for task in TASK_DIRS {
            dirs.push(self.task_dir(task));
        }
        for dir in dirs {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.xlsx".to_string(),
        "**/*.xls".to_string(),
        "**/*.docx".to_string(),
        "**/*.doc".to_string(),
        "**/*.pptx".to_string(),
        "**/*.ppt".to_string(),
        "**/*.pdf".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u32 {
    600_000
}

impl Config {
    /// A default config for commands that can run without a config file.
    pub fn minimal() -> Self {
        Config::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ai.max_tokens == 0 {
        anyhow::bail!("ai.max_tokens must be > 0");
    }

    if config.ai.timeout_secs == 0 {
        anyhow::bail!("ai.timeout_secs must be > 0");
    }

    if config.ai.model.trim().is_empty() {
        anyhow::bail!("ai.model must not be empty");
    }

    if config.vault.iterations < 1000 {
        anyhow::bail!("vault.iterations must be >= 1000");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitchdesk.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let (_dir, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.ai.model, "claude-sonnet-4-5");
        assert_eq!(cfg.ai.max_tokens, 4096);
        assert_eq!(cfg.vault.iterations, 600_000);
        assert!(!cfg.scan.include_globs.is_empty());
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let (_dir, path) = write_config("[ai]\nmax_tokens = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn weak_vault_iterations_rejected() {
        let (_dir, path) = write_config("[vault]\niterations = 10\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn ensure_layout_creates_all_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspaceConfig {
            root: dir.path().to_path_buf(),
        };
        ws.ensure_layout().unwrap();
        for cat in CATEGORY_DIRS {
            assert!(ws.category_dir(cat).is_dir());
        }
        for task in TASK_DIRS {
            assert!(ws.task_dir(task).is_dir());
        }
        // Second run is a no-op.
        ws.ensure_layout().unwrap();
    }
}
