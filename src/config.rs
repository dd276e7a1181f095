use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{artwork, converters, density};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_res_dir")]
    pub res_dir: PathBuf,
    #[serde(default = "default_svg_path")]
    pub svg_path: PathBuf,
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,
    #[serde(default = "default_quicklook_timeout")]
    pub quicklook_timeout_secs: u64,
    #[serde(default = "default_rasterizers")]
    pub rasterizers: Vec<String>,
    #[serde(default = "default_targets")]
    pub targets: Vec<IconTarget>,
}

/// One output raster: a density directory and its square edge in pixels
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IconTarget {
    pub label: String,
    pub size: u32,
}

impl IconTarget {
    pub fn new(label: impl Into<String>, size: u32) -> Self {
        IconTarget {
            label: label.into(),
            size,
        }
    }
}

fn default_res_dir() -> PathBuf {
    PathBuf::from(density::DEFAULT_RES_DIR)
}

fn default_svg_path() -> PathBuf {
    std::env::temp_dir().join(artwork::SVG_FILE_NAME)
}

fn default_output_file_name() -> String {
    density::OUTPUT_FILE_NAME.to_string()
}

fn default_quicklook_timeout() -> u64 {
    converters::QUICKLOOK_TIMEOUT_SECS
}

fn default_rasterizers() -> Vec<String> {
    converters::PRIORITY.iter().map(|name| name.to_string()).collect()
}

fn default_targets() -> Vec<IconTarget> {
    density::MIPMAP_TARGETS
        .iter()
        .map(|(label, size)| IconTarget::new(*label, *size))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            res_dir: default_res_dir(),
            svg_path: default_svg_path(),
            output_file_name: default_output_file_name(),
            quicklook_timeout_secs: default_quicklook_timeout(),
            rasterizers: default_rasterizers(),
            targets: default_targets(),
        }
    }
}

impl Config {
    /// Load settings from a YAML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.expand_home();
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(contents)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("targets cannot be empty");
        }

        let mut labels = HashSet::new();
        for target in &self.targets {
            if target.label.is_empty() {
                bail!("target label cannot be empty");
            }
            if target.label.contains('/') || target.label.contains('\\') || target.label == ".." || target.label == "." {
                bail!("target label '{}' must be a single directory name", target.label);
            }
            if target.size == 0 {
                bail!("target '{}' size must be greater than 0", target.label);
            }
            if !labels.insert(target.label.as_str()) {
                bail!("duplicate target label '{}'", target.label);
            }
        }

        if self.rasterizers.is_empty() {
            bail!("rasterizers cannot be empty");
        }
        for name in &self.rasterizers {
            if !converters::PRIORITY.contains(&name.as_str()) {
                bail!(
                    "unknown rasterizer '{}' (expected one of: {})",
                    name,
                    converters::PRIORITY.join(", ")
                );
            }
        }

        if self.quicklook_timeout_secs == 0 {
            bail!("quicklook_timeout_secs must be greater than 0");
        }

        if self.output_file_name.is_empty() {
            bail!("output_file_name cannot be empty");
        }

        Ok(())
    }

    fn expand_home(&mut self) {
        self.res_dir = expand_tilde(&self.res_dir);
        self.svg_path = expand_tilde(&self.svg_path);
    }
}

/// Replace a leading `~` with the user's home directory, if there is one
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.targets.len(), 5);
        assert_eq!(config.targets[0], IconTarget::new("mipmap-mdpi", 48));
        assert_eq!(config.targets[4], IconTarget::new("mipmap-xxxhdpi", 192));
        assert_eq!(config.rasterizers, vec!["rsvg-convert", "convert", "qlmanage"]);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_yaml("res_dir: out/res\n").unwrap();
        assert_eq!(config.res_dir, PathBuf::from("out/res"));
        assert_eq!(config.targets, Config::default().targets);
        assert_eq!(config.quicklook_timeout_secs, 10);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_custom_targets() {
        let yaml = "targets:\n  - label: small\n    size: 16\n  - label: big\n    size: 1024\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.targets,
            vec![IconTarget::new("small", 16), IconTarget::new("big", 1024)]
        );
    }

    #[test]
    fn test_rejects_zero_size() {
        let yaml = "targets:\n  - label: small\n    size: 0\n";
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let yaml = "targets:\n  - label: a\n    size: 16\n  - label: a\n    size: 32\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate target label"));
    }

    #[test]
    fn test_rejects_nested_label() {
        let mut config = Config::default();
        config.targets = vec![IconTarget::new("../escape", 48)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_rasterizer() {
        let err = Config::from_yaml("rasterizers: [inkscape]\n").unwrap_err();
        assert!(format!("{:#}", err).contains("unknown rasterizer 'inkscape'"));
    }

    #[test]
    fn test_rejects_empty_lists_and_zero_timeout() {
        assert!(Config::from_yaml("rasterizers: []\n").is_err());
        assert!(Config::from_yaml("targets: []\n").is_err());
        assert!(Config::from_yaml("quicklook_timeout_secs: 0\n").is_err());
        assert!(Config::from_yaml("output_file_name: ''\n").is_err());
    }

    #[test]
    fn test_yaml_roundtrip_keeps_order() {
        let config = Config::default();
        let reloaded = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde(Path::new("rel/~x")), PathBuf::from("rel/~x"));
    }
}
