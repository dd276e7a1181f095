use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Config, IconTarget};
use crate::conform::{conform_output, Conformance};
use crate::constants::artwork;
use crate::rasterizer::{self, RasterizeError, Rasterizer};

/// Result of processing one target
#[derive(Debug)]
pub enum TargetOutcome {
    /// `rasterizer` produced the icon
    Created {
        rasterizer: String,
        conformance: Conformance,
    },
    /// Every converter failed; `output` was left as it was
    Skipped { attempts: Vec<Attempt> },
}

/// A failed converter attempt, kept for the summary
#[derive(Debug)]
pub struct Attempt {
    pub rasterizer: String,
    pub error: RasterizeError,
}

#[derive(Debug)]
pub struct TargetReport {
    pub target: IconTarget,
    pub output: PathBuf,
    pub outcome: TargetOutcome,
}

#[derive(Debug)]
pub struct GenerationReport {
    pub svg_path: PathBuf,
    pub targets: Vec<TargetReport>,
}

impl GenerationReport {
    pub fn created(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|t| matches!(t.outcome, TargetOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|t| matches!(t.outcome, TargetOutcome::Skipped { .. }))
    }

    pub fn print_summary(&self) {
        let created = self.created().count();
        println!();
        println!("Icon generation complete! ({}/{} sizes)", created, self.targets.len());

        for report in self.skipped() {
            println!(
                "  ⚠️  Skipped {} ({}x{}): no converter succeeded",
                report.target.label, report.target.size, report.target.size
            );
        }

        println!("SVG saved to: {}", self.svg_path.display());
    }
}

/// Writes the artwork once, then rasterizes it for every target in order
pub struct IconGenerator {
    svg: String,
    svg_path: PathBuf,
    res_dir: PathBuf,
    output_file_name: String,
    targets: Vec<IconTarget>,
    rasterizers: Vec<Box<dyn Rasterizer>>,
}

impl IconGenerator {
    /// Built-in artwork with the converters named in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::with_rasterizers(config, rasterizer::from_config(config))
    }

    pub fn with_rasterizers(config: &Config, rasterizers: Vec<Box<dyn Rasterizer>>) -> Self {
        IconGenerator {
            svg: artwork::ICON_SVG.to_string(),
            svg_path: config.svg_path.clone(),
            res_dir: config.res_dir.clone(),
            output_file_name: config.output_file_name.clone(),
            targets: config.targets.clone(),
            rasterizers,
        }
    }

    /// Replace the built-in artwork
    pub fn with_svg(mut self, svg: impl Into<String>) -> Self {
        self.svg = svg.into();
        self
    }

    pub fn svg_path(&self) -> &Path {
        &self.svg_path
    }

    pub fn output_path(&self, target: &IconTarget) -> PathBuf {
        self.res_dir.join(&target.label).join(&self.output_file_name)
    }

    /// Write the vector source verbatim, replacing any earlier copy
    pub fn write_svg(&self) -> Result<()> {
        if let Some(parent) = self.svg_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create SVG directory {}", parent.display())
                })?;
            }
        }

        fs::write(&self.svg_path, self.svg.as_bytes())
            .with_context(|| format!("Failed to write SVG to {}", self.svg_path.display()))?;

        Ok(())
    }

    /// Try each converter in priority order until one produces the icon.
    /// Never fails: a target nobody can render is reported as skipped.
    pub fn generate_target(&self, target: &IconTarget) -> TargetReport {
        let output = self.output_path(target);
        let mut attempts = Vec::new();

        if let Some(dir) = output.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                debug!(label = %target.label, error = %e, "cannot create density directory");
                return TargetReport {
                    target: target.clone(),
                    output,
                    outcome: TargetOutcome::Skipped { attempts },
                };
            }
        }

        // Converters write to a sibling file; only a verified icon replaces `output`
        let staging = staging_path(&output);

        for rasterizer in &self.rasterizers {
            let name = rasterizer.name();
            let _ = fs::remove_file(&staging);

            let result = rasterizer
                .rasterize(&self.svg_path, &staging, target.size)
                .and_then(|()| conform_output(name, &staging, target.size))
                .and_then(|conformance| {
                    fs::rename(&staging, &output)
                        .map(|()| conformance)
                        .map_err(|e| RasterizeError::io(name, e))
                });

            match result {
                Ok(conformance) => {
                    info!(label = %target.label, size = target.size, rasterizer = name, "icon created");
                    return TargetReport {
                        target: target.clone(),
                        output,
                        outcome: TargetOutcome::Created {
                            rasterizer: name.to_string(),
                            conformance,
                        },
                    };
                }
                Err(error) => {
                    let _ = fs::remove_file(&staging);
                    debug!(label = %target.label, rasterizer = name, %error, "converter failed");
                    attempts.push(Attempt {
                        rasterizer: name.to_string(),
                        error,
                    });
                }
            }
        }

        TargetReport {
            target: target.clone(),
            output,
            outcome: TargetOutcome::Skipped { attempts },
        }
    }

    /// Write the SVG, then render every target. Only the SVG write can fail.
    pub fn run(&self) -> Result<GenerationReport> {
        self.write_svg()?;
        println!("SVG icon created");

        let mut targets = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let report = self.generate_target(target);
            if let TargetOutcome::Created { .. } = report.outcome {
                println!(
                    "✓ Created {}/{} ({}x{})",
                    target.label, self.output_file_name, target.size, target.size
                );
            }
            targets.push(report);
        }

        Ok(GenerationReport {
            svg_path: self.svg_path.clone(),
            targets,
        })
    }
}

/// `res/mipmap-mdpi/ic_launcher.png` -> `res/mipmap-mdpi/ic_launcher.part.png`.
/// The extension is kept last because ImageMagick picks the format from it.
pub fn staging_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{}.part.{}", stem, ext.to_string_lossy()),
        None => format!("{}.part", stem),
    };
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_keeps_extension() {
        assert_eq!(
            staging_path(Path::new("res/mipmap-mdpi/ic_launcher.png")),
            PathBuf::from("res/mipmap-mdpi/ic_launcher.part.png")
        );
        assert_eq!(
            staging_path(Path::new("res/icon")),
            PathBuf::from("res/icon.part")
        );
    }
}
