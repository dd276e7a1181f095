use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::constants::converters;

/// Why a single converter attempt did not produce an icon.
/// The generator treats every variant the same way: move on to the next converter.
#[derive(Error, Debug)]
pub enum RasterizeError {
    #[error("{tool} is not installed")]
    NotFound { tool: String },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} did not finish within {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} reported success but wrote nothing to {}", .path.display())]
    MissingOutput { tool: String, path: PathBuf },

    #[error("{tool} produced an unreadable image: {source}")]
    BadOutput {
        tool: String,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

impl RasterizeError {
    pub fn io(tool: &str, source: io::Error) -> Self {
        RasterizeError::Io {
            tool: tool.to_string(),
            source,
        }
    }
}

/// Turns an SVG file into a square PNG of `size` pixels at `output`
pub trait Rasterizer {
    fn name(&self) -> &str;

    fn rasterize(&self, svg: &Path, output: &Path, size: u32) -> Result<(), RasterizeError>;
}

/// librsvg's command line tool. Best quality, exact output size.
pub struct RsvgConvert {
    program: OsString,
}

impl RsvgConvert {
    pub fn new() -> Self {
        Self::with_program(converters::RSVG_CONVERT)
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        RsvgConvert { program: program.into() }
    }

    pub fn command(&self, svg: &Path, output: &Path, size: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-w")
            .arg(size.to_string())
            .arg("-h")
            .arg(size.to_string())
            .arg(svg)
            .arg("-o")
            .arg(output);
        cmd
    }
}

impl Default for RsvgConvert {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for RsvgConvert {
    fn name(&self) -> &str {
        converters::RSVG_CONVERT
    }

    fn rasterize(&self, svg: &Path, output: &Path, size: u32) -> Result<(), RasterizeError> {
        run_to_completion(self.name(), self.command(svg, output, size))
    }
}

/// ImageMagick's `convert`, keeping the rounded corners transparent
pub struct ImageMagick {
    program: OsString,
}

impl ImageMagick {
    pub fn new() -> Self {
        Self::with_program(converters::IMAGEMAGICK)
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        ImageMagick { program: program.into() }
    }

    pub fn command(&self, svg: &Path, output: &Path, size: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-background")
            .arg("none")
            .arg("-resize")
            .arg(format!("{}x{}", size, size))
            .arg(svg)
            .arg(output);
        cmd
    }
}

impl Default for ImageMagick {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ImageMagick {
    fn name(&self) -> &str {
        converters::IMAGEMAGICK
    }

    fn rasterize(&self, svg: &Path, output: &Path, size: u32) -> Result<(), RasterizeError> {
        run_to_completion(self.name(), self.command(svg, output, size))
    }
}

/// macOS Quick Look thumbnailer.
///
/// `qlmanage -t` cannot be told where to write; it drops `<svg file name>.png`
/// next to the SVG, which is then moved into place. It is the only converter
/// whose wait is bounded.
pub struct QuickLook {
    program: OsString,
    timeout: Duration,
}

impl QuickLook {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program(converters::QUICKLOOK, timeout)
    }

    pub fn with_program(program: impl Into<OsString>, timeout: Duration) -> Self {
        QuickLook {
            program: program.into(),
            timeout,
        }
    }

    pub fn command(&self, svg: &Path, size: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-t")
            .arg("-s")
            .arg(size.to_string())
            .arg("-o")
            .arg(Self::product_dir(svg))
            .arg(svg);
        cmd
    }

    /// Directory Quick Look is told to write its thumbnail into
    pub fn product_dir(svg: &Path) -> PathBuf {
        match svg.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Where the thumbnail for `svg` appears, e.g. `/tmp/icon.svg.png`
    pub fn product_path(svg: &Path) -> PathBuf {
        let mut file_name = svg
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".png");
        Self::product_dir(svg).join(file_name)
    }
}

impl Rasterizer for QuickLook {
    fn name(&self) -> &str {
        converters::QUICKLOOK
    }

    fn rasterize(&self, svg: &Path, output: &Path, size: u32) -> Result<(), RasterizeError> {
        let product = Self::product_path(svg);

        // A thumbnail left behind by an earlier run must not pass as this run's
        if product.exists() {
            fs::remove_file(&product).map_err(|e| RasterizeError::io(self.name(), e))?;
        }

        run_with_timeout(self.name(), self.command(svg, size), self.timeout)?;

        if !product.exists() {
            return Err(RasterizeError::MissingOutput {
                tool: self.name().to_string(),
                path: product,
            });
        }

        move_file(&product, output).map_err(|e| RasterizeError::io(self.name(), e))
    }
}

/// Build the converter chain named in the config, in config order
pub fn from_config(config: &Config) -> Vec<Box<dyn Rasterizer>> {
    let timeout = Duration::from_secs(config.quicklook_timeout_secs);
    config
        .rasterizers
        .iter()
        .filter_map(|name| by_name(name, timeout))
        .collect()
}

pub fn by_name(name: &str, quicklook_timeout: Duration) -> Option<Box<dyn Rasterizer>> {
    match name {
        converters::RSVG_CONVERT => Some(Box::new(RsvgConvert::new())),
        converters::IMAGEMAGICK => Some(Box::new(ImageMagick::new())),
        converters::QUICKLOOK => Some(Box::new(QuickLook::new(quicklook_timeout))),
        _ => None,
    }
}

/// Run a converter and wait for it however long it takes
pub fn run_to_completion(tool: &str, mut cmd: Command) -> Result<(), RasterizeError> {
    debug!(tool, command = ?cmd, "running converter");

    let output = cmd.stdin(Stdio::null()).output().map_err(|e| spawn_error(tool, e))?;

    if !output.status.success() {
        return Err(RasterizeError::Failed {
            tool: tool.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Run a converter, killing it once `timeout` has elapsed.
/// Output is discarded so a chatty child cannot stall on a full pipe.
pub fn run_with_timeout(tool: &str, mut cmd: Command, timeout: Duration) -> Result<(), RasterizeError> {
    debug!(tool, command = ?cmd, ?timeout, "running converter with timeout");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| spawn_error(tool, e))?;

    let poll = Duration::from_millis(converters::POLL_INTERVAL_MS);
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RasterizeError::TimedOut {
                    tool: tool.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(poll),
            Err(e) => {
                let _ = child.kill();
                return Err(RasterizeError::io(tool, e));
            }
        }
    };

    if !status.success() {
        return Err(RasterizeError::Failed {
            tool: tool.to_string(),
            status,
            stderr: String::new(),
        });
    }

    Ok(())
}

fn spawn_error(tool: &str, e: io::Error) -> RasterizeError {
    if e.kind() == io::ErrorKind::NotFound {
        RasterizeError::NotFound { tool: tool.to_string() }
    } else {
        RasterizeError::io(tool, e)
    }
}

/// Rename, falling back to copy + delete when crossing filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
