use anyhow::Result;
use clap::Parser;
use launcher_icon::config::{expand_tilde, Config};
use launcher_icon::constants::artwork;
use launcher_icon::generator::IconGenerator;
use launcher_icon::logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "generate-launcher-icon")]
#[command(about = "Rasterize the launcher icon into every mipmap density", long_about = None)]
struct Cli {
    /// YAML settings file. Without it the built-in densities and converters are used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Android res directory the mipmap-* folders are written into
    #[arg(long)]
    res_dir: Option<PathBuf>,

    /// Where to write the intermediate SVG
    #[arg(long)]
    svg_path: Option<PathBuf>,

    /// Print the embedded SVG to stdout and exit
    #[arg(long)]
    print_svg: bool,

    /// Log every converter attempt
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_svg {
        println!("{}", artwork::ICON_SVG);
        return Ok(());
    }

    logger::init(cli.verbose);

    let config = resolve_config(&cli)?;

    // Converter failures never fail the run; only setup errors reach here
    let report = IconGenerator::from_config(&config).run()?;
    report.print_summary();

    Ok(())
}

/// Settings file first, then command-line overrides on top
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(res_dir) = &cli.res_dir {
        config.res_dir = expand_tilde(res_dir);
    }
    if let Some(svg_path) = &cli.svg_path {
        config.svg_path = expand_tilde(svg_path);
    }
    config.validate()?;
    Ok(config)
}
