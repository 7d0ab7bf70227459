//! XML attribute documentation generator CLI

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use ofi_doc::config::{Defines, GeneratorConfig};
use ofi_doc::Options;

#[derive(Parser)]
#[command(name = "ofi-doc")]
#[command(about = "Generate Doxygen pages for gramods XML attributes", long_about = None)]
#[command(version)]
struct Cli {
    /// The path to the modules folder
    #[arg(long, value_name = "PATH")]
    modules: PathBuf,

    /// The path to the folder to put the generated files in
    #[arg(long, value_name = "PATH")]
    output: PathBuf,

    /// A comma separated list of defines; enables #ifdef tracking
    #[arg(long, value_name = "DEF")]
    defines: Option<String>,

    /// Generator settings (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with template overrides (<name>.hbs)
    #[arg(long, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Check that existing pages are in sync instead of writing them
    #[arg(long)]
    check: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if cli.templates.is_some() {
        config.templates = cli.templates;
    }

    let options = Options {
        modules: cli.modules,
        output: cli.output,
        defines: cli.defines.as_deref().map(Defines::parse),
        config,
    };

    if cli.check {
        println!("Checking XML documentation is in sync...");
        if !ofi_doc::check(&options)? {
            anyhow::bail!("Documentation is out of sync. Run without --check to regenerate.");
        }
        println!("\n✓ All pages are in sync!");
        return Ok(());
    }

    let summary = ofi_doc::generate(&options)?;
    if !summary.failed.is_empty() {
        let modules: Vec<&str> = summary.failed.iter().map(|(m, _)| m.as_str()).collect();
        anyhow::bail!(
            "Failed to document {} module(s): {}",
            modules.len(),
            modules.join(", ")
        );
    }

    Ok(())
}
