//! XML attribute documentation generator
//!
//! Scans the C++ modules of a gramods-style source tree for object-factory
//! declarations (`GM_OFI_PARAM`, `GM_OFI_POINTER`, `GM_OFI_DEFINE_SUB`) and
//! writes one Doxygen page per module listing the XML attributes each class
//! accepts.

pub mod conditional;
pub mod config;
pub mod extractor;
pub mod generators;
pub mod locator;
pub mod model;
pub mod registry;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::{Defines, GeneratorConfig};
use crate::extractor::ScanBatch;
use crate::generators::{DoxygenRenderer, RenderedPage};
use crate::locator::{ModuleMatcher, SourceFile, SourceLocator};
use crate::registry::Registry;

/// Inputs of one generator run
#[derive(Debug, Clone)]
pub struct Options {
    /// Root of the modules tree
    pub modules: PathBuf,
    /// Directory receiving the pages
    pub output: PathBuf,
    /// Defined symbols; `None` disables conditional-compilation tracking
    pub defines: Option<Defines>,
    pub config: GeneratorConfig,
}

/// Outcome of [`generate`]
#[derive(Debug, Default)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub pages_written: usize,
    pub attributes: usize,
    /// Modules whose page could not be rendered or written
    pub failed: Vec<(String, anyhow::Error)>,
}

/// Result of scanning a modules tree
#[derive(Debug, Default)]
pub struct ScanResult {
    pub registry: Registry,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

/// Read and scan one file. Unreadable files are logged and skipped.
fn scan_file(file: &SourceFile, defines: Option<&Defines>) -> Option<ScanBatch> {
    let path = file.path();
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let batch = extractor::scan_source(&content, &file.module, defines);
    tracing::debug!(
        module = %file.module,
        attributes = batch.attribute_count(),
        "Scanned {}",
        path.display()
    );
    if batch.unbalanced > 0 || batch.unclosed > 0 {
        tracing::debug!(
            unbalanced = batch.unbalanced,
            unclosed = batch.unclosed,
            "Unbalanced conditional blocks in {}",
            path.display()
        );
    }
    Some(batch)
}

/// Scan every source file below `root` into a registry.
///
/// Files are scanned in parallel but merged in visitation order, so a class
/// declared with different bases keeps the one from the last file visited.
pub fn scan_tree(
    root: &Path,
    config: &GeneratorConfig,
    defines: Option<&Defines>,
) -> Result<ScanResult> {
    match defines {
        Some(defines) if defines.is_empty() => tracing::debug!("Conditional tracking, no defines"),
        Some(defines) => tracing::debug!("Conditional tracking with {} defines", defines.len()),
        None => tracing::debug!("Conditional tracking disabled"),
    }

    let modules = ModuleMatcher::new(&config.module_prefix)?;
    let locator = SourceLocator::new(root, &config.suffixes, &modules)?;
    let files = locator
        .collect()
        .with_context(|| format!("Failed to list sources in {}", root.display()))?;

    let batches: Vec<Option<ScanBatch>> = files
        .par_iter()
        .map(|file| scan_file(file, defines))
        .collect();

    let mut result = ScanResult::default();
    for batch in batches {
        match batch {
            Some(batch) => {
                result.registry.merge(batch);
                result.files_scanned += 1;
            }
            None => result.files_skipped += 1,
        }
    }

    tracing::info!(
        "Scanned {} files ({} skipped), found {} attributes in {} modules",
        result.files_scanned,
        result.files_skipped,
        result.registry.attribute_count(),
        result.registry.modules().len()
    );
    if result.registry.is_empty() {
        tracing::warn!("No object-factory attributes found below {}", root.display());
    }

    Ok(result)
}

/// Path of the page for `module`
pub fn page_path(output: &Path, module: &str, config: &GeneratorConfig) -> PathBuf {
    output.join(format!("{}.{}", module, config.extension))
}

fn renderer(config: &GeneratorConfig) -> Result<DoxygenRenderer<'static>> {
    let modules = ModuleMatcher::new(&config.module_prefix)?;
    DoxygenRenderer::new(config, modules).context("Failed to load page templates")
}

/// Render every module of a registry, in module order.
pub fn render_all(registry: &Registry, config: &GeneratorConfig) -> Result<Vec<RenderedPage>> {
    let renderer = renderer(config)?;
    registry
        .modules()
        .into_iter()
        .map(|module| renderer.render_module(registry, module).map_err(Into::into))
        .collect()
}

/// Scan the tree and write one page per module.
///
/// A page that fails to render or write is recorded in
/// [`Summary::failed`]; the remaining modules are still written.
pub fn generate(options: &Options) -> Result<Summary> {
    let config = &options.config;
    let scan = scan_tree(&options.modules, config, options.defines.as_ref())?;
    let renderer = renderer(config)?;

    std::fs::create_dir_all(&options.output)
        .with_context(|| format!("Failed to create {}", options.output.display()))?;

    let mut summary = Summary {
        files_scanned: scan.files_scanned,
        files_skipped: scan.files_skipped,
        ..Default::default()
    };

    for module in scan.registry.modules() {
        println!("Creating documentation for {}", module);

        let path = page_path(&options.output, module, config);
        let written = renderer
            .render_module(&scan.registry, module)
            .map_err(anyhow::Error::from)
            .and_then(|page| {
                std::fs::write(&path, &page.contents)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Ok(page)
            });

        match written {
            Ok(page) => {
                println!("Documented {} attributes", page.attribute_count);
                summary.pages_written += 1;
                summary.attributes += page.attribute_count;
            }
            Err(e) => {
                tracing::warn!("No documentation for {}: {:#}", module, e);
                summary.failed.push((module.to_string(), e));
            }
        }
    }

    Ok(summary)
}

/// Check that the pages in the output directory match a fresh render.
///
/// Returns `false` when any page is missing or differs. Pages on disk for
/// modules that no longer exist are reported but do not fail the check.
pub fn check(options: &Options) -> Result<bool> {
    let config = &options.config;
    let scan = scan_tree(&options.modules, config, options.defines.as_ref())?;
    let pages = render_all(&scan.registry, config)?;

    let mut in_sync = true;
    for page in &pages {
        let path = page_path(&options.output, &page.module, config);
        match std::fs::read_to_string(&path) {
            Ok(existing) if existing == page.contents => {
                println!("✓ {} in sync: {}", page.module, path.display());
            }
            Ok(_) => {
                println!("✗ {} out of sync: {}", page.module, path.display());
                in_sync = false;
            }
            Err(e) => {
                println!("✗ {} missing: {} ({})", page.module, path.display(), e);
                in_sync = false;
            }
        }
    }

    for stale in stale_pages(&options.output, &pages, config)? {
        tracing::warn!("Page without module: {}", stale.display());
    }

    Ok(in_sync)
}

/// Pages in `output` with the page extension that no module produced
fn stale_pages(
    output: &Path,
    pages: &[RenderedPage],
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>> {
    if !output.is_dir() {
        return Ok(Vec::new());
    }

    let suffix = format!(".{}", config.extension);
    let mut stale = Vec::new();
    for entry in std::fs::read_dir(output)
        .with_context(|| format!("Failed to read directory {}", output.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(module) = name.strip_suffix(&suffix) else {
            continue;
        };
        if !pages.iter().any(|page| page.module == module) {
            stale.push(entry.path());
        }
    }
    stale.sort();
    Ok(stale)
}
