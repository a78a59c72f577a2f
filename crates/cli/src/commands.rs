use anyhow::{bail, Context as AnyhowContext, Result};
use patchmark_annotation::{write_atomically, DirectiveScanner};
use patchmark_manifest::{
    clean_artifacts, remove_patches_from_listing, InstrumentMode, Manifest, PatchSet,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;

/// Settings and compiled scanner shared by every subcommand
pub struct Context {
    config: HarnessConfig,
    scanner: DirectiveScanner,
}

impl Context {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let scanner =
            DirectiveScanner::new(config.scan.clone()).context("Invalid scan configuration")?;
        Ok(Self { config, scanner })
    }

    fn manifest(&self, root: &Path) -> Result<Manifest> {
        Manifest::build(root, self.config.manifest.clone(), &self.scanner)
            .with_context(|| format!("Failed to build manifest for {}", root.display()))
    }

    fn artifact(&self, root: &Path, out: Option<PathBuf>, name: &str) -> PathBuf {
        out.unwrap_or_else(|| root.join(name))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Branch {
    Patch,
    Vuln,
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn resolve_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("Invalid source root {}", root.display()))
}

pub fn run_manifest(
    ctx: &Context,
    root: &Path,
    out: Option<PathBuf>,
    hunks: bool,
    show: bool,
) -> Result<()> {
    let root = resolve_root(root)?;
    let manifest = ctx.manifest(&root)?;
    let out = ctx.artifact(&root, out, &ctx.config.manifest.artifacts.manifest);

    if hunks {
        manifest.write_with_hunks(&out)?;
    } else {
        manifest.write(&out)?;
    }

    if show {
        let listing = std::fs::read_to_string(&out)
            .with_context(|| format!("Failed to read {}", out.display()))?;
        print_stdout(&listing)
    } else {
        print_stdout(&format!("{}\n", out.display()))
    }
}

pub fn run_branch(
    ctx: &Context,
    branch: Branch,
    root: &Path,
    out: Option<PathBuf>,
    force: bool,
    show: bool,
) -> Result<()> {
    let root = resolve_root(root)?;
    let names = &ctx.config.manifest.artifacts;
    let name = match branch {
        Branch::Patch => &names.patch,
        Branch::Vuln => &names.vuln,
    };
    let out = ctx.artifact(&root, out, name);

    if force || !out.exists() {
        let manifest = ctx.manifest(&root)?;
        let set = match branch {
            Branch::Patch => manifest.get_patches(),
            Branch::Vuln => manifest.get_vulns(),
        };
        set.write_json(&out)?;
        log::info!("Wrote {}", out.display());
    } else {
        log::debug!("Reusing {}", out.display());
    }

    if show {
        let set = PatchSet::read_json(&out)?;
        let rows: String = set
            .rows()
            .into_iter()
            .map(|(file, line, code)| format!("{file} {line} {code}\n"))
            .collect();
        print_stdout(&rows)
    } else {
        print_stdout(&format!("{}\n", out.display()))
    }
}

pub fn run_hunks(ctx: &Context, root: &Path) -> Result<()> {
    let root = resolve_root(root)?;
    print_stdout(&ctx.manifest(&root)?.hunk_listing())
}

pub fn run_stats(ctx: &Context, root: &Path, json: bool) -> Result<()> {
    let root = resolve_root(root)?;
    let stats = ctx.manifest(&root)?.stats();

    if json {
        print_stdout(&format!("{}\n", serde_json::to_string_pretty(&stats)?))
    } else {
        print_stdout(&format!(
            "files: {}\nvuln_files: {}\ntotal_lines: {}\nvuln_lines: {}\npatch_lines: {}\n",
            stats.files, stats.vuln_files, stats.total_lines, stats.vuln_lines, stats.patch_lines
        ))
    }
}

pub fn run_remove_patches(ctx: &Context, root: &Path, from_manifest: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(root)?;

    let rewritten = if let Some(listing) = from_manifest {
        remove_patches_from_listing(&root, &listing, &ctx.scanner)
            .with_context(|| format!("Failed to rewrite files listed in {}", listing.display()))?
    } else {
        let mut manifest = ctx.manifest(&root)?;
        // The listing must be captured before the annotations disappear.
        let listing = root.join(&ctx.config.manifest.artifacts.manifest);
        if !listing.exists() {
            manifest.write(&listing)?;
        }
        manifest.remove_patches()?
    };

    log::info!("Rewrote {rewritten} files under {}", root.display());
    print_stdout(&format!("{rewritten}\n"))
}

pub fn run_fault_loc(
    ctx: &Context,
    root: &Path,
    base: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let root = resolve_root(root)?;
    let manifest = ctx.manifest(&root)?;
    let base = base.unwrap_or_else(|| root.clone());
    let out = ctx.artifact(&root, out, &ctx.config.manifest.artifacts.fault_localization);

    let rows: String = manifest
        .fault_locations(&base)
        .iter()
        .map(|location| format!("{location}\n"))
        .collect();
    write_atomically(&out, &rows)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    print_stdout(&format!("{}\n", out.display()))
}

pub fn run_map_instrumented(
    ctx: &Context,
    root: &Path,
    files: &[PathBuf],
    mode: InstrumentMode,
) -> Result<()> {
    let root = resolve_root(root)?;
    let manifest = ctx.manifest(&root)?;
    let mapping = manifest.map_instrumented_files(files, mode);

    if mapping.is_empty() {
        let names: Vec<_> = files.iter().map(|f| f.display().to_string()).collect();
        bail!(
            "Could not map instrumented files [{}] to annotated sources",
            names.join(", ")
        );
    }

    print_stdout(&format!("{}\n", serde_json::to_string_pretty(&mapping)?))
}

pub fn run_clean(ctx: &Context, root: &Path) -> Result<()> {
    let root = resolve_root(root)?;
    let removed = clean_artifacts(&root, &ctx.config.manifest.artifacts.all())?;

    let lines: String = removed.iter().map(|name| format!("{name}\n")).collect();
    print_stdout(&lines)
}
