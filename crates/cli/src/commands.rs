//! Subcommand handlers.

use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use regtune_core::{Config, HardwareProfile};
use regtune_engine::{ApplicationRunner, DryRunChannel, ProcessChannel, RunSummary, SystemProcess};
use regtune_rules::catalog::{Catalog, RuleCatalogBuilder};
use regtune_rules::loader::CatalogLoader;
use regtune_rules::schema::RuleGroup;
use regtune_rules::validation::validate_catalog;
use regtune_store::{open_backend, BackendKind};

use crate::cli::{ApplyArgs, CatalogArgs, ProfileArgs};
use crate::terminal::{Terminal, TerminalObserver};

/// Exit status when `--fail-on-error` is set and a step failed.
const STEP_FAILURE_STATUS: u8 = 2;

pub fn apply_catalog_overrides(config: &mut Config, args: &CatalogArgs) {
    if let Some(dir) = &args.catalog {
        config.catalog.dir = dir.clone();
    }
}

pub fn apply_profile_overrides(config: &mut Config, args: &ProfileArgs) {
    if let Some(gpu) = &args.gpu {
        config.hardware.gpu_vendor = Some(gpu.clone());
    }
    if let Some(storage) = &args.storage {
        config.hardware.storage_medium = Some(storage.clone());
    }
    if let Some(ram) = args.ram_gib {
        config.hardware.ram_gib = Some(ram.to_string());
    }
    if let Some(file) = &args.profile_file {
        config.hardware.profile_file = Some(file.clone());
    }
}

/// Load and validate the catalog. Any unreadable file or validation error
/// stops here, before anything is applied.
fn load_groups(config: &Config, terminal: &Terminal) -> Result<Vec<RuleGroup>> {
    let mut loader = CatalogLoader::new(config.catalog.dir.clone());
    let results = loader
        .load_all()
        .with_context(|| format!("failed to load catalog from {}", config.catalog.dir.display()))?;

    let failed = terminal.print_load_failures(&results)?;
    if failed > 0 {
        bail!("{failed} catalog file(s) failed to load");
    }

    let groups = loader.groups();
    let validation = validate_catalog(&groups);
    terminal.print_validation(&validation)?;
    if !validation.valid {
        bail!("catalog has {} validation error(s)", validation.errors.len());
    }
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(groups)
}

fn resolve_catalog(config: &Config, terminal: &Terminal) -> Result<(HardwareProfile, Catalog)> {
    let groups = load_groups(config, terminal)?;
    let profile = config
        .hardware
        .resolve()
        .context("failed to resolve hardware profile")?;
    let catalog = RuleCatalogBuilder::new(groups).build(&profile);
    info!(
        %profile,
        selected = catalog.groups.len(),
        excluded = catalog.excluded.len(),
        "catalog assembled"
    );
    Ok((profile, catalog))
}

pub fn validate(config: &Config, terminal: &Terminal) -> Result<ExitCode> {
    let groups = load_groups(config, terminal)?;
    let steps: usize = groups.iter().map(|g| g.steps.len()).sum();
    terminal.print_info(&format!(
        "{} groups, {} steps in {}: catalog is valid",
        groups.len(),
        steps,
        config.catalog.dir.display()
    ))?;
    Ok(ExitCode::SUCCESS)
}

pub fn plan(config: &Config, terminal: &Terminal) -> Result<ExitCode> {
    let (_, catalog) = resolve_catalog(config, terminal)?;
    terminal.print_plan(&catalog)?;
    Ok(ExitCode::SUCCESS)
}

pub fn apply(config: &Config, args: &ApplyArgs, terminal: &Terminal) -> Result<ExitCode> {
    let (profile, catalog) = resolve_catalog(config, terminal)?;

    let kind: BackendKind = if args.dry_run {
        BackendKind::Memory
    } else {
        config.store.backend.parse()?
    };
    let store = open_backend(kind, &config.store.file)
        .with_context(|| format!("failed to open {kind} store"))?;

    let system = SystemProcess;
    let dry_run = DryRunChannel::new();
    let channel: &dyn ProcessChannel = if args.dry_run { &dry_run } else { &system };

    terminal.print_banner(&profile, store.name(), args.dry_run)?;

    let mut observer = TerminalObserver::new(terminal);
    let mut runner = ApplicationRunner::new(store.as_ref(), channel)
        .with_audit_capacity(config.report.audit_max_entries);
    let report = runner.run_catalog(&catalog, &mut observer);

    store.flush().context("failed to persist store")?;

    if let Some(path) = &args.report {
        let json = report.to_json_pretty()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    terminal.print_summary(&report)?;
    if args.dry_run {
        terminal.print_info(&format!(
            "dry run: {} command(s) recorded, nothing was executed",
            dry_run.submitted().len()
        ))?;
    }

    Ok(ExitCode::from(exit_status(&report.summary(), args.fail_on_error)))
}

fn exit_status(summary: &RunSummary, fail_on_error: bool) -> u8 {
    if fail_on_error && summary.failed > 0 {
        STEP_FAILURE_STATUS
    } else {
        0
    }
}
