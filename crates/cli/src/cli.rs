use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Apply a declarative system-tuning catalog to the registry.
///
/// Hardware classification is supplied through flags, `REGTUNE_*`
/// environment variables or a profile file; it is never detected here.
#[derive(Parser, Debug)]
#[command(name = "regtune", version, about = "Declarative system-tuning catalog runner")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the catalog selected for this machine's hardware profile
    Apply(ApplyArgs),
    /// Show which groups would run for a hardware profile, and why others would not
    Plan(PlanArgs),
    /// Load and validate the catalog
    Validate(CatalogArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Catalog directory (overrides REGTUNE_CATALOG_DIR)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// GPU vendor: nvidia, amd, intel or unknown
    #[arg(long)]
    pub gpu: Option<String>,

    /// Storage medium: ssd, hdd or unknown
    #[arg(long)]
    pub storage: Option<String>,

    /// Installed memory in GiB
    #[arg(long)]
    pub ram_gib: Option<u32>,

    /// TOML or YAML file holding a hardware profile
    #[arg(long)]
    pub profile_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Store backend: registry, file or memory (overrides REGTUNE_STORE)
    #[arg(long)]
    pub store: Option<String>,

    /// Backing file for the file store (overrides REGTUNE_STORE_FILE)
    #[arg(long)]
    pub store_file: Option<PathBuf>,

    /// Write into an in-memory store and record commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Write the JSON run report to this path
    #[arg(long, env = "REGTUNE_REPORT")]
    pub report: Option<PathBuf>,

    /// Exit with status 2 when any step failed
    #[arg(long)]
    pub fail_on_error: bool,
}
