use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hardware::{GpuVendor, HardwareProfile, StorageMedium};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub hardware: HardwareConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `REGTUNE_PROFILE`. When set (e.g. `LAB`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("REGTUNE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            catalog: CatalogConfig::from_env_profiled(p),
            store: StoreConfig::from_env_profiled(p),
            hardware: HardwareConfig::from_env_profiled(p),
            report: ReportConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  catalog:  dir={}", self.catalog.dir.display());
        tracing::info!("  store:    backend={}, file={}", self.store.backend, self.store.file.display());
        let ram = self.hardware.ram_gib.as_deref().unwrap_or("(none)");
        let profile_file = self
            .hardware
            .profile_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        tracing::info!(
            "  hardware: gpu={}, storage={}, ram_gib={}, profile_file={}",
            self.hardware.gpu_vendor.as_deref().unwrap_or("(none)"),
            self.hardware.storage_medium.as_deref().unwrap_or("(none)"),
            ram,
            profile_file,
        );
        tracing::info!("  report:   audit_max_entries={}", self.report.audit_max_entries);
    }
}

// ── Catalog ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory scanned (recursively) for rule group YAML files.
    pub dir: PathBuf,
}

impl CatalogConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dir: PathBuf::from(profiled_env_or(p, "REGTUNE_CATALOG_DIR", "data/catalog")),
        }
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `registry`, `file` or `memory`.
    pub backend: String,
    /// Backing file for the `file` backend.
    pub file: PathBuf,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "REGTUNE_STORE", default_backend()),
            file: PathBuf::from(profiled_env_or(p, "REGTUNE_STORE_FILE", "data/store.json")),
        }
    }
}

fn default_backend() -> &'static str {
    if cfg!(windows) { "registry" } else { "file" }
}

// ── Hardware ──────────────────────────────────────────────────

/// Hardware classification handed over by an external detector through the
/// environment or a profile file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    pub gpu_vendor: Option<String>,
    pub storage_medium: Option<String>,
    /// Kept as written so a malformed value is reported by `resolve()`.
    pub ram_gib: Option<String>,
    pub profile_file: Option<PathBuf>,
}

impl HardwareConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            gpu_vendor: profiled_env_opt(p, "REGTUNE_GPU_VENDOR"),
            storage_medium: profiled_env_opt(p, "REGTUNE_STORAGE_MEDIUM"),
            ram_gib: profiled_env_opt(p, "REGTUNE_RAM_GIB"),
            profile_file: profiled_env_opt(p, "REGTUNE_HARDWARE_FILE").map(PathBuf::from),
        }
    }

    /// Resolve the profile: the profile file (if any) is the base, individual
    /// fields override it. Missing fields stay unknown.
    pub fn resolve(&self) -> Result<HardwareProfile, CoreError> {
        let mut profile = match &self.profile_file {
            Some(path) => HardwareProfile::from_file(path)?,
            None => HardwareProfile::default(),
        };
        if let Some(vendor) = &self.gpu_vendor {
            profile.gpu_vendor = vendor.parse::<GpuVendor>()?;
        }
        if let Some(medium) = &self.storage_medium {
            profile.storage_medium = medium.parse::<StorageMedium>()?;
        }
        if let Some(ram) = &self.ram_gib {
            profile.ram_gib = ram.trim().parse().map_err(|_| {
                CoreError::InvalidClassification(format!(
                    "invalid RAM size '{}' (expected a whole number of GiB)",
                    ram
                ))
            })?;
        }
        Ok(profile)
    }
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Cap on audit log entries kept for one run (oldest evicted first).
    pub audit_max_entries: usize,
}

impl ReportConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            audit_max_entries: profiled_env_usize(p, "REGTUNE_AUDIT_MAX_ENTRIES", 1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_sources_is_unknown() {
        let hw = HardwareConfig::default();
        assert_eq!(hw.resolve().unwrap(), HardwareProfile::default());
    }

    #[test]
    fn resolve_fields_override_profile_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hw.yml");
        std::fs::write(&path, "gpu_vendor: amd\nstorage_medium: hdd\nram_gib: 8\n").unwrap();

        let hw = HardwareConfig {
            gpu_vendor: Some("nvidia".to_string()),
            storage_medium: None,
            ram_gib: Some("32".to_string()),
            profile_file: Some(path),
        };
        let profile = hw.resolve().unwrap();
        assert_eq!(profile.gpu_vendor, GpuVendor::Nvidia);
        assert_eq!(profile.storage_medium, StorageMedium::Hdd);
        assert_eq!(profile.ram_gib, 32);
    }

    #[test]
    fn resolve_rejects_bad_vendor() {
        let hw = HardwareConfig {
            gpu_vendor: Some("voodoo".to_string()),
            ..Default::default()
        };
        assert!(hw.resolve().is_err());
    }

    #[test]
    fn resolve_rejects_malformed_ram() {
        let hw = HardwareConfig {
            ram_gib: Some("32GB".to_string()),
            ..Default::default()
        };
        let err = hw.resolve().unwrap_err();
        assert!(matches!(err, CoreError::InvalidClassification(_)), "{err}");
        assert!(err.to_string().contains("32GB"));
    }

    #[test]
    fn malformed_ram_from_env_is_not_dropped() {
        std::env::set_var("RAMTEST_REGTUNE_RAM_GIB", "32GB");
        let hw = HardwareConfig::from_env_profiled("RAMTEST");
        std::env::remove_var("RAMTEST_REGTUNE_RAM_GIB");

        assert_eq!(hw.ram_gib.as_deref(), Some("32GB"));
        assert!(hw.resolve().is_err());
    }

    #[test]
    fn default_profile_label() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
    }
}
