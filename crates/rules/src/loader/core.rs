//! Core [`CatalogLoader`] struct: filesystem-backed rule group loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::schema::{RuleGroup, API_VERSION, TWEAK_GROUP_KIND};

use super::error::{CatalogError, LoadResult, LoadStatus, Result};

/// Filesystem-backed catalog loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files, deserializes
/// each into a [`RuleGroup`], and keeps them keyed by `metadata.id`.
/// Files are visited in path order so duplicate-id resolution is stable:
/// the first file wins and later ones are reported as failed.
pub struct CatalogLoader {
    /// Root directory containing rule group YAML files.
    catalog_dir: PathBuf,
    /// Loaded groups keyed by `metadata.id`.
    groups: HashMap<String, RuleGroup>,
}

impl CatalogLoader {
    /// Create a new loader for the given directory. Nothing is read yet.
    pub fn new(catalog_dir: PathBuf) -> Self {
        Self {
            catalog_dir,
            groups: HashMap::new(),
        }
    }

    /// Recursively scan the catalog directory and load all YAML files.
    ///
    /// Dotfiles (filenames starting with `.`) and non-YAML files are skipped.
    /// Parse errors are reported per-file but do not abort the scan. A
    /// missing catalog directory is an error.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        if !self.catalog_dir.is_dir() {
            return Err(CatalogError::Validation(format!(
                "catalog directory '{}' does not exist",
                self.catalog_dir.display()
            )));
        }
        let mut results = Vec::new();
        let dir = self.catalog_dir.clone();
        self.scan_dir_recursive(&dir, &mut results)?;
        info!(
            path = %self.catalog_dir.display(),
            groups = self.groups.len(),
            "catalog scan complete"
        );
        Ok(results)
    }

    /// Recursively scan a directory for YAML rule group files.
    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let paths = sorted_entry_paths(dir, entries.map(|entry| entry.map(|e| e.path())));

        for path in paths {
            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let loaded = self.load_file(&path).and_then(|group| {
                if self.groups.contains_key(group.id()) {
                    Err(CatalogError::Validation(format!(
                        "duplicate group id '{}'",
                        group.id()
                    )))
                } else {
                    Ok(group)
                }
            });

            match loaded {
                Ok(group) => {
                    let group_id = group.id().to_string();
                    info!(
                        group_id = %group_id,
                        stage = %group.stage,
                        steps = group.steps.len(),
                        path = %path.display(),
                        "loaded rule group"
                    );
                    self.groups.insert(group_id.clone(), group);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { group_id },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule group file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse a single YAML file into a [`RuleGroup`].
    ///
    /// Entry normalization happens during deserialization, so a malformed
    /// step surfaces as a parse error naming the offending field.
    pub fn load_file(&self, path: &Path) -> Result<RuleGroup> {
        let contents = fs::read_to_string(path)?;
        parse_group(&contents)
    }

    /// Get the catalog directory path.
    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    /// Look up a loaded group by id.
    pub fn group(&self, id: &str) -> Option<&RuleGroup> {
        self.groups.get(id)
    }

    /// All loaded groups in execution order: stage, then `order`, then id.
    pub fn groups(&self) -> Vec<RuleGroup> {
        let mut groups: Vec<RuleGroup> = self.groups.values().cloned().collect();
        groups.sort_by(|a, b| {
            (a.stage, a.order, a.id()).cmp(&(b.stage, b.order, b.id()))
        });
        groups
    }
}

/// Collect and sort entry paths. An unreadable entry is logged and skipped.
pub(super) fn sorted_entry_paths(
    dir: &Path,
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory entry");
            }
        }
    }
    paths.sort();
    paths
}

/// Parse and check a rule group document from YAML text.
pub fn parse_group(yaml: &str) -> Result<RuleGroup> {
    let group: RuleGroup = serde_yaml::from_str(yaml)?;

    if group.kind != TWEAK_GROUP_KIND {
        return Err(CatalogError::Validation(format!(
            "unsupported kind '{}' (expected '{}')",
            group.kind, TWEAK_GROUP_KIND
        )));
    }
    if group.api_version != API_VERSION {
        return Err(CatalogError::Validation(format!(
            "unsupported apiVersion '{}' (expected '{}')",
            group.api_version, API_VERSION
        )));
    }
    if group.metadata.id.is_empty() {
        return Err(CatalogError::Validation(
            "group metadata.id must not be empty".to_string(),
        ));
    }
    Ok(group)
}
