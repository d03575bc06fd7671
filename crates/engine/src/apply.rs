//! Store writes for a single [`RuleEntry`].

use std::time::Instant;

use tracing::{debug, warn};

use regtune_rules::schema::RuleEntry;
use regtune_store::{Access, HierarchicalStore, StoreError, StoreKey};

use crate::result::{ChildFailure, ChildSummary, ExecutionResult, FailureKind};

/// Applies entries against a [`HierarchicalStore`].
///
/// Writes are best-effort: a failure part-way through an entry leaves the
/// values written before it in place. Re-applying an entry overwrites the
/// same names with the same values.
pub struct StoreApplyEngine<'s> {
    store: &'s dyn HierarchicalStore,
}

impl<'s> StoreApplyEngine<'s> {
    pub fn new(store: &'s dyn HierarchicalStore) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Apply one entry. Never returns an error; failures are encoded in the result.
    pub fn apply(&self, entry: &RuleEntry) -> ExecutionResult {
        let started = Instant::now();
        let mut result = if entry.is_recursive() {
            self.apply_to_children(entry)
        } else {
            self.apply_direct(entry)
        };
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    fn apply_direct(&self, entry: &RuleEntry) -> ExecutionResult {
        let target = entry.location();
        let description = entry.description();

        let mut key = match self.store.create(entry.root(), entry.path()) {
            Ok(key) => key,
            Err(e) => {
                return ExecutionResult::failed(
                    &target,
                    description,
                    FailureKind::StoreOpenFailed,
                    format!("cannot open {target} for writing: {e}"),
                )
            }
        };

        match write_values(key.as_mut(), entry) {
            Ok(count) => {
                debug!(key = %target, values = count, "values written");
                ExecutionResult::succeeded(target, description)
            }
            Err((name, e)) => ExecutionResult::failed(
                &target,
                description,
                FailureKind::StoreWriteFailed,
                format!("cannot write '{name}' under {target}: {e}"),
            ),
        }
    }

    /// Write the entry's values into every existing direct child of its path.
    ///
    /// The parent must exist; it is opened read-only and never created.
    /// Children that refuse write access are skipped and counted.
    fn apply_to_children(&self, entry: &RuleEntry) -> ExecutionResult {
        let target = entry.location();
        let description = entry.description();

        let parent = match self.store.open(entry.root(), entry.path(), Access::Read) {
            Ok(key) => key,
            Err(e) => {
                return ExecutionResult::failed(
                    &target,
                    description,
                    FailureKind::StoreOpenFailed,
                    format!("cannot open {target} to enumerate children: {e}"),
                )
            }
        };

        let mut summary = ChildSummary::default();
        let mut index = 0;
        loop {
            let name = match parent.child_name(index) {
                Ok(Some(name)) => name,
                Ok(None) => break,
                Err(e) => {
                    warn!(key = %target, index, error = %e, "child enumeration stopped");
                    summary.enumeration_error = Some(e.to_string());
                    break;
                }
            };
            index += 1;

            let child_path = entry.path().child(&name);
            let written = self
                .store
                .open(entry.root(), &child_path, Access::Write)
                .map_err(|e| format!("cannot open for writing: {e}"))
                .and_then(|mut key| {
                    write_values(key.as_mut(), entry)
                        .map_err(|(value, e)| format!("cannot write '{value}': {e}"))
                });

            match written {
                Ok(_) => summary.written += 1,
                Err(reason) => {
                    warn!(key = %target, child = %name, %reason, "child skipped");
                    summary.skipped += 1;
                    summary.failures.push(ChildFailure { child: name, reason });
                }
            }
        }

        debug!(
            key = %target,
            written = summary.written,
            skipped = summary.skipped,
            "child walk complete"
        );
        ExecutionResult::succeeded(target, description).with_children(summary)
    }
}

/// Write every value of `entry` in declaration order. On failure returns the
/// offending value name; earlier writes stay committed.
fn write_values(
    key: &mut (dyn StoreKey + '_),
    entry: &RuleEntry,
) -> Result<usize, (String, StoreError)> {
    for (name, value) in entry.values() {
        key.set_value(name, value).map_err(|e| (name.clone(), e))?;
    }
    Ok(entry.values().len())
}

#[cfg(test)]
mod tests;
