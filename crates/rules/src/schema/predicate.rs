//! Hardware inclusion predicates for rule groups.

use serde::{Deserialize, Serialize};

use regtune_core::{GpuVendor, HardwareProfile, StorageMedium};

/// Inclusion predicate evaluated once against the [`HardwareProfile`].
///
/// Every field that is set must match. A field naming `unknown` never
/// matches, so an unclassified machine never selects a conditional group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Predicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_vendor: Option<GpuVendor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_medium: Option<StorageMedium>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_gib: Option<RamCondition>,
}

impl Predicate {
    pub fn gpu(vendor: GpuVendor) -> Self {
        Self {
            gpu_vendor: Some(vendor),
            ..Default::default()
        }
    }

    pub fn storage(medium: StorageMedium) -> Self {
        Self {
            storage_medium: Some(medium),
            ..Default::default()
        }
    }

    pub fn ram(condition: RamCondition) -> Self {
        Self {
            ram_gib: Some(condition),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gpu_vendor.is_none() && self.storage_medium.is_none() && self.ram_gib.is_none()
    }

    pub fn matches(&self, profile: &HardwareProfile) -> bool {
        if let Some(vendor) = self.gpu_vendor {
            if !vendor.is_known() || profile.gpu_vendor != vendor {
                return false;
            }
        }
        if let Some(medium) = self.storage_medium {
            if !medium.is_known() || profile.storage_medium != medium {
                return false;
            }
        }
        if let Some(ram) = &self.ram_gib {
            if !ram.matches(profile.ram_gib) {
                return false;
            }
        }
        true
    }

    /// Short human-readable form, e.g. `gpu_vendor=NVIDIA, ram_gib>16`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(vendor) = self.gpu_vendor {
            parts.push(format!("gpu_vendor={vendor}"));
        }
        if let Some(medium) = self.storage_medium {
            parts.push(format!("storage_medium={medium}"));
        }
        if let Some(ram) = &self.ram_gib {
            parts.extend(ram.describe());
        }
        if parts.is_empty() {
            "always".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Integer comparison conditions on installed memory (GiB).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RamCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<u32>,
}

impl RamCondition {
    /// Check if a value passes all conditions.
    pub fn matches(&self, value: u32) -> bool {
        if let Some(v) = self.gt {
            if value <= v {
                return false;
            }
        }
        if let Some(v) = self.gte {
            if value < v {
                return false;
            }
        }
        if let Some(v) = self.lt {
            if value >= v {
                return false;
            }
        }
        if let Some(v) = self.lte {
            if value > v {
                return false;
            }
        }
        true
    }

    /// Inclusive `(min, max)` range accepted by all bounds together,
    /// `None` when the bounds contradict each other.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let mut min = 0u32;
        let mut max = u32::MAX;
        if let Some(v) = self.gt {
            min = min.max(v.checked_add(1)?);
        }
        if let Some(v) = self.gte {
            min = min.max(v);
        }
        if let Some(v) = self.lt {
            max = max.min(v.checked_sub(1)?);
        }
        if let Some(v) = self.lte {
            max = max.min(v);
        }
        (min <= max).then_some((min, max))
    }

    fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(v) = self.gt {
            parts.push(format!("ram_gib>{v}"));
        }
        if let Some(v) = self.gte {
            parts.push(format!("ram_gib>={v}"));
        }
        if let Some(v) = self.lt {
            parts.push(format!("ram_gib<{v}"));
        }
        if let Some(v) = self.lte {
            parts.push(format!("ram_gib<={v}"));
        }
        parts
    }
}
