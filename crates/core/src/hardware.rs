//! Hardware classification consumed by catalog assembly.
//!
//! The profile is produced by an external detector (or supplied by hand) and
//! is never computed here. Unknown classifications are valid values: they
//! simply select no conditional rule group.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Graphics adapter vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    #[default]
    Unknown,
}

impl GpuVendor {
    /// Vendors that can carry a vendor-specific rule group.
    pub const KNOWN: [GpuVendor; 3] = [GpuVendor::Nvidia, GpuVendor::Amd, GpuVendor::Intel];

    pub fn is_known(&self) -> bool {
        !matches!(self, GpuVendor::Unknown)
    }
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuVendor::Nvidia => write!(f, "NVIDIA"),
            GpuVendor::Amd => write!(f, "AMD"),
            GpuVendor::Intel => write!(f, "Intel"),
            GpuVendor::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for GpuVendor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nvidia" | "geforce" => Ok(GpuVendor::Nvidia),
            "amd" | "radeon" => Ok(GpuVendor::Amd),
            "intel" => Ok(GpuVendor::Intel),
            "unknown" | "" => Ok(GpuVendor::Unknown),
            other => Err(CoreError::InvalidClassification(format!(
                "unknown GPU vendor '{}' (expected nvidia, amd, intel or unknown)",
                other
            ))),
        }
    }
}

/// Primary storage medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMedium {
    Ssd,
    Hdd,
    #[default]
    Unknown,
}

impl StorageMedium {
    pub const KNOWN: [StorageMedium; 2] = [StorageMedium::Ssd, StorageMedium::Hdd];

    pub fn is_known(&self) -> bool {
        !matches!(self, StorageMedium::Unknown)
    }
}

impl fmt::Display for StorageMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMedium::Ssd => write!(f, "SSD"),
            StorageMedium::Hdd => write!(f, "HDD"),
            StorageMedium::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for StorageMedium {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssd" | "nvme" => Ok(StorageMedium::Ssd),
            "hdd" => Ok(StorageMedium::Hdd),
            "unknown" | "" => Ok(StorageMedium::Unknown),
            other => Err(CoreError::InvalidClassification(format!(
                "unknown storage medium '{}' (expected ssd, hdd or unknown)",
                other
            ))),
        }
    }
}

/// Immutable classification of the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareProfile {
    #[serde(default)]
    pub gpu_vendor: GpuVendor,
    #[serde(default)]
    pub storage_medium: StorageMedium,
    /// Total memory in GiB, 0 when the detector could not tell.
    #[serde(default)]
    pub ram_gib: u32,
}

impl HardwareProfile {
    pub fn new(gpu_vendor: GpuVendor, storage_medium: StorageMedium, ram_gib: u32) -> Self {
        Self {
            gpu_vendor,
            storage_medium,
            ram_gib,
        }
    }

    /// Load a profile written by an external detector.
    ///
    /// `.toml` files are parsed as TOML, everything else as YAML (which also
    /// accepts JSON).
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let profile: Self = if is_toml {
            toml::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };
        tracing::debug!(path = %path.display(), ?profile, "loaded hardware profile");
        Ok(profile)
    }
}

impl fmt::Display for HardwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gpu={} storage={} ram={}GiB",
            self.gpu_vendor, self.storage_medium, self.ram_gib
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parse_vendor_aliases() {
        assert_eq!("NVIDIA".parse::<GpuVendor>().unwrap(), GpuVendor::Nvidia);
        assert_eq!("GeForce".parse::<GpuVendor>().unwrap(), GpuVendor::Nvidia);
        assert_eq!("radeon".parse::<GpuVendor>().unwrap(), GpuVendor::Amd);
        assert_eq!(" intel ".parse::<GpuVendor>().unwrap(), GpuVendor::Intel);
        assert_eq!("".parse::<GpuVendor>().unwrap(), GpuVendor::Unknown);
        assert!("matrox".parse::<GpuVendor>().is_err());
    }

    #[test]
    fn parse_storage_medium() {
        assert_eq!("ssd".parse::<StorageMedium>().unwrap(), StorageMedium::Ssd);
        assert_eq!("HDD".parse::<StorageMedium>().unwrap(), StorageMedium::Hdd);
        assert_eq!("unknown".parse::<StorageMedium>().unwrap(), StorageMedium::Unknown);
        assert!("tape".parse::<StorageMedium>().is_err());
    }

    #[test]
    fn default_profile_is_unknown() {
        let profile = HardwareProfile::default();
        assert!(!profile.gpu_vendor.is_known());
        assert!(!profile.storage_medium.is_known());
        assert_eq!(profile.ram_gib, 0);
    }

    #[test]
    fn load_profile_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profile.toml");
        fs::write(
            &path,
            "gpu_vendor = \"amd\"\nstorage_medium = \"hdd\"\nram_gib = 8\n",
        )
        .unwrap();

        let profile = HardwareProfile::from_file(&path).unwrap();
        assert_eq!(profile, HardwareProfile::new(GpuVendor::Amd, StorageMedium::Hdd, 8));
    }

    #[test]
    fn load_profile_from_yaml_with_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profile.yml");
        fs::write(&path, "gpu_vendor: nvidia\n").unwrap();

        let profile = HardwareProfile::from_file(&path).unwrap();
        assert_eq!(profile.gpu_vendor, GpuVendor::Nvidia);
        assert_eq!(profile.storage_medium, StorageMedium::Unknown);
    }

    #[test]
    fn display_profile() {
        let profile = HardwareProfile::new(GpuVendor::Intel, StorageMedium::Ssd, 16);
        assert_eq!(profile.to_string(), "gpu=Intel storage=SSD ram=16GiB");
    }
}
