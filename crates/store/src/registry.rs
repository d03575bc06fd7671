//! Windows registry backend.

use tracing::debug;
use winreg::enums::{
    RegDisposition, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE,
};
use winreg::RegKey;

use regtune_rules::schema::{KeyPath, RegValue, StoreRoot};

use crate::error::StoreError;
use crate::store::{Access, HierarchicalStore, StoreKey};

#[derive(Debug, Default)]
pub struct RegistryStore;

impl RegistryStore {
    pub fn new() -> Self {
        Self
    }

    fn predef(root: StoreRoot) -> RegKey {
        match root {
            StoreRoot::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
            StoreRoot::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        }
    }
}

impl HierarchicalStore for RegistryStore {
    fn open(
        &self,
        root: StoreRoot,
        path: &KeyPath,
        access: Access,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        let location = format!("{root}\\{path}");
        let flags = match access {
            Access::Read => KEY_READ,
            Access::Write => KEY_SET_VALUE,
        };
        let key = Self::predef(root)
            .open_subkey_with_flags(path.to_string(), flags)
            .map_err(|e| StoreError::from_io(e, &location))?;
        Ok(Box::new(RegistryKey { key, location }))
    }

    fn create(
        &self,
        root: StoreRoot,
        path: &KeyPath,
    ) -> Result<Box<dyn StoreKey + '_>, StoreError> {
        let location = format!("{root}\\{path}");
        let (key, disposition) = Self::predef(root)
            .create_subkey_with_flags(path.to_string(), KEY_SET_VALUE)
            .map_err(|e| StoreError::from_io(e, &location))?;
        let created = matches!(disposition, RegDisposition::REG_CREATED_NEW_KEY);
        debug!(key = %location, created, "registry key opened for write");
        Ok(Box::new(RegistryKey { key, location }))
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}

/// Open registry handle; `RegKey` closes itself on drop.
struct RegistryKey {
    key: RegKey,
    location: String,
}

impl StoreKey for RegistryKey {
    fn set_value(&mut self, name: &str, value: &RegValue) -> Result<(), StoreError> {
        let result = match value {
            RegValue::Integer32(n) => self.key.set_value(name, n),
            RegValue::String(s) => self.key.set_value(name, s),
        };
        result.map_err(|e| StoreError::from_io(e, &format!("{}\\{}", self.location, name)))
    }

    fn child_name(&self, index: usize) -> Result<Option<String>, StoreError> {
        match self.key.enum_keys().nth(index) {
            None => Ok(None),
            Some(Ok(name)) => Ok(Some(name)),
            Some(Err(e)) => Err(StoreError::from_io(e, &self.location)),
        }
    }
}
