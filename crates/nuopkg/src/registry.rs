//! Process-wide package registry.
//!
//! Packages are registered explicitly by the build driver at startup, never
//! as a side effect of module initialization, so construction and teardown
//! stay visible at the call site.

use indexmap::IndexMap;

use crate::package::ClientPackage;
use crate::{PackagingError, Result};

#[derive(Default)]
pub struct PackageRegistry {
    packages: IndexMap<String, ClientPackage>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package under its own name. Duplicate names are an error.
    pub fn register(&mut self, package: ClientPackage) -> Result<()> {
        let name = package.name().to_string();

        if self.packages.contains_key(&name) {
            return Err(PackagingError::Config(format!(
                "package {} is already registered",
                name
            )));
        }

        self.packages.insert(name, package);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClientPackage> {
        self.packages.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClientPackage> {
        self.packages.get_mut(name)
    }

    /// Packages in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClientPackage> {
        self.packages.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientPackage> {
        self.packages.values_mut()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
