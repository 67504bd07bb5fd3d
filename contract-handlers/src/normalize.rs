//! Normalization of generated interface-definition exports into an [`AbiMap`].
//!
//! Binding generators emit one factory per contract, exported under the name
//! `<ContractName>__factory` and exposing the contract's `abi`. Everything else
//! they export is of no interest here and is skipped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::ErrorKind;
use crate::result::Result;
use crate::types::{Abi, Address};

/// Marker suffix identifying factory exports.
pub const FACTORY_SUFFIX: &str = "__factory";

/// Default deployment addresses keyed by contract name.
pub type DefaultAddresses = BTreeMap<String, Address>;

/// A generated factory: the only part of it that matters is its interface.
#[derive(Clone, Debug, PartialEq)]
pub struct Factory {
    pub abi: Abi,
}

/// A single exported value of a generated bindings module.
#[derive(Clone, Debug, PartialEq)]
pub enum Export {
    Factory(Factory),
    Other(Value),
}

/// The exports of a generated bindings module, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Exports {
    entries: Vec<(String, Export)>,
    // position of each name in `entries`
    index: HashMap<String, usize>,
}

impl Exports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an export, replacing any previous export of the same name.
    pub fn insert(&mut self, name: impl Into<String>, export: Export) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => self.entries[position].1 = export,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, export));
            }
        }
    }

    /// Builder-style [`Exports::insert`] of a factory exposing `abi`.
    pub fn factory(mut self, name: impl Into<String>, abi: Abi) -> Self {
        self.insert(name, Export::Factory(Factory { abi }));
        self
    }

    /// Builder-style [`Exports::insert`] of an arbitrary non-factory value.
    pub fn other(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, Export::Other(value));
        self
    }

    /// Read exports from a JSON object mapping export names to exported values.
    /// Values exported under a `__factory` name must carry an `abi`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ErrorKind::DataConversion.custom(e))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(ErrorKind::DataConversion
                    .message(format!("exports must be a JSON object, got: {other}")))
            }
        };

        let mut exports = Self::new();
        for (name, value) in entries {
            if !name.ends_with(FACTORY_SUFFIX) {
                exports.insert(name, Export::Other(value));
                continue;
            }

            let abi = match value {
                Value::Object(mut factory) => factory.remove("abi"),
                _ => None,
            }
            .ok_or_else(|| {
                ErrorKind::DataConversion.message(format!("factory export `{name}` has no abi"))
            })?;
            let abi = Abi::from_value(abi)?;
            exports.insert(name, Export::Factory(Factory { abi }));
        }

        Ok(exports)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Export)> {
        self.entries.iter().map(|(name, export)| (name.as_str(), export))
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Export)> for Exports {
    fn from_iter<I: IntoIterator<Item = (S, Export)>>(iter: I) -> Self {
        let mut exports = Self::new();
        for (name, export) in iter {
            exports.insert(name, export);
        }
        exports
    }
}

/// Interface of a single logical contract, with the address it is usually
/// deployed at, if one is known.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractEntry {
    pub abi: Arc<Abi>,
    pub default_address: Option<Address>,
}

impl ContractEntry {
    pub fn new(abi: Abi) -> Self {
        Self {
            abi: Arc::new(abi),
            default_address: None,
        }
    }

    pub fn with_default_address(mut self, address: Address) -> Self {
        self.default_address = Some(address);
        self
    }
}

/// Uniform mapping from contract name to its [`ContractEntry`]. This is what the
/// [compiler](crate::compiler) consumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbiMap(BTreeMap<String, ContractEntry>);

impl AbiMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: ContractEntry) -> Option<ContractEntry> {
        self.0.insert(name.into(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&ContractEntry> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContractEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a AbiMap {
    type Item = (&'a String, &'a ContractEntry);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ContractEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build an [`AbiMap`] out of generated exports. Every `<Name>__factory` export
/// becomes an entry keyed by `<Name>`. A default address is attached to an entry
/// when `defaults` holds one under the same name; defaults naming a contract with
/// no factory are dropped without error, so a set of defaults can outlive the
/// contracts it was written for.
pub fn normalize(exports: &Exports, defaults: Option<&DefaultAddresses>) -> AbiMap {
    let mut map = AbiMap::new();

    for (export_name, export) in exports.iter() {
        let Some(contract_name) = export_name.strip_suffix(FACTORY_SUFFIX) else {
            continue;
        };
        let Export::Factory(factory) = export else {
            continue;
        };

        let mut entry = ContractEntry::new(factory.abi.clone());
        if let Some(address) = defaults.and_then(|defaults| defaults.get(contract_name)) {
            entry = entry.with_default_address(*address);
        }
        map.insert(contract_name, entry);
    }

    if let Some(defaults) = defaults {
        for name in defaults.keys().filter(|name| !map.contains(name)) {
            debug!(target: "contract_handlers", contract = %name, "dropping default address of unknown contract");
        }
    }

    map
}
