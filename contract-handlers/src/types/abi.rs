//! Interface definition (ABI) model. Only the members needed to classify and
//! address functions are modelled in detail; events, errors, constructors, the
//! fallback/receive entries and members of unknown kinds are parsed so that a
//! full interface JSON can be loaded as-is, but they are ignored by the handler
//! compiler.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::ErrorKind;
use crate::result::Result;

/// Mutability classification of a function.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Classify a function of this mutability. `pure` and `view` functions cannot
    /// change remote state and are dispatched as direct reads; everything else has
    /// to go through simulation and submission.
    pub const fn call_kind(self) -> CallKind {
        match self {
            Self::Pure | Self::View => CallKind::Read,
            Self::NonPayable | Self::Payable => CallKind::Write,
        }
    }

    pub const fn is_read_only(self) -> bool {
        matches!(self.call_kind(), CallKind::Read)
    }

    // Interface JSON predating `stateMutability` only carries the `constant` and
    // `payable` flags.
    fn from_legacy(constant: Option<bool>, payable: Option<bool>) -> Self {
        match (constant, payable) {
            (_, Some(true)) => Self::Payable,
            (Some(true), _) => Self::View,
            _ => Self::NonPayable,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        };
        f.write_str(s)
    }
}

/// Invocation strategy a function gets compiled into.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CallKind {
    /// Direct read-only query through the read executor.
    Read,
    /// Simulate-then-submit through the write executor.
    Write,
}

/// A single typed input or output of a function, event or error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Create a tuple parameter out of its components. `suffix` carries any array
    /// dimensions such as `[]` or `[2]`.
    pub fn tuple(name: impl Into<String>, suffix: &str, components: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            kind: format!("tuple{suffix}"),
            components,
            ..Default::default()
        }
    }

    /// The canonical type used in function signatures: tuples are expanded into
    /// their components and the `uint`/`int` aliases are widened to 256 bits.
    pub fn canonical_type(&self) -> String {
        let kind: String = self.kind.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(suffix) = kind.strip_prefix("tuple") {
            let components: Vec<String> =
                self.components.iter().map(Param::canonical_type).collect();
            return format!("({}){suffix}", components.join(","));
        }

        let (base, suffix) = match kind.find('[') {
            Some(start) => kind.split_at(start),
            None => (kind.as_str(), ""),
        };
        match base {
            "uint" => format!("uint256{suffix}"),
            "int" => format!("int256{suffix}"),
            _ => kind.clone(),
        }
    }
}

/// Signature of a callable contract function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    pub fn new(name: impl Into<String>, state_mutability: StateMutability) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            state_mutability,
        }
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = Param>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = Param>) -> Self {
        self.outputs = outputs.into_iter().collect();
        self
    }

    pub fn call_kind(&self) -> CallKind {
        self.state_mutability.call_kind()
    }

    pub fn is_read_only(&self) -> bool {
        self.state_mutability.is_read_only()
    }

    /// Number of declared inputs.
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(Param::canonical_type).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// First four bytes of the keccak-256 hash of the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        let hash = Keccak256::digest(self.signature().as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash[..4]);
        selector
    }

    /// [`Function::selector`] as `0x` prefixed hex.
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AbiError {
    pub name: String,
    pub inputs: Vec<Param>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

/// A declared member of an interface definition. Members of a kind this crate
/// does not know about are kept as [`AbiItem::Other`] and otherwise ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiItem {
    Function(Function),
    Event(Event),
    Error(AbiError),
    Constructor(Constructor),
    Fallback { state_mutability: StateMutability },
    Receive { state_mutability: StateMutability },
    Other { item_type: String },
}

impl AbiItem {
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedAbiItem<'a> {
    #[serde(rename = "type")]
    item_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a [Param]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<&'a [Param]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_mutability: Option<StateMutability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anonymous: Option<bool>,
}

impl<'a> SerializedAbiItem<'a> {
    fn of_type(item_type: &'a str) -> Self {
        Self {
            item_type,
            name: None,
            inputs: None,
            outputs: None,
            state_mutability: None,
            anonymous: None,
        }
    }
}

impl Serialize for AbiItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let item = match self {
            Self::Function(function) => SerializedAbiItem {
                name: Some(function.name.as_str()),
                inputs: Some(function.inputs.as_slice()),
                outputs: Some(function.outputs.as_slice()),
                state_mutability: Some(function.state_mutability),
                ..SerializedAbiItem::of_type("function")
            },
            Self::Event(event) => SerializedAbiItem {
                name: Some(event.name.as_str()),
                inputs: Some(event.inputs.as_slice()),
                anonymous: Some(event.anonymous),
                ..SerializedAbiItem::of_type("event")
            },
            Self::Error(error) => SerializedAbiItem {
                name: Some(error.name.as_str()),
                inputs: Some(error.inputs.as_slice()),
                ..SerializedAbiItem::of_type("error")
            },
            Self::Constructor(constructor) => SerializedAbiItem {
                inputs: Some(constructor.inputs.as_slice()),
                state_mutability: Some(constructor.state_mutability),
                ..SerializedAbiItem::of_type("constructor")
            },
            Self::Fallback { state_mutability } => SerializedAbiItem {
                state_mutability: Some(*state_mutability),
                ..SerializedAbiItem::of_type("fallback")
            },
            Self::Receive { state_mutability } => SerializedAbiItem {
                state_mutability: Some(*state_mutability),
                ..SerializedAbiItem::of_type("receive")
            },
            Self::Other { item_type } => SerializedAbiItem::of_type(item_type),
        };
        item.serialize(serializer)
    }
}

impl From<Function> for AbiItem {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbiItem {
    #[serde(rename = "type", default)]
    item_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<Param>,
    #[serde(default)]
    outputs: Vec<Param>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

impl TryFrom<RawAbiItem> for AbiItem {
    type Error = String;

    fn try_from(raw: RawAbiItem) -> Result<Self, String> {
        let state_mutability = raw
            .state_mutability
            .unwrap_or_else(|| StateMutability::from_legacy(raw.constant, raw.payable));
        let item_type = raw.item_type.as_deref().unwrap_or("function");
        let named = |name: Option<String>| {
            name.filter(|name| !name.trim().is_empty())
                .ok_or_else(|| format!("abi {item_type} entry must include a non-empty name"))
        };

        let item = match item_type {
            "function" => Self::Function(Function {
                name: named(raw.name)?,
                inputs: raw.inputs,
                outputs: raw.outputs,
                state_mutability,
            }),
            "event" => Self::Event(Event {
                name: named(raw.name)?,
                inputs: raw.inputs,
                anonymous: raw.anonymous,
            }),
            "error" => Self::Error(AbiError {
                name: named(raw.name)?,
                inputs: raw.inputs,
            }),
            "constructor" => Self::Constructor(Constructor {
                inputs: raw.inputs,
                state_mutability,
            }),
            "fallback" => Self::Fallback { state_mutability },
            "receive" => Self::Receive { state_mutability },
            other => Self::Other {
                item_type: other.to_string(),
            },
        };
        Ok(item)
    }
}

impl<'de> Deserialize<'de> for AbiItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawAbiItem::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

/// An interface definition: the ordered list of declared members of a contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(Vec<AbiItem>);

impl Abi {
    pub fn new(items: Vec<AbiItem>) -> Self {
        Self(items)
    }

    /// Parse an interface definition from JSON text. Accepts either a bare array of
    /// members, or a compiled artifact object carrying the array under `abi`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ErrorKind::DataConversion.custom(e))?;
        Self::from_value(value)
    }

    /// Same as [`Abi::from_json`], from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let items = match value {
            serde_json::Value::Object(mut artifact) => artifact.remove("abi").ok_or_else(|| {
                ErrorKind::DataConversion
                    .message("abi json must be an array or an object containing an `abi` array")
            })?,
            items => items,
        };
        serde_json::from_value(items).map_err(|e| ErrorKind::DataConversion.custom(e))
    }

    pub fn items(&self) -> &[AbiItem] {
        &self.0
    }

    /// All declared functions, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.0.iter().filter_map(AbiItem::as_function)
    }

    /// The last declared function named `name`.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().filter(|f| f.name == name).last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<AbiItem>> for Abi {
    fn from(items: Vec<AbiItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<AbiItem> for Abi {
    fn from_iter<I: IntoIterator<Item = AbiItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<Function> for Abi {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        Self(iter.into_iter().map(AbiItem::Function).collect())
    }
}
