//! Types used in the contract-handlers crate: the interface definition model in
//! [`abi`], and the address, transaction handle and caller identity values that
//! flow between handlers and executors.

pub mod abi;

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, ErrorKind};
use crate::result::Result;

pub use self::abi::{Abi, AbiItem, CallKind, Function, Param, StateMutability};

const ADDRESS_LEN: usize = 20;

/// Address of a deployed contract or of an account: `0x` followed by 20 hex
/// encoded bytes. Checksummed and plain forms of the same address compare equal,
/// and it is always displayed lower-cased.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| {
                ErrorKind::DataConversion.message(format!("address `{value}` is missing 0x prefix"))
            })?;

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|err| {
            ErrorKind::DataConversion.full(format!("invalid address `{value}`"), err)
        })?;

        Ok(Self(bytes))
    }
}

impl TryFrom<&str> for Address {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Opaque identifier of a submitted transaction, as given back by the write
/// executor. Usually the transaction hash.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHandle(String);

impl TxHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

impl From<&str> for TxHandle {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

/// Identity of the caller on whose behalf writes are simulated. The address is
/// only ever used as the `account` of a simulation, and is `None` while no
/// account is connected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CallerIdentity {
    pub address: Option<Address>,
}

impl CallerIdentity {
    pub fn new(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    /// A caller without a connected account.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

impl From<Address> for CallerIdentity {
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_address() {
        let addr: Address = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01".parse().unwrap();
        assert_eq!(addr.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");

        let same: Address = "0xabcdef0123456789abcdef0123456789abcdef01".parse().unwrap();
        assert_eq!(addr, same);
        assert_eq!(addr.as_bytes()[0], 0xab);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "abcdef0123456789abcdef0123456789abcdef01",
            "0x1234",
            "0xzzcdef0123456789abcdef0123456789abcdef01",
            "",
        ] {
            let err = bad.parse::<Address>().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DataConversion, "{bad}");
        }
    }

    #[test]
    fn zero_address_round_trips_through_serde() {
        let zero = Address::zero();
        assert_eq!(zero.to_string(), "0x0000000000000000000000000000000000000000");

        let json = serde_json::to_string(&zero).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zero);
        assert!(serde_json::from_str::<Address>("\"0x01\"").is_err());
    }
}
