//! Application level configuration: where contracts are deployed by default and
//! how often read subscriptions poll.
//!
//! ```json
//! {
//!     "default_addresses": {
//!         "Todos": "0x0000000000000000000000000000000000000000"
//!     },
//!     "watch_interval_ms": 12000
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::executor::{ExecutionContext, DEFAULT_POLL_INTERVAL};
use crate::normalize::{normalize, AbiMap, DefaultAddresses, Exports};
use crate::result::Result;

/// Environment variable overriding [`ContractsConfig::watch_interval_ms`].
pub const WATCH_INTERVAL_ENV: &str = "CONTRACT_HANDLERS_WATCH_INTERVAL_MS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractsConfig {
    #[serde(default)]
    pub default_addresses: DefaultAddresses,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_interval_ms: Option<u64>,
}

impl ContractsConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            ErrorKind::Io.full(format!("failed to open config {}", path.display()), err)
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|err| ErrorKind::DataConversion.custom(err))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| ErrorKind::DataConversion.custom(err))
    }

    /// Polling interval for read subscriptions. `CONTRACT_HANDLERS_WATCH_INTERVAL_MS`
    /// takes precedence over the configured value; without either, the default of
    /// four seconds is used.
    pub fn poll_interval(&self) -> Result<Duration> {
        let interval = match std::env::var(WATCH_INTERVAL_ENV) {
            Ok(val) => val
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|err| ErrorKind::DataConversion.custom(err))?,
            Err(_err) => self
                .watch_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        };

        Ok(interval)
    }

    /// Normalize `exports` with the configured default addresses.
    pub fn normalize(&self, exports: &Exports) -> AbiMap {
        normalize(exports, Some(&self.default_addresses))
    }

    /// Apply the configured polling interval to `ctx`.
    pub fn configure(&self, ctx: ExecutionContext) -> Result<ExecutionContext> {
        Ok(ctx.with_poll_interval(self.poll_interval()?))
    }
}
