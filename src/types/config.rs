//! Configuration structures.
//!
//! Configuration is resolved from environment variables exactly once, at the
//! entry point, and passed by parameter into every component. No component
//! reads ambient global state after startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::tags::{self, Tag};
use crate::types::{Error, ModuleId, ProcessId, Result};

/// `App-Name` tag value attached to spawns and Eval messages.
pub const DEFAULT_APP_NAME: &str = "Cheese-Mint";

/// Mainnet scheduler unit address.
pub const DEFAULT_SCHEDULER: &str = "_GQ33BkPtZrqxA84vM8Zk-N2aO0toNNu_C-l-rawrBA";

/// Authority granted to push messages into freshly spawned processes.
pub const DEFAULT_AUTHORITY: &str = "fcoN_xJeisVsPXA-trzVAuIiqO3ydLQxM-L4XbrQKzY";

/// aos module the spawned process executes.
pub const DEFAULT_MODULE_ID: &str = "ISShJH1ij-hPPt9St5UFFr_8Ys3Kj5cyg7zrMGt7H9s";

/// Messenger unit accepting signed spawns and messages.
pub const DEFAULT_MU_URL: &str = "https://mu.ao-testnet.xyz";

/// Compute unit serving dry-runs and message results.
pub const DEFAULT_CU_URL: &str = "https://cu.ao-testnet.xyz";

/// Settling delay between the Eval dispatch and the Init dispatch.
pub const DEFAULT_INIT_DELAY_MS: u64 = 30_000;

/// Data payload carried by the spawn item.
pub const DEFAULT_SPAWN_DATA: &str = "Search the Permaweb at wuzzy.arweave.net!";

/// Configuration for the deployment tool.
///
/// Immutable once constructed. Invariant: when `init` is present its payload
/// is non-empty (enforced during resolution, before any network call).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// `Contract-Name` tag value of the spawned process.
    pub process_name: String,

    /// `App-Name` tag value of the spawned process.
    pub app_name: String,

    /// Path to the deployer's JWK wallet file.
    pub key_path: PathBuf,

    /// Scheduler unit the process is assigned to.
    pub scheduler: String,

    /// Authority address allowed to push messages into the process.
    pub authority: String,

    /// aos module the process executes.
    pub module: ModuleId,

    /// Path to the bundled Lua source loaded via `Action=Eval`.
    pub source_path: PathBuf,

    /// Optional one-time initialization pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<InitSettings>,

    /// Messenger unit endpoint.
    pub mu_url: String,

    /// Compute unit endpoint.
    pub cu_url: String,
}

/// Settings for the optional `Action=Init` pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSettings {
    /// Init handler payload, read from `INIT_DATA_PATH` at startup.
    pub data: String,

    /// Settling delay enforced between Eval completion and Init submission.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl DeployConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Empty values count as unset,
    /// matching shell conventions for optional variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let process_name = require(&lookup, "PROCESS_NAME")?;
        let source_path = require(&lookup, "PROCESS_SOURCE_PATH")?;
        let key_path = require(&lookup, "DEPLOYER_PRIVATE_KEY_PATH")?;

        let app_name = get(&lookup, "APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let scheduler =
            get(&lookup, "SCHEDULER").unwrap_or_else(|| DEFAULT_SCHEDULER.to_string());
        let authority =
            get(&lookup, "AUTHORITY").unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());
        let module = get(&lookup, "AOS_MODULE_ID")
            .unwrap_or_else(|| DEFAULT_MODULE_ID.to_string());
        let module = ModuleId::from_string(module).map_err(Error::config)?;

        let init = if get(&lookup, "CALL_INIT_HANDLER").as_deref() == Some("true") {
            let data_path = get(&lookup, "INIT_DATA_PATH").ok_or_else(|| {
                Error::config("CALL_INIT_HANDLER is true but INIT_DATA_PATH is not set")
            })?;
            let data = std::fs::read_to_string(&data_path)?;
            if data.is_empty() {
                return Err(Error::config("INIT_DATA_PATH is set but file is empty"));
            }
            let delay_ms = match get(&lookup, "INIT_DELAY_MS") {
                Some(raw) => raw.parse::<u64>().map_err(|_| {
                    Error::config(format!("INIT_DELAY_MS is not a valid integer: {raw}"))
                })?,
                None => DEFAULT_INIT_DELAY_MS,
            };
            Some(InitSettings {
                data,
                delay: Duration::from_millis(delay_ms),
            })
        } else {
            None
        };

        Ok(Self {
            process_name,
            app_name,
            key_path: PathBuf::from(key_path),
            scheduler,
            authority,
            module,
            source_path: PathBuf::from(source_path),
            init,
            mu_url: get(&lookup, "AO_MU_URL").unwrap_or_else(|| DEFAULT_MU_URL.to_string()),
            cu_url: get(&lookup, "AO_CU_URL").unwrap_or_else(|| DEFAULT_CU_URL.to_string()),
        })
    }
}

/// Configuration for the standalone action-message tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendConfig {
    /// Target process.
    pub process_id: ProcessId,

    /// `Action` tag value.
    pub action: String,

    /// Optional message payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Caller-supplied tags appended after the `Action` tag.
    pub tags: Vec<Tag>,

    /// Read-only dry-run (default) vs signed write.
    pub dry_run: bool,

    /// Wallet file, required when `dry_run` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_path: Option<PathBuf>,

    /// Messenger unit endpoint.
    pub mu_url: String,

    /// Compute unit endpoint.
    pub cu_url: String,
}

impl SendConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let process_id = require(&lookup, "PROCESS_ID")?;
        let process_id = ProcessId::from_string(process_id).map_err(Error::config)?;
        let action = require(&lookup, "ACTION")?;

        // Defaults to true for safety: an explicit "false" is the only way to
        // submit a state-mutating write.
        let dry_run = get(&lookup, "DRY_RUN").as_deref() != Some("false");

        let wallet_path = get(&lookup, "WALLET_PATH").map(PathBuf::from);
        if !dry_run && wallet_path.is_none() {
            return Err(Error::config("WALLET_PATH is required when DRY_RUN=false"));
        }

        let tags = match get(&lookup, "TAGS") {
            Some(raw) => tags::parse_tags(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            process_id,
            action,
            data: get(&lookup, "DATA"),
            tags,
            dry_run,
            wallet_path,
            mu_url: get(&lookup, "AO_MU_URL").unwrap_or_else(|| DEFAULT_MU_URL.to_string()),
            cu_url: get(&lookup, "AO_CU_URL").unwrap_or_else(|| DEFAULT_CU_URL.to_string()),
        })
    }
}

/// Lookup helper: empty values count as unset.
fn get(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.is_empty())
}

/// Lookup helper for required settings.
fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    get(lookup, key).ok_or_else(|| Error::config(format!("{key} is not set")))
}
