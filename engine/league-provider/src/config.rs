use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ProviderError, Result};

/// Which league data source to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// ESPN fantasy read API
    Espn,
    /// JSON season snapshots on disk
    Snapshot,
}

/// Configuration for the league data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Data source
    pub kind: ProviderKind,

    /// League id on the provider
    pub league_id: u64,

    /// ESPN API base URL
    pub base_url: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Directory holding `<year>.json` season snapshots
    pub snapshot_dir: PathBuf,

    /// Environment variable holding the `espn_s2` cookie
    pub espn_s2_env: String,

    /// Environment variable holding the `SWID` cookie
    pub swid_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Espn,
            league_id: 753911,
            base_url: "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl".to_string(),
            timeout_secs: 30,
            snapshot_dir: PathBuf::from("./snapshots"),
            espn_s2_env: "ESPN_S2".to_string(),
            swid_env: "ESPN_SWID".to_string(),
        }
    }
}

/// Private-league cookies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspnCredentials {
    pub espn_s2: String,
    pub swid: String,
}

impl EspnCredentials {
    /// Cookie header value for authenticated requests
    pub fn cookie_header(&self) -> String {
        format!("espn_s2={}; SWID={}", self.espn_s2, self.swid)
    }
}

impl ProviderConfig {
    /// Read ESPN credentials from the environment.
    ///
    /// Returns `None` for a public league (neither variable set) and an error when only
    /// one of the two cookies is present.
    pub fn credentials(&self) -> Result<Option<EspnCredentials>> {
        let espn_s2 = std::env::var(&self.espn_s2_env).ok().filter(|v| !v.is_empty());
        let swid = std::env::var(&self.swid_env).ok().filter(|v| !v.is_empty());

        match (espn_s2, swid) {
            (None, None) => Ok(None),
            (Some(espn_s2), Some(swid)) => Ok(Some(EspnCredentials { espn_s2, swid })),
            (Some(_), None) => Err(ProviderError::MissingCredentials(self.swid_env.clone())),
            (None, Some(_)) => Err(ProviderError::MissingCredentials(self.espn_s2_env.clone())),
        }
    }

    /// Validate provider settings
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ProviderError::Configuration("timeout_secs must be positive".to_string()));
        }
        if self.kind == ProviderKind::Espn {
            if self.league_id == 0 {
                return Err(ProviderError::Configuration("league_id must be set".to_string()));
            }
            if !self.base_url.starts_with("http") {
                return Err(ProviderError::Configuration(format!(
                    "base_url is not an HTTP URL: {}",
                    self.base_url
                )));
            }
        }
        Ok(())
    }
}
