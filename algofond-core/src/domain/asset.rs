//! Asset labels carried by ledger entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label of the simulated 3x index certificate.
pub const LEVERAGED_PROXY_LABEL: &str = "BULL OMX X3";

/// What a paper trade was placed on.
///
/// The textual form is what lands in the ledger CSV: the proxy is written as
/// [`LEVERAGED_PROXY_LABEL`], equities as their symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AssetLabel {
    /// Leveraged-index proxy; valued as 3x the underlying index return.
    LeveragedIndex,
    /// A plain equity symbol (e.g. `VOLV-B.ST`).
    Equity(String),
}

impl AssetLabel {
    pub fn equity(symbol: impl Into<String>) -> Self {
        Self::Equity(symbol.into())
    }

    pub fn is_leveraged(&self) -> bool {
        matches!(self, Self::LeveragedIndex)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LeveragedIndex => LEVERAGED_PROXY_LABEL,
            Self::Equity(symbol) => symbol,
        }
    }
}

impl fmt::Display for AssetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AssetLabel {
    fn from(s: String) -> Self {
        if s == LEVERAGED_PROXY_LABEL {
            Self::LeveragedIndex
        } else {
            Self::Equity(s)
        }
    }
}

impl From<AssetLabel> for String {
    fn from(label: AssetLabel) -> Self {
        match label {
            AssetLabel::LeveragedIndex => LEVERAGED_PROXY_LABEL.to_string(),
            AssetLabel::Equity(symbol) => symbol,
        }
    }
}

impl FromStr for AssetLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}
