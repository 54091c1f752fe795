use std::{fmt, str::FromStr};

use semver::Version;

use crate::Error;

/// Encoding of the safe transaction hash used by a range of Safe contract releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashLayout {
    /// Before 1.0.0: `dataGas` field, domain without chain id.
    Legacy,
    /// 1.0.0 up to 1.3.0: `baseGas` field, domain without chain id.
    BaseGas,
    /// 1.3.0 and later: `baseGas` field, domain bound to the chain id.
    ChainBound,
}

impl HashLayout {
    pub fn includes_chain_id(&self) -> bool {
        matches!(self, HashLayout::ChainBound)
    }

    /// Name of the refund gas field in the `SafeTx` struct.
    pub fn gas_field(&self) -> &'static str {
        match self {
            HashLayout::Legacy => "dataGas",
            HashLayout::BaseGas | HashLayout::ChainBound => "baseGas",
        }
    }
}

/// Version of a Safe master copy, as reported by `VERSION()` or the client gateway.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SafeVersion(Version);

impl SafeVersion {
    pub const V1_0_0: SafeVersion = SafeVersion(Version::new(1, 0, 0));
    pub const V1_3_0: SafeVersion = SafeVersion(Version::new(1, 3, 0));

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parses versions such as `1.3.0`, `v1.1.1` or `1.3.0+L2`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let trimmed = value.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        Version::parse(trimmed)
            .map(|version| Self(Version::new(version.major, version.minor, version.patch)))
            .map_err(|err| Error::InvalidInput(format!("Invalid Safe version '{value}': {err}")))
    }

    pub fn layout(&self) -> HashLayout {
        if *self < Self::V1_0_0 {
            HashLayout::Legacy
        } else if *self < Self::V1_3_0 {
            HashLayout::BaseGas
        } else {
            HashLayout::ChainBound
        }
    }
}

impl FromStr for SafeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SafeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
