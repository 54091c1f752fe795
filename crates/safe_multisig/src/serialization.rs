//! Serialization helpers for client gateway payloads.

use serde::Deserialize;

/// Numbers the gateway sends either as JSON numbers or as (decimal or 0x-hex) strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

/// [alloy_primitives::U256] as a decimal string, accepting numbers and strings.
pub mod decimal_u256 {
    use std::str::FromStr;

    use alloy_primitives::U256;
    use serde::{
        de::{self, Deserializer},
        ser::Serializer,
        Deserialize as _,
    };

    use super::NumberOrString;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(U256::from(n)),
            NumberOrString::String(s) => U256::from_str(s.trim()).map_err(de::Error::custom),
        }
    }
}

/// `u64` accepting numbers and strings.
pub mod decimal_u64 {
    use serde::{
        de::{self, Deserializer},
        ser::Serializer,
        Deserialize as _,
    };

    use super::NumberOrString;

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}

/// The gateway wraps addresses as `{ "value": "0x..", "name": .. }`.
pub mod address_info {
    use alloy_primitives::Address;
    use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    pub(super) struct AddressInfo {
        pub(super) value: Address,
    }

    pub fn serialize<S>(address: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AddressInfo { value: *address }.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(AddressInfo::deserialize(deserializer)?.value)
    }
}

/// Optional [address_info], `null` and missing map to `None`.
pub mod option_address_info {
    use alloy_primitives::Address;
    use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};

    use super::address_info::AddressInfo;

    pub fn serialize<S>(address: &Option<Address>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        address.map(|value| AddressInfo { value }).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<AddressInfo>::deserialize(deserializer)?.map(|info| info.value))
    }
}

/// A list of [address_info], `null` maps to an empty list.
pub mod address_info_list {
    use alloy_primitives::Address;
    use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};

    use super::address_info::AddressInfo;

    pub fn serialize<S>(addresses: &[Address], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        addresses
            .iter()
            .map(|value| AddressInfo { value: *value })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Address>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let infos = Option::<Vec<AddressInfo>>::deserialize(deserializer)?;
        Ok(infos.unwrap_or_default().into_iter().map(|info| info.value).collect())
    }
}

/// Confirmations, keeping the first confirmation of each signer.
pub mod unique_confirmations {
    use std::collections::HashSet;

    use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};
    use tracing::warn;

    use crate::details::Confirmation;

    pub fn serialize<S>(confirmations: &[Confirmation], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        confirmations.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Confirmation>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let confirmations = Option::<Vec<Confirmation>>::deserialize(deserializer)?;

        let mut seen = HashSet::new();
        Ok(confirmations
            .unwrap_or_default()
            .into_iter()
            .filter(|confirmation| {
                let first = seen.insert(confirmation.signer);
                if !first {
                    warn!(signer = %confirmation.signer, "dropping duplicate confirmation");
                }
                first
            })
            .collect())
    }
}
