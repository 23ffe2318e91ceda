//! # Network Identifiers
//!
//! The first four bytes of every frame name the network the message belongs to.
//! Peers on different networks reject each other's frames at header decode.
//!
//! A [`Network`] is a plain `Copy` value. It is chosen once (usually from
//! [`crate::config::WireConfig`]) and passed explicitly into every construct and
//! decode call, so concurrent decoders never share mutable state.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Magic value of the main network.
pub const MAIN_NET_MAGIC: u32 = 0xD9B4BEF9;

/// Magic value of the original test network.
pub const TEST_NET_MAGIC: u32 = 0xDAB5BFFA;

/// Magic value of the third test network.
pub const TEST_NET3_MAGIC: u32 = 0x0709110B;

/// Recognized networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    MainNet,
    TestNet,
    TestNet3,
}

impl Network {
    /// All recognized networks, in wire-constant order.
    pub const ALL: [Network; 3] = [Network::MainNet, Network::TestNet, Network::TestNet3];

    /// The 4-byte identifier written at offset 0 of every header.
    #[inline]
    pub const fn magic(self) -> u32 {
        match self {
            Network::MainNet => MAIN_NET_MAGIC,
            Network::TestNet => TEST_NET_MAGIC,
            Network::TestNet3 => TEST_NET3_MAGIC,
        }
    }

    /// Look up a network by its magic value.
    pub fn from_magic(magic: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.magic() == magic)
    }

    /// Configuration name of this network.
    pub fn name(self) -> &'static str {
        match self {
            Network::MainNet => "mainnet",
            Network::TestNet => "testnet",
            Network::TestNet3 => "testnet3",
        }
    }

    /// Check a decoded magic value against this network.
    pub fn check(self, actual: u32) -> Result<()> {
        if actual == self.magic() {
            Ok(())
        } else {
            Err(ProtocolError::InvalidNetworkIdentifier {
                expected: self.magic(),
                actual,
            })
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for Network {
    type Error = ProtocolError;

    fn try_from(magic: u32) -> Result<Self> {
        Self::from_magic(magic).ok_or(ProtocolError::UnknownNetwork(magic))
    }
}

/// Accepts a network name (`mainnet`, `testnet`, `testnet3`, case-insensitive)
/// or a magic value written in hex (`0xD9B4BEF9`) or decimal.
impl FromStr for Network {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => return Ok(Network::MainNet),
            "testnet" | "test" => return Ok(Network::TestNet),
            "testnet3" => return Ok(Network::TestNet3),
            _ => {}
        }

        let magic = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => trimmed.parse::<u32>(),
        }
        .map_err(|_| ProtocolError::ConfigError(format!("Unknown network: '{trimmed}'")))?;

        Network::try_from(magic)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
