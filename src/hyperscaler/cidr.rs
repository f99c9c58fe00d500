// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IPv4 CIDR arithmetic used for zone subdivision.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::errors::ConversionError;

/// An IPv4 network in CIDR notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv4Cidr {
    address: u32,
    prefix: u8,
}

impl Ipv4Cidr {
    /// Builds a CIDR, rejecting prefixes longer than 32 bits.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidCidr`] if `prefix > 32`.
    pub fn new(address: u32, prefix: u8) -> Result<Self, ConversionError> {
        if prefix > 32 {
            return Err(ConversionError::InvalidCidr {
                cidr: format!("{}/{prefix}", Ipv4Addr::from(address)),
                reason: "prefix length exceeds 32".to_string(),
            });
        }
        Ok(Self { address, prefix })
    }

    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Address with all host bits cleared.
    #[must_use]
    pub fn network(&self) -> u32 {
        self.address & Self::mask(self.prefix)
    }

    /// Number of addresses covered by the network.
    #[must_use]
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        }
    }
}

impl FromStr for Ipv4Cidr {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConversionError::InvalidCidr {
            cidr: s.to_string(),
            reason: reason.to_string(),
        };

        let (address, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| invalid("missing prefix length"))?;
        let address: Ipv4Addr = address
            .parse()
            .map_err(|_| invalid("not an IPv4 address"))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| invalid("prefix length is not a number"))?;
        if prefix > 32 {
            return Err(invalid("prefix length exceeds 32"));
        }

        Ok(Self {
            address: u32::from(address),
            prefix,
        })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.address), self.prefix)
    }
}

#[cfg(test)]
#[path = "cidr_tests.rs"]
mod cidr_tests;
