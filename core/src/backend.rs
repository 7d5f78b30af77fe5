//! backend.rs
//! Backend ids for the interchangeable implementations of each primitive.
//!
//! Notes:
//! - `Portable` is the from-scratch pure-Rust implementation.
//! - `Native` delegates to the ecosystem crates (`aes`, `sha2`, `flate2`), which pick
//!   hardware paths (AES-NI, SHA-NI) at runtime where available.
//! - The core never chooses a backend on its own; callers pick one at construction.

use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::backend_ids;
use crate::types::PrimitiveError;
use crate::utils::enum_name_or_hex;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Portable = backend_ids::PORTABLE,
    Native   = backend_ids::NATIVE,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Portable, Backend::Native];

    pub fn verify(raw: u16) -> Result<(), PrimitiveError> {
        match raw {
            x if x == Backend::Portable as u16 => Ok(()),
            x if x == Backend::Native as u16   => Ok(()),
            _ => Err(PrimitiveError::UnknownBackend { raw: enum_name_or_hex::<Backend>(raw) }),
        }
    }

    /// Resolve a raw wire id into a backend.
    pub fn from_raw(raw: u16) -> Result<Self, PrimitiveError> {
        Backend::try_from_primitive(raw)
            .map_err(|_| PrimitiveError::UnknownBackend { raw: enum_name_or_hex::<Backend>(raw) })
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Portable => "portable",
            Backend::Native   => "native",
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Native
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portable" | "software" => Ok(Backend::Portable),
            "native" | "accelerated" => Ok(Backend::Native),
            other => Err(PrimitiveError::UnknownBackend { raw: other.to_string() }),
        }
    }
}
