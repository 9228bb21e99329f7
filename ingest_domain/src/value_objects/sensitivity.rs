// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sensitivity classification attached to enriched chunks.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Public,
    Interne,
    Confidentiel,
    Secret,
}

impl Sensitivity {
    pub const ALL: [Sensitivity; 4] = [
        Sensitivity::Public,
        Sensitivity::Interne,
        Sensitivity::Confidentiel,
        Sensitivity::Secret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Public => "public",
            Sensitivity::Interne => "interne",
            Sensitivity::Confidentiel => "confidentiel",
            Sensitivity::Secret => "secret",
        }
    }
}

impl Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Sensitivity::Public),
            "interne" => Ok(Sensitivity::Interne),
            "confidentiel" => Ok(Sensitivity::Confidentiel),
            "secret" => Ok(Sensitivity::Secret),
            other => Err(format!("unknown sensitivity '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_token_case_insensitively() {
        assert_eq!("Secret".parse::<Sensitivity>().unwrap(), Sensitivity::Secret);
        assert!("nope".parse::<Sensitivity>().is_err());
    }
}
