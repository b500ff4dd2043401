//! Supported content languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LokalError;

/// A content language. Hungarian is the fallback for every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Hu,
    En,
    De,
}

impl Lang {
    pub const FALLBACK: Lang = Lang::Hu;
    pub const ALL: [Lang; 3] = [Lang::Hu, Lang::En, Lang::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Hu => "hu",
            Lang::En => "en",
            Lang::De => "de",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hu" => Ok(Lang::Hu),
            "en" => Ok(Lang::En),
            "de" => Ok(Lang::De),
            other => Err(LokalError::validation(format!(
                "unsupported language: {other} (expected hu, en or de)"
            ))),
        }
    }
}
