// src/config/subsystems/aligner.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

/// Text reported as `actual` when nothing of a missing unit was read.
pub const DEFAULT_NOT_READ_MARKER: &str = "未读";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMatchStrategy {
    /// Substring containment against the current sentence.
    Containment,
    /// Character offsets of the units, with containment as fallback.
    Offset,
}

impl UnitMatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMatchStrategy::Containment => "containment",
            UnitMatchStrategy::Offset => "offset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim_matches('"').to_lowercase().as_str() {
            "containment" => Some(Self::Containment),
            "offset" => Some(Self::Offset),
            _ => None,
        }
    }
}

impl Default for UnitMatchStrategy {
    fn default() -> Self {
        Self::Containment
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    pub unit_match: UnitMatchStrategy,
    pub not_read_marker: String,
    /// Requests with more tokens than this on either side are rejected.
    pub max_tokens: usize,
    // Debug a single token through alignment
    pub traced_token: String,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            unit_match: UnitMatchStrategy::default(),
            not_read_marker: DEFAULT_NOT_READ_MARKER.to_string(),
            max_tokens: 5000,
            traced_token: String::new(),
        }
    }
}

impl FromIni for AlignerConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "aligner" {
            return None;
        }

        match key {
            "unit_match" => {
                self.unit_match = match UnitMatchStrategy::from_str(value) {
                    Some(strategy) => strategy,
                    None => return Some(Err(Error::Config(
                        format!("Invalid unit_match (must be containment or offset): {}", value)
                    ))),
                };
                Some(Ok(()))
            },
            "not_read_marker" => {
                self.not_read_marker = value.trim_matches('"').to_string();
                Some(Ok(()))
            },
            "max_tokens" => {
                match value.parse::<usize>() {
                    Ok(max) if max > 0 => {
                        self.max_tokens = max;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid max_tokens (must be > 0): {}", value)
                    ))),
                }
            },
            "traced_token" => {
                self.traced_token = value.trim_matches('"').to_string();
                Some(Ok(()))
            },
            _ => None,
        }
    }
}

impl AlignerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::Config(
                "max_tokens must be greater than 0".to_string()
            ));
        }
        if self.not_read_marker.is_empty() {
            return Err(Error::Config(
                "not_read_marker must not be empty".to_string()
            ));
        }
        Ok(())
    }
}
