// src/config/file.rs

use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use crate::error::{Error, Result};
use super::FromIni;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// JSON lines of alignment requests; `None` reads stdin.
    pub input_path: Option<PathBuf>,
    /// JSON lines of graded attempts; `None` writes stdout.
    pub output_path: Option<PathBuf>,
    /// Log file directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let cleaned = value.trim_matches('"');
    if cleaned.is_empty() || cleaned == "-" {
        None
    } else {
        Some(PathBuf::from(cleaned))
    }
}

impl FromIni for FileConfig {
    fn from_ini_section(&mut self, _section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        match key {
            "input_path" => {
                self.input_path = optional_path(value);
                Some(Ok(()))
            },
            "output_path" => {
                self.output_path = optional_path(value);
                Some(Ok(()))
            },
            "log_dir" => {
                self.log_dir = optional_path(value);
                Some(Ok(()))
            },
            _ => None,
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input_path {
            if !input.exists() {
                return Err(Error::Config(
                    format!("Input file does not exist: {:?}", input)
                ));
            }
        }

        // Create output and log directories if they don't exist
        if let Some(parent) = self.output_path.as_ref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if let Some(log_dir) = &self.log_dir {
            std::fs::create_dir_all(log_dir)?;
        }

        Ok(())
    }
}
