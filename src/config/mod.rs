pub mod file;
pub mod subsystems;

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::fs;
use crate::error::Result;
use log::{warn, trace};

pub trait FromIni {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    // File paths
    pub files: file::FileConfig,

    // Subsystem configs
    pub aligner: subsystems::AlignerConfig,
    pub processor: subsystems::ProcessorConfig,
}

impl GraderConfig {
    pub fn validate(&self) -> Result<()> {
        self.files.validate()?;
        self.aligner.validate()?;
        self.processor.validate()?;
        Ok(())
    }

    pub fn from_ini<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (config, warnings) = Self::from_ini_with_warnings(path)?;
        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(config)
    }

    /// Loads and validates `path`, handing back the problems found in it
    /// instead of logging them. Used when the logger is not running yet.
    pub fn from_ini_with_warnings<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<String>)> {
        let absolute_path = std::fs::canonicalize(&path)
            .unwrap_or_else(|_| path.as_ref().to_path_buf());

        trace!("Loading configuration from: {:?}", absolute_path);

        let content = fs::read_to_string(&path)?;
        let (config, warnings) = Self::parse_ini_with_warnings(&content);
        config.validate()?;
        Ok((config, warnings))
    }

    /// Parses INI text without validating it. Malformed values are logged and
    /// leave the key at its default.
    pub fn parse_ini(content: &str) -> Self {
        let (config, warnings) = Self::parse_ini_with_warnings(content);
        for warning in &warnings {
            warn!("{}", warning);
        }
        config
    }

    pub fn parse_ini_with_warnings(content: &str) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let mut current_section = String::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                trace!("  Line {}: Found section: [{}]", line_num + 1, current_section);
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Delegate to appropriate subsystem config
                if let Some(result) = match current_section.as_str() {
                    "file" => config.files.from_ini_section(&current_section, key, value),
                    "aligner" => config.aligner.from_ini_section(&current_section, key, value),
                    "processor" => config.processor.from_ini_section(&current_section, key, value),
                    _ => None,
                } {
                    if let Err(e) = result {
                        warnings.push(format!("Error processing config key {}={}: {}", key, value, e));
                    }
                } else {
                    warnings.push(format!(
                        "Unrecognized config key: {}={} in section [{}]",
                        key, value, current_section
                    ));
                }
            }
        }

        (config, warnings)
    }
}
