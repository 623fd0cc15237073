// src/config/subsystems/processor.rs

use serde::{Serialize, Deserialize};
use log::LevelFilter;
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// 0 means rayon's global pool.
    pub parallel_thread_count: usize,
    pub use_cache: bool,
    pub cache_capacity: usize,
    pub log_level: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            parallel_thread_count: 0,
            use_cache: true,
            cache_capacity: 1024,
            log_level: "info".to_string(),
        }
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim_matches('"').trim().to_lowercase().as_str() {
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

impl FromIni for ProcessorConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "processor" {
            return None;
        }

        match key {
            "parallel_thread_count" => {
                match value.parse::<usize>() {
                    Ok(count) => {
                        self.parallel_thread_count = count;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid parallel_thread_count: {}", value)
                    ))),
                }
            },
            "use_cache" => {
                match value.parse::<bool>() {
                    Ok(val) => {
                        self.use_cache = val;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid use_cache (must be true or false): {}", value)
                    ))),
                }
            },
            "cache_capacity" => {
                match value.parse::<usize>() {
                    Ok(capacity) if capacity > 0 => {
                        self.cache_capacity = capacity;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid cache_capacity (must be > 0): {}", value)
                    ))),
                }
            },
            "log_level" => {
                match parse_level(value) {
                    Some(_) => {
                        self.log_level = value.trim_matches('"').trim().to_lowercase();
                        Some(Ok(()))
                    },
                    None => Some(Err(Error::Config(
                        format!("Invalid log level '{}'. Must be one of: none, error, warn, info, debug, trace", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}

impl ProcessorConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn set_log_level(&mut self, value: &str) -> Result<()> {
        match self.from_ini_section("processor", "log_level", value) {
            Some(result) => result,
            None => Err(Error::config(format!("Cannot set log level: {}", value))),
        }
    }

    pub fn thread_count(&self) -> usize {
        if self.parallel_thread_count > 0 {
            self.parallel_thread_count
        } else {
            num_cpus::get()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::Config(
                "cache_capacity must be greater than 0".to_string()
            ));
        }
        if parse_level(&self.log_level).is_none() {
            return Err(Error::Config(
                format!("Invalid log level: {}", self.log_level)
            ));
        }
        Ok(())
    }
}
