//! Configuration for range queries
//!
//! This module provides configuration options for planning and executing
//! range queries, including the demonstration range used by the CLI.

use std::path::Path;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timestamp::TIMESTAMP_LEN;

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order (oldest first)
    #[default]
    Ascending,
    /// Descending order (newest first)
    Descending,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            _ => Err(Error::config(format!("Unknown sort order: {}", s))),
        }
    }
}

impl SortOrder {
    /// Get the name of the sort order
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Configuration options for range queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct QueryConfig {
    // Execution
    /// Issue the lookups of a plan concurrently
    pub parallel_lookups: bool,
    /// Order of the returned records
    pub sort_order: SortOrder,
    /// Enable metrics collection
    pub collect_metrics: bool,

    // Presentation
    /// Number of leading and trailing items shown in samples
    pub sample_size: usize,
    /// Start used when none is given
    pub default_start: String,
    /// End used when none is given
    pub default_end: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            parallel_lookups: false,
            sort_order: SortOrder::Ascending,
            collect_metrics: true,

            sample_size: 5,
            default_start: "19700225000000".to_string(),
            default_end: "20190430000000".to_string(),
        }
    }
}

impl QueryConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether lookups run concurrently
    pub fn with_parallel_lookups(mut self, parallel: bool) -> Self {
        self.parallel_lookups = parallel;
        self
    }

    /// Set the result sort order
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Set whether to collect metrics
    pub fn with_collect_metrics(mut self, collect: bool) -> Self {
        self.collect_metrics = collect;
        self
    }

    /// Set the sample size
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the default range
    pub fn with_default_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.default_start = start.into();
        self.default_end = end.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sample_size < 1 {
            return Err(Error::config("Sample size must be at least 1"));
        }

        for (name, value) in [("default_start", &self.default_start), ("default_end", &self.default_end)] {
            if value.is_empty() || value.len() > TIMESTAMP_LEN {
                return Err(Error::config(format!(
                    "{} must be 1 to {} digits, got {:?}", name, TIMESTAMP_LEN, value
                )));
            }

            if !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::config(format!("{} must contain only digits, got {:?}", name, value)));
            }
        }

        Ok(())
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Range Query Configuration ===\n\n");

        result.push_str("Execution:\n");
        result.push_str(&format!("  Parallel Lookups: {}\n", self.parallel_lookups));
        result.push_str(&format!("  Sort Order: {}\n", self.sort_order));
        result.push_str(&format!("  Collect Metrics: {}\n", self.collect_metrics));

        result.push_str("\nPresentation:\n");
        result.push_str(&format!("  Sample Size: {}\n", self.sample_size));
        result.push_str(&format!("  Default Range: {} - {}\n", self.default_start, self.default_end));

        result
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}
