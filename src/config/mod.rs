//! Configuration module for divgrade
//!
//! This module handles:
//! - Project-level configuration (divgrade.toml)
//! - The ticker universe used by the insights report
//! - Feed partitions and their caps
//! - Calculator defaults

mod project_config;

pub use project_config::{
    load_config, load_project_config, user_config_path, CalculatorConfig, FeedConfig,
    InsightsConfig, PartitionConfig, ProjectConfig, UniverseConfig, CONFIG_FILE_NAME,
    EXAMPLE_CONFIG,
};
