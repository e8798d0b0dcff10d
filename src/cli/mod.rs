//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for hms-export using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// hms-export - Medical record timeline and appointment export tool
#[derive(Parser, Debug)]
#[command(name = "hms-export")]
#[command(version, about, long_about = None)]
#[command(author = "HMS Export Contributors")]
pub struct Cli {
    /// Path to configuration file [default: hms-export.toml, if present]
    #[arg(short, long, global = true, env = "HMS_EXPORT_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "HMS_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a patient's medical record timeline
    Export(commands::export::ExportArgs),

    /// Export the appointment list
    Appointments(commands::appointments::AppointmentsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
