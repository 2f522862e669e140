//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::BoardConfig;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "debate-clock")]
#[command(about = "Debate countdown board: two prep timers and a main speech timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Prep time per side, in seconds
    #[arg(long, default_value = "180")]
    pub prep_seconds: u64,

    /// Initial main speech time, in seconds
    #[arg(short, long, default_value = "240")]
    pub main_seconds: u64,

    /// Main speech presets in seconds, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "240,300,360,480")]
    pub presets: Vec<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Durations the board starts with
    pub fn board(&self) -> BoardConfig {
        BoardConfig {
            prep_seconds: self.prep_seconds,
            main_seconds: self.main_seconds,
            presets: self.presets.clone(),
        }
    }
}
