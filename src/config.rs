//! Configuration and CLI argument handling

use clap::Parser;

use crate::state::ResetPolicy;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-timer")]
#[command(about = "A Pomodoro countdown timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20525")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Duration restored by reset: always the Pomodoro, or the current mode's
    #[arg(long, value_enum, default_value_t = ResetPolicy::Pomodoro)]
    pub reset_policy: ResetPolicy,

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["pomodoro-timer"]);
        assert_eq!(config.address(), "127.0.0.1:20525");
        assert_eq!(config.reset_policy, ResetPolicy::Pomodoro);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn parses_reset_policy_and_verbose() {
        let config = Config::parse_from(["pomodoro-timer", "--reset-policy", "current-mode", "-v", "-p", "8080"]);
        assert_eq!(config.reset_policy, ResetPolicy::CurrentMode);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.port, 8080);
    }
}
