//! Error types for the agent.

use thiserror::Error;

use crate::config::ConfigError;
use crate::publisher::PublishError;
use crate::sampler::HostStatError;

/// Errors that stop the agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Zenoh session could not be opened.
    #[error("Failed to open Zenoh session: {0}")]
    Session(String),

    /// Host memory statistics could not be read.
    #[error(transparent)]
    HostStat(#[from] HostStatError),

    /// Too many consecutive publish failures.
    #[error("exceeded grace count ({failures} consecutive failures, {threshold} allowed)")]
    GraceExhausted {
        failures: u64,
        threshold: u64,
        #[source]
        last: PublishError,
    },
}

impl AgentError {
    /// Short label naming the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            AgentError::Config(ConfigError::MissingCredentials(_)) => "credentials",
            AgentError::Config(_) => "config",
            AgentError::Session(_) => "credentials",
            AgentError::HostStat(_) => "memGet",
            AgentError::GraceExhausted { .. } => "put",
        }
    }
}

impl From<memsight_common::Error> for AgentError {
    fn from(err: memsight_common::Error) -> Self {
        Self::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;

    #[test]
    fn test_stage_labels() {
        assert_eq!(
            AgentError::from(ConfigError::InvalidUnit("terabytes".into())).stage(),
            "config"
        );
        assert_eq!(
            AgentError::from(ConfigError::MissingCredentials("user".into())).stage(),
            "credentials"
        );
        assert_eq!(AgentError::Session("refused".into()).stage(), "credentials");
        assert_eq!(
            AgentError::from(HostStatError::Read("boom".into())).stage(),
            "memGet"
        );

        let err = AgentError::GraceExhausted {
            failures: 4,
            threshold: 3,
            last: PublishError::new("System/Linux", SinkError::Transport("down".into())),
        };
        assert_eq!(err.stage(), "put");
        assert_eq!(
            err.to_string(),
            "exceeded grace count (4 consecutive failures, 3 allowed)"
        );
    }

    #[test]
    fn test_grace_error_keeps_source() {
        use std::error::Error as _;

        let err = AgentError::GraceExhausted {
            failures: 1,
            threshold: 0,
            last: PublishError::new("System/Linux", SinkError::Transport("down".into())),
        };
        let source = err.source().expect("source");
        assert!(source.to_string().contains("System/Linux"));
    }
}
