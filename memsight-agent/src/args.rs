//! CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments.
///
/// Every value except `--config` overrides the matching field of the
/// configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "Publishes host memory utilization to Zenoh", version)]
pub struct AgentArgs {
    /// Path to configuration file (default: memsight.json5, if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Period (in seconds) between memory samples.
    #[arg(short, long)]
    pub period: Option<u64>,

    /// Number of consecutive publish errors allowed before a forced exit.
    #[arg(short, long)]
    pub grace: Option<u64>,

    /// Metric namespace.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Unit of the used/available metrics (bytes, kilobytes, megabytes, gigabytes).
    #[arg(long)]
    pub unit: Option<String>,

    /// Instance ID dimension.
    #[arg(long, env = "INSTANCE_ID")]
    pub instance_id: Option<String>,

    /// Autoscaling group name dimension.
    #[arg(long, env = "AUTOSCALING_GROUP_NAME")]
    pub autoscaling_group_name: Option<String>,

    /// Instance type dimension.
    #[arg(long, env = "INSTANCE_TYPE")]
    pub instance_type: Option<String>,

    /// Image ID dimension.
    #[arg(long, env = "IMAGE_ID")]
    pub image_id: Option<String>,
}

impl AgentArgs {
    /// Configuration file read when `--config` is not given.
    pub const DEFAULT_CONFIG: &'static str = "memsight.json5";

    /// Parse CLI arguments from the process environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = AgentArgs::try_parse_from([
            "memsight-agent",
            "-c",
            "agent.json5",
            "-p",
            "10",
            "-g",
            "2",
            "--unit",
            "megabytes",
            "--namespace",
            "Custom/Mem",
            "--instance-id",
            "i-0abc",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("agent.json5")));
        assert_eq!(args.period, Some(10));
        assert_eq!(args.grace, Some(2));
        assert_eq!(args.unit.as_deref(), Some("megabytes"));
        assert_eq!(args.namespace.as_deref(), Some("Custom/Mem"));
        assert_eq!(args.instance_id.as_deref(), Some("i-0abc"));
    }

    #[test]
    fn test_rejects_non_numeric_period() {
        assert!(AgentArgs::try_parse_from(["memsight-agent", "--period", "soon"]).is_err());
    }

    #[test]
    fn test_command_is_consistent() {
        use clap::CommandFactory;
        AgentArgs::command().debug_assert();
    }
}
