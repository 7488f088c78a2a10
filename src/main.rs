use anyhow::Result;
use axonflow_client::client::PolicyCheckRequest;
use axonflow_client::{AxonFlowClient, ClientConfig};
use clap::Parser;

/// axonflow - AxonFlow governance agent CLI
///
/// Smoke-test an AxonFlow deployment: check the agent health, run a policy
/// check against a query, or list the configured policies.
///
/// If the AXONFLOW_API_KEY environment variable is set, it will be used for
/// authentication.
///
/// Examples:
///   axonflow health
///   axonflow check "summarize the incident report"
#[derive(Parser, Debug)]
#[command(author, version = env!("AXONFLOW_SDK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Agent endpoint (overrides defaults; also via AXONFLOW_AGENT_URL)
    #[arg(
        long = "agent-url",
        short = 'u',
        env = "AXONFLOW_AGENT_URL",
        value_name = "URL",
        global = true
    )]
    pub agent_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Query the agent health endpoint
    Health,

    /// Run a policy check against a query
    Check(CheckArgs),

    /// List the configured policies
    Policies,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// The query to check
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(agent_url) = cli.agent_url {
        config.agent_url = agent_url;
    }
    let client = AxonFlowClient::new(config)?;

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            match health.version {
                Some(version) => println!("{} (version {})", health.status, version),
                None => println!("{}", health.status),
            }
        }
        Commands::Check(args) => {
            let decision = client
                .policy_check(&PolicyCheckRequest::new(args.query))
                .await?;
            if decision.allowed {
                println!("allowed (decision {})", decision.decision_id);
            } else {
                println!(
                    "blocked: {} (decision {})",
                    decision.block_reason.as_deref().unwrap_or("no reason given"),
                    decision.decision_id
                );
            }
            for policy in decision.policies_applied {
                println!("  applied: {}", policy);
            }
        }
        Commands::Policies => {
            for policy in client.list_policies().await? {
                let state = if policy.enabled { "enabled" } else { "disabled" };
                println!("{}  {}  [{}]", policy.id, policy.name, state);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_health_parsing() {
        let cli = Cli::try_parse_from(["axonflow", "health"]).unwrap();
        assert!(matches!(cli.command, Commands::Health));
    }

    #[test]
    fn test_cli_check_parsing() {
        let cli = Cli::try_parse_from(["axonflow", "check", "some query"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.query, "some query"),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_global_agent_url_parsing() {
        let cli = Cli::try_parse_from(["axonflow", "--agent-url", "http://localhost:9999", "health"])
            .unwrap();
        assert_eq!(cli.agent_url, Some("http://localhost:9999".to_string()));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["axonflow"]);
        assert!(result.is_err());
    }
}
