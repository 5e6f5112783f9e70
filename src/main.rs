// SpaceTraders Fleet Autopilot - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use spacetraders_autopilot::admiral::load_agent_token;
use spacetraders_autopilot::verbosity::set_verbosity_level;
use spacetraders_autopilot::{
    Admiral, AgentResult, AutopilotConfig, DEFAULT_CONFIG_FILE, LogTelemetry, OperatorCommand, SpaceTradersClient,
    v_error, v_summary, v_warn,
};

#[derive(Parser)]
#[command(name = "spacetraders-autopilot", version, about = "Autonomous SpaceTraders fleet autopilot")]
struct Cli {
    /// Path to the TOML configuration (created with defaults if missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Agent token file (overrides the configured one)
    #[arg(short, long)]
    token_file: Option<String>,

    /// Increase log verbosity (-v basic, -vv full)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parse one operator line: `buy <SHIP_TYPE>`, `reload` or `stop`.
fn parse_command(line: &str) -> Option<OperatorCommand> {
    let mut words = line.split_whitespace();
    match (words.next()?.to_ascii_lowercase().as_str(), words.next()) {
        ("buy", Some(ship_type)) => Some(OperatorCommand::BuyShip(ship_type.to_ascii_uppercase())),
        ("reload", None) => Some(OperatorCommand::ReloadRefuelGraph),
        ("stop", None) | ("quit", None) => Some(OperatorCommand::Stop),
        _ => None,
    }
}

fn spawn_operator_console(commands: UnboundedSender<OperatorCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                None => v_warn!("❓ Unknown command '{}' (try: buy <SHIP_TYPE>, reload, stop)", line.trim()),
            }
        }
    });
}

fn spawn_ctrl_c_handler(commands: UnboundedSender<OperatorCommand>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            v_summary!("🛑 Ctrl+C received, stopping after the current step");
            let _ = commands.send(OperatorCommand::Stop);
        }
    });
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    let cli = Cli::parse();
    set_verbosity_level(cli.verbose);

    v_summary!("🚀 SpaceTraders Fleet Autopilot Starting...");

    let mut config = AutopilotConfig::load_or_create(&cli.config)?;
    if let Some(token_file) = cli.token_file {
        config.api.token_file = token_file;
    }
    config.validate()?;
    config.print_summary();

    let token = load_agent_token(&config.api.token_file)?;
    let api = Arc::new(SpaceTradersClient::new(&token, &config.api.base_url)?);
    let admiral = Admiral::new(&config, api, Arc::new(LogTelemetry));

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    spawn_operator_console(sender.clone());
    spawn_ctrl_c_handler(sender);

    match admiral.run(receiver).await {
        Ok(()) => {
            v_summary!("🎖️  Autopilot stopped by operator");
            Ok(())
        }
        Err(e) => {
            v_error!("❌ Autopilot failed: {}", e);
            Err(e)
        }
    }
}
