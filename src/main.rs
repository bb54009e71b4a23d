use log::{error, info};
use std::env;
use std::process;
use tokio::io::BufReader;

use halite_bot::bot::Bot;
use halite_bot::config::Config;
use halite_bot::debug_logger::DebugLogger;
use halite_bot::error::BotError;
use halite_bot::protocol::{format_commands, send_line, ProtocolReader, Session};

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead. env_logger writes to stderr, stdout belongs to the engine.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Halite bot...");

    // Load configuration once at startup
    let config = Config::load_or_default();

    if let Err(e) = run(config).await {
        error!("Bot stopped: {}", e);
        process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), BotError> {
    let mut reader = ProtocolReader::new(BufReader::new(tokio::io::stdin()));
    let mut stdout = tokio::io::stdout();

    let init = reader.read_init().await?;
    let mut session = Session::new(&init);

    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let mut bot = Bot::new(config, init.constants.clone());
    bot.start(&init);

    send_line(&mut stdout, bot.name()).await?;

    let mut last_turn = 0;
    while let Some(snapshot) = reader.read_frame(&mut session).await? {
        last_turn = snapshot.turn;

        // Captured before planning so the log can reproduce this turn
        let statuses = if logger.is_enabled() {
            bot.statuses()
        } else {
            Vec::new()
        };

        let plan = bot.play_turn(&snapshot)?;
        let line = format_commands(&plan.commands);

        logger.log_turn(bot.constants().clone(), snapshot, statuses, line.clone());
        send_line(&mut stdout, &line).await?;
    }

    bot.end(last_turn);
    logger.flush().await;
    Ok(())
}
