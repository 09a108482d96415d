use tally_bot::{BotConfig, TallyBot};
use tally_database::{PgCountStore, establish_connection};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()?;
    let store = PgCountStore::new(establish_connection()?);

    let mut bot = TallyBot::new(config.discord_token().clone(), store).await?;
    bot.start().await?;

    Ok(())
}
