use langrank::{
    auth::session::SessionSigner,
    config::{database, session::SessionConfig, settings},
    core::{
        language,
        period::Period,
        ranking::{self, RankingScope},
    },
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load configuration
    let config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let session_config = SessionConfig::from_env()
        .inspect_err(|e| error!("Failed to load session settings: {}", e))?;
    let signer = SessionSigner::from_config(&session_config);
    info!(
        mode = ?config.budget.mode,
        monthly_cap = config.budget.monthly_cap,
        ?signer,
        "Configuration loaded"
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed the catalog
    language::seed_languages(&db, &config.languages)
        .await
        .inspect_err(|e| error!("Failed to seed languages: {}", e))?;

    // 6. Report standings
    let period = Period::current();
    for (label, scope) in [
        ("lifetime".to_string(), RankingScope::Lifetime),
        (period.key(), RankingScope::Period(period)),
    ] {
        let standings = ranking::get_ranking(&db, scope, None).await?;
        info!("Standings ({label}):");
        for standing in standings {
            info!(
                "  #{} {} - {} points",
                standing.rank, standing.name, standing.total_points
            );
        }
    }

    Ok(())
}
