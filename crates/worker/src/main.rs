use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "taxdeed_worker")]
struct Args {
    /// JSON file holding an array of recommendation inputs.
    #[arg(long)]
    input: PathBuf,

    /// Write the recommendations here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,

    /// Abort the run if any entry fails validation.
    #[arg(long)]
    fail_on_invalid: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = taxdeed_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "bid batch run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: &Args, settings: &taxdeed_core::config::Settings) -> anyhow::Result<()> {
    let opts = batch::BatchOptions::from_env()?;

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let inputs = batch::parse_inputs(&text, &opts)?;

    let outcome = batch::evaluate_batch(&inputs);
    if args.fail_on_invalid {
        outcome.ensure_all_valid()?;
    }

    let rendered = serde_json::to_string_pretty(&outcome.recommendations)
        .context("serialize recommendations failed")?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    tracing::info!(
        computed = outcome.recommendations.len(),
        invalid = outcome.invalid.len(),
        exceeded_max_bid = outcome.exceeded_max_bid(),
        dry_run = args.dry_run,
        "bid batch evaluated"
    );

    if args.dry_run {
        return Ok(());
    }

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    taxdeed_core::storage::migrate(&pool).await?;

    for rec in &outcome.recommendations {
        let stored = taxdeed_core::storage::recommendations::persist_recommendation(&pool, rec)
            .await
            .with_context(|| format!("persist failed for property_id={}", rec.property_id))?;
        tracing::debug!(
            id = %stored.id,
            property_id = %stored.property_id,
            highest_severity = rec.highest_severity().map_or("none", |s| s.as_str()),
            "stored"
        );
    }

    tracing::info!(
        persisted = outcome.recommendations.len(),
        "persisted bid recommendations"
    );
    Ok(())
}

fn init_sentry(settings: &taxdeed_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
