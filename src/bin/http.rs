#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use chrono::Local;
    use custody_schedule::{AppConfig, Schedule, http_api, load_or_generate, persistence};
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    let today = Local::now().date_naive();
    let generator = config.generator();

    let state = match (&config.store_path, config.store_kind()) {
        (Some(path), Some(kind)) => {
            let store = persistence::open_store(path, kind)?;
            let schedule = load_or_generate(&*store, today, &generator);
            http_api::AppState::with_config(schedule, &config).with_store(Arc::from(store))
        }
        _ => {
            tracing::warn!("CUSTODY_STORE not set, schedule is kept in memory only");
            http_api::AppState::with_config(Schedule::generate(today, &generator), &config)
        }
    };

    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
