use clap::Parser;
use nd_core::{Config, NewsStorage, Result};
use nd_fetch::{init_logging, Pipeline};
use nd_inference::prelude::*;
use nd_web::{create_app, AppState};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Interval such as `90`, `30m` or `1h15m30s`; a bare number is seconds.
#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = 0u64;
        let mut digits = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            let value: u64 = digits
                .parse()
                .map_err(|_| format!("Missing number before '{}'", c))?;
            total = value
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            digits.clear();
            seen_number = true;
        }

        if !digits.is_empty() {
            let secs = digits
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total = total
                .checked_add(secs)
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            seen_number = true;
        }

        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch, classify and browse news headlines", long_about = None)]
struct Cli {
    /// TOML configuration file, `newsdesk.toml` is used when present
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "json", help = "Document storage: json (default), memory")]
    storage: String,
    /// News API key, overrides the config file and environment
    #[arg(long)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct FetchArgs {
    /// Comma separated country codes (e.g. us,gb)
    #[arg(long, value_delimiter = ',')]
    countries: Option<Vec<String>>,
    #[arg(long)]
    page_size: Option<u32>,
}

impl FetchArgs {
    fn resolve(&self, config: &Config) -> (Vec<String>, u32) {
        let countries = self
            .countries
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| config.pipeline.countries.clone());
        (countries, self.page_size.unwrap_or(config.pipeline.page_size))
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch the latest headlines into the raw document
    Fetch {
        #[command(flatten)]
        args: FetchArgs,
    },
    /// Label the raw document with categories
    Categorize,
    /// Add sentiment labels to the categorized document
    Sentiment,
    /// Fetch, categorize and analyze in one go
    Run {
        #[command(flatten)]
        args: FetchArgs,
        /// Repeat with the given interval (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Train and select the category and sentiment models
    Train {
        #[arg(long, default_value = "NewsCategorizer.csv")]
        category_csv: PathBuf,
        #[arg(long, default_value = "news_sentiment_merged.csv")]
        sentiment_csv: PathBuf,
    },
    /// Classify a single headline
    Predict { headline: String },
    /// Serve the dashboard
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// Serve the stored data as is
        #[arg(long)]
        no_refresh: bool,
    },
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(key) = &cli.api_key {
        config.news_api.api_key = Some(key.clone());
    }
}

fn log_outcome(stage: &str, outcome: Result<usize>) {
    match outcome {
        Ok(count) => info!("✅ {} finished ({} records)", stage, count),
        Err(e) => error!("❌ Error {}: {}", stage, e),
    }
}

fn train(config: &Config, category_csv: PathBuf, sentiment_csv: PathBuf) -> Result<()> {
    info!("🧠 Training category models from {}", category_csv.display());
    let category = train_task(
        &category_csv,
        CATEGORY_COLUMNS,
        Task::Category,
        &config.models.category_path,
    )?;
    info!("🧠 Training sentiment models from {}", sentiment_csv.display());
    let sentiment = train_task(
        &sentiment_csv,
        SENTIMENT_COLUMNS,
        Task::Sentiment,
        &config.models.sentiment_path,
    )?;

    let categorizer = Categorizer::new(Arc::new(category.pipeline));
    let analyzer = SentimentAnalyzer::new(Arc::new(sentiment.pipeline));
    println!("Headline: {}", DEMO_HEADLINE);
    println!("Predicted category: {}", categorizer.predict(DEMO_HEADLINE));
    println!("Predicted sentiment: {}", analyzer.predict(DEMO_HEADLINE));
    Ok(())
}

async fn serve(
    config: &Config,
    storage: Arc<dyn NewsStorage>,
    bind: Option<String>,
    no_refresh: bool,
) -> Result<()> {
    let refresh = config.server.refresh_on_start && !no_refresh;
    let (countries, page_size) = FetchArgs::default().resolve(config);

    let mut state = AppState::new(storage.clone());
    match Pipeline::from_config(config, storage) {
        Ok(pipeline) => {
            if refresh {
                info!("🔄 Refreshing news data before serving");
                pipeline.run(&countries, page_size).await;
            }
            state = state.with_pipeline(pipeline, countries, page_size);
        }
        Err(e) if refresh => return Err(e),
        Err(e) => warn!("⚠️ Serving without refresh support: {}", e),
    }

    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("🌐 Dashboard listening on http://{}", bind);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).await?;
    apply_overrides(&mut config, &cli);
    let storage = nd_storage::create_storage(&cli.storage, &config.storage)?;
    info!("💾 Storage initialized (using {})", storage.name());

    match cli.command {
        Commands::Fetch { args } => {
            let (countries, page_size) = args.resolve(&config);
            let pipeline = Pipeline::from_config(&config, storage)?;
            log_outcome("fetching news", pipeline.fetch(&countries, page_size).await);
        }
        Commands::Categorize => {
            let pipeline = Pipeline::from_parts(&config, String::new(), storage)?;
            log_outcome("categorizing news", pipeline.categorize().await);
        }
        Commands::Sentiment => {
            let pipeline = Pipeline::from_parts(&config, String::new(), storage)?;
            log_outcome("analyzing sentiment", pipeline.analyze_sentiment().await);
        }
        Commands::Run { args, interval } => {
            let (countries, page_size) = args.resolve(&config);
            let pipeline = Pipeline::from_config(&config, storage)?;
            match interval {
                Some(interval) => {
                    info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                    loop {
                        pipeline.run(&countries, page_size).await;
                        info!("Waiting {}s before next run", interval.0.as_secs());
                        tokio::time::sleep(interval.0).await;
                    }
                }
                None => {
                    pipeline.run(&countries, page_size).await;
                }
            }
        }
        Commands::Train {
            category_csv,
            sentiment_csv,
        } => train(&config, category_csv, sentiment_csv)?,
        Commands::Predict { headline } => {
            let categorizer =
                Categorizer::new(load_or_fallback(&config.models.category_path, Task::Category));
            let analyzer = SentimentAnalyzer::new(load_or_fallback(
                &config.models.sentiment_path,
                Task::Sentiment,
            ));
            println!("Category: {}", categorizer.predict(&headline));
            println!("Sentiment: {}", analyzer.predict(&headline));
        }
        Commands::Serve { bind, no_refresh } => serve(&config, storage, bind, no_refresh).await?,
    }

    Ok(())
}
