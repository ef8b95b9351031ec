use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use streamcart::cancel;
use streamcart::config::Config;
use streamcart::handlers;
use streamcart::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "streamcart")]
#[command(about = "Checkout and conversion-tracking backend for a streaming storefront")]
struct Cli {
    /// Print the resolved configuration (secrets redacted) and exit
    #[arg(long)]
    check_config: bool,
}

fn print_config_summary(config: &Config) {
    fn flag(set: bool) -> &'static str {
        if set {
            "configured"
        } else {
            "not configured"
        }
    }

    println!("streamcart configuration");
    println!("  listen:          {}", config.addr());
    println!("  base_url:        {}", config.base_url);
    println!("  dev_mode:        {}", config.dev_mode);
    println!("  stripe key:      {}", flag(!config.stripe_secret_key.is_empty()));
    println!("  webhook secret:  {}", flag(!config.stripe_webhook_secret.is_empty()));
    println!("  price 6m/1d:     {}", flag(config.stripe_price_6m_1d.is_some()));
    println!("  price 12m/1d:    {}", flag(config.stripe_price_12m_1d.is_some()));
    println!("  price 12m/2d:    {}", flag(config.stripe_price_12m_2d.is_some()));
    println!("  meta pixel:      {}", flag(config.meta_pixel_id.is_some()));
    println!("  meta token:      {}", flag(config.meta_access_token.is_some()));
    println!("  tiktok pixel:    {}", flag(config.tiktok_pixel_id.is_some()));
    println!("  tiktok token:    {}", flag(config.tiktok_access_token.is_some()));
    println!("  sheet webhook:   {}", flag(config.sheet_webhook_url.is_some()));
    println!("  whatsapp number: {}", flag(config.whatsapp_number.is_some()));
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamcart=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if cli.check_config {
        print_config_summary(&config);
        return;
    }

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; checkout endpoints will fail");
    }
    if !config.dev_mode && config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is not set; webhook verification will reject all events");
    }

    let state = AppState::from_config(&config);

    // Sweep expired cancellation tokens in the background
    cancel::spawn_purge_task(state.cancel_tokens.clone());

    // Build the application router
    let app = handlers::router(config.rate_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Streamcart server listening on {}", addr);

    // Run server with graceful shutdown.
    // Use into_make_service_with_connect_info to enable IP-based rate limiting.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
