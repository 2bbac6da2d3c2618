use clap::Parser;
use telegram_http_api_rs::{Config, Method, Result, TelegramClient};
use tracing_subscriber::EnvFilter;

/// Simple program to test the Telegram Bot API: call getMe.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The bot access token
    #[arg(short, long)]
    token: String,

    /// Base URL override (e.g. a local Bot API server: http://localhost:8081/bot)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Return a pending response and resolve it afterwards
    #[arg(long, action = clap::ArgAction::SetTrue, default_value_t = false)]
    pending: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = args.base_url {
        config = config.with_base_bot_url(url);
    }
    let mut client = TelegramClient::with_config(config)?;

    let request = client
        .request(&args.token, Method::Get, "getMe")?
        .asynchronous(args.pending);
    let response = client.send_request(request).await?;
    let response = if response.is_pending() {
        println!("Request sent, waiting for the reply.");
        response.resolve().await?
    } else {
        response
    };

    println!("getMe result: {:#}", response.decoded_body());
    Ok(())
}
