//! `ember` - send one notification email.
//!
//! Usage: `ember [SUBJECT] [BODY]`
//!
//! Server and account settings come from `ember/config.json` in the user
//! configuration directory, or from the file named by `EMBER_CONFIG`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use anyhow::bail;
use ember_smtp::{Mailer, Outcome};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: ember [SUBJECT] [BODY]";

/// Message text from the command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    subject: Option<String>,
    body: Option<String>,
}

impl Args {
    /// Parses positional arguments. Returns `None` when help was asked for.
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Option<Self>> {
        let mut parsed = Self::default();
        for arg in args {
            if arg == "-h" || arg == "--help" {
                return Ok(None);
            }
            if parsed.subject.is_none() {
                parsed.subject = Some(arg);
            } else if parsed.body.is_none() {
                parsed.body = Some(arg);
            } else {
                bail!("unexpected argument '{arg}'\n{USAGE}");
            }
        }
        Ok(Some(parsed))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ember=info,ember_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let path = config::config_path();
    let settings = config::load(&path).await?;
    info!("Sending notification via {}:{}", settings.server, settings.port);

    let mailer = Mailer::new(settings.mailer_config());
    let request = settings.request(args.subject.as_deref(), args.body.as_deref());

    match mailer.deliver(request).await {
        Outcome::Completed => {
            info!("Notification sent to {}", settings.recipient);
            Ok(())
        }
        outcome => bail!("notification not delivered: {outcome:?}"),
    }
}
