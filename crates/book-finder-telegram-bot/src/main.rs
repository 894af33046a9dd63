use book_finder_core::config::ArchiveSettings;
use book_finder_transport_telegram::config::{BotSettings, TelegramSettings};
use book_finder_transport_telegram::runner::run_bot;
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting bot tokens
struct RedactionPatterns {
    url_token: Regex,
    bare_token: Regex,
    prefixed_token: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            url_token: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            bare_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            prefixed_token: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let output = self
            .url_token
            .replace_all(input, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        let output = self
            .bare_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        self.prefixed_token
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string()
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // The caller handed us `buf.len()` bytes; report them all as consumed.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Redaction must be ready before the first log line
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting Book Finder TG Bot...");

    let settings = init_settings();

    run_bot(settings).await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "book_finder_core=info,book_finder_transport_telegram=info,book_finder_telegram_bot=info,hyper=warn,h2=error,reqwest=warn,tokio=warn,tower=warn,teloxide=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let archive_settings = match ArchiveSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load archive configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load telegram configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = telegram_settings.validate() {
        error!("Invalid telegram configuration: {}", e);
        std::process::exit(1);
    }

    info!(
        "Configuration loaded successfully (variant: {:?}).",
        telegram_settings.bot_variant
    );
    Arc::new(BotSettings::new(archive_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw1";

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().expect("patterns compile")
    }

    #[test]
    fn test_redacts_token_in_api_url() {
        let line = format!("error sending request for url (https://api.telegram.org/bot{TOKEN}/sendMessage)");
        let redacted = patterns().redact(&line);
        assert!(!redacted.contains(TOKEN));
        assert!(redacted.contains("https://api.telegram.org/bot[TELEGRAM_TOKEN]/sendMessage"));
    }

    #[test]
    fn test_redacts_bare_token() {
        let redacted = patterns().redact(&format!("token={TOKEN}"));
        assert_eq!(redacted, "token=[TELEGRAM_TOKEN]");
    }

    #[test]
    fn test_leaves_ordinary_lines_alone() {
        let line = "Search `title:dune AND mediatype:texts` returned 3 matches.";
        assert_eq!(patterns().redact(line), line);
    }

    #[test]
    fn test_writer_reports_full_length() -> io::Result<()> {
        let mut sink = Vec::new();
        let line = format!("bot{TOKEN} failed\n");
        let written = RedactingWriter::new(&mut sink, Arc::new(patterns())).write(line.as_bytes())?;

        assert_eq!(written, line.len());
        assert!(!String::from_utf8_lossy(&sink).contains(TOKEN));
        Ok(())
    }
}
