//! Logos TTS CLI
//!
//! Command-line entry point for the synthesis adapter.

#![allow(clippy::print_stdout)]

mod settings;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use speech_synthesis::{MethodChannel, SpeechConfig, SynthesisAdapter, languages};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Logos TTS CLI
#[derive(Parser)]
#[command(name = "logos-tts")]
#[command(author, version, about = "Turn text into MP3 speech files", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "LOGOS_TTS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize text into an MP3 file and print its path
    ///
    /// Example: logos-tts say "Hello world" /tmp/out.mp3
    Say {
        /// Text to speak (empty text yields a short silent clip)
        text: String,

        /// Destination file, overwritten if it exists
        path: PathBuf,

        /// Language code (default: en)
        #[arg(short, long)]
        lang: Option<String>,

        /// Google domain suffix, e.g. "co.uk"
        #[arg(long)]
        tld: Option<String>,

        /// Speak slowly
        #[arg(long)]
        slow: bool,
    },

    /// Answer method calls read from stdin
    ///
    /// Each input line is a JSON object such as
    /// {"method":"synthesize","arguments":{"text":"Hi","path":"/tmp/hi.mp3"}}
    /// and produces exactly one JSON response line on stdout.
    Serve,

    /// List supported language codes
    Languages,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Apply command-line flags on top of the loaded configuration
fn apply_overrides(
    config: SpeechConfig,
    lang: Option<String>,
    tld: Option<String>,
    slow: bool,
) -> SpeechConfig {
    SpeechConfig {
        language: lang.unwrap_or(config.language),
        tld: tld.unwrap_or(config.tld),
        slow: slow || config.slow,
        ..config
    }
}

/// Serve line-delimited JSON method calls until the input ends
async fn serve_lines<R, W>(
    channel: &MethodChannel,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0_usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = channel.handle_json(&line).await;
        output.write_all(response.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        handled += 1;
    }

    debug!(handled, "Input closed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config =
        settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Say {
            text,
            path,
            lang,
            tld,
            slow,
        } => {
            let config = apply_overrides(config, lang, tld, slow);
            let adapter = SynthesisAdapter::from_config(config)?;
            let path = adapter.synthesize(&text, path).await?;
            println!("{}", path.display());
        },

        Commands::Serve => {
            let channel = MethodChannel::new(SynthesisAdapter::from_config(config)?);
            info!("Serving method calls on stdin");

            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            serve_lines(&channel, stdin, &mut stdout).await?;
        },

        Commands::Languages => {
            for (code, name) in languages::supported_languages() {
                println!("{code:<8} {name}");
            }
        },
    }

    Ok(())
}
