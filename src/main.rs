use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wdtag::config::DEFAULT_SPACE;
use wdtag::{BatchTagger, GradioClientBuilder, TaggerConfig, TaggerError};

/// wdtag - tag every image in `imgs/` with the WD tagger and write `txts/<name>.txt`
#[derive(Parser)]
#[command(name = "wdtag")]
#[command(about = "Batch image tagger backed by the WD tagger Hugging Face Space")]
#[command(version)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        let is_connection = matches!(
            e.downcast_ref::<TaggerError>(),
            Some(TaggerError::Connection(_))
        );
        if is_connection {
            eprintln!("   Check your internet connection or try again later.");
        }
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so they never interleave with the progress output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner() {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("  WDTAG AUTOMATIC TAGGER v{}", env!("CARGO_PKG_VERSION"));
    println!("{rule}\n");
}

fn run() -> Result<()> {
    print_banner();

    let tagger = BatchTagger::new(TaggerConfig::default());
    let client = GradioClientBuilder::new()
        .space(DEFAULT_SPACE)
        .build()
        .context("Failed to create tagging client")?;

    // Missing input folder and empty input are reported by the runner and
    // are not process failures.
    tagger.run(|| client.connect())?;

    Ok(())
}
