use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epaper_display::{probe, DisplayConfig, DisplayWorker, EpaperDisplay, Panel, TextRequest};

#[derive(Debug, Parser)]
#[command(version, about = "Show a bitmap or autofit text on the 2.13\" e-paper panel")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Display a BMP or PNG file
    Image { path: PathBuf },
    /// Autofit text onto the panel
    Text {
        text: String,
        #[arg(long, default_value_t = Panel::EPD_2IN13.width)]
        max_width: u32,
        #[arg(long, default_value_t = Panel::EPD_2IN13.height)]
        max_height: u32,
        /// Lay the text out in portrait instead of landscape
        #[arg(long)]
        no_rotate: bool,
    },
    /// Report whether the panel hardware is present
    Probe,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if let Command::Probe = args.command {
        let present = probe::hardware_present();
        println!("{}", if present { "present" } else { "absent" });
        return Ok(());
    }

    let config = DisplayConfig::from_env();
    let display = EpaperDisplay::from_config(&config);
    log::info!("Using the {} backend", display.backend());

    let worker = DisplayWorker::spawn(display, config.queue_capacity).context("starting display worker")?;
    let handle = worker.handle();

    let result = match args.command {
        Command::Image { path } => handle
            .display_image(path.clone())
            .with_context(|| format!("displaying {}", path.display())),
        Command::Text {
            text,
            max_width,
            max_height,
            no_rotate,
        } => handle
            .display_text(
                TextRequest::new(text)
                    .with_size(max_width, max_height)
                    .with_rotate(!no_rotate),
            )
            .context("displaying text"),
        Command::Probe => Ok(()),
    };

    worker.shutdown();
    result
}
