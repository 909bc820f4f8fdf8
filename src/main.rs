use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use polyglot_meetings::{
    Config, MeetingController, MicrophoneFactory, NatsRecognizer, TranslationPipeline,
};

#[derive(Parser)]
#[command(name = "polyglot-meetings")]
#[command(about = "Live meeting transcription and translation client")]
struct Args {
    /// Configuration file (config crate convention, extension optional)
    #[arg(long, default_value = "config/polyglot-meetings")]
    config: String,

    /// Initial target language (catalog name or code, e.g. "Hindi" or "hi")
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load_or_default(&args.config)?;

    info!("Polyglot Meetings v0.1.0");
    info!("Recordings directory: {}", cfg.audio.recordings_path);

    let pipeline = TranslationPipeline::from_config(&cfg.translation);
    let connector = Arc::new(NatsRecognizer::new(cfg.recognition.clone()));
    let factory = Arc::new(MicrophoneFactory);

    let (controller, mut artifacts) = MeetingController::new(&cfg, factory, connector, pipeline);

    if let Some(language) = &args.language {
        controller.set_language(language);
    }

    println!("commands: start | pause | stop | replay | lang <name> | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = line.trim();

                match command {
                    "" => {}
                    "start" => { controller.start(); }
                    "pause" => { controller.pause(); }
                    "stop" => { controller.stop(); }
                    "replay" => { controller.replay(); }
                    "quit" | "exit" => break,
                    _ if command.starts_with("lang ") => {
                        controller.set_language(command["lang ".len()..].trim());
                    }
                    other => println!("unknown command: {}", other),
                }
            }
            Some(artifact) = artifacts.recv() => {
                info!(
                    "Recording saved: {} ({:.1}s)",
                    artifact.path.display(),
                    artifact.duration_secs
                );
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}
