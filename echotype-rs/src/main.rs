//! echotype-rs: hear a German phrase, type it back.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use echotype::cache::AudioCache;
use echotype::challenges::OpenAiChallengeSource;
use echotype::config::Config;
use echotype::player::create_player;
use echotype::prompt::{LinePrompter, Replay};
use echotype::trainer::{Trainer, TrainerSettings};
use echotype::tts::OpenAiSpeech;
use echotype::Error;

#[derive(Parser, Debug)]
#[command(name = "echotype-rs", about = "Spoken-spelling trainer")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with the dialogue on stdout
    let filter = if args.verbose {
        EnvFilter::new("debug,rustyline=info,reqwest=info,hyper_util=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let config = Config::load(args.config.as_deref()).with_env_overrides();
    config.api_key()?;

    let source = OpenAiChallengeSource::new(&config.openai, config.challenges.clone())?;
    let speech = OpenAiSpeech::new(&config.openai, config.tts.clone())?;
    let cache = AudioCache::new(config.cache_dir(), Box::new(speech))?;
    info!("Audio cache at {}", cache.dir().display());

    let player = create_player(&config.player);
    let replay = Replay::new(player.clone());
    let prompter = LinePrompter::new(replay.clone())?;

    let mut trainer = Trainer::new(
        TrainerSettings::from_config(&config),
        Box::new(source),
        cache,
        player,
        Box::new(prompter),
        replay,
    );

    let mut stdout = std::io::stdout();
    match trainer.run(&mut stdout).await {
        Ok(report) => {
            info!(
                "Session '{}' finished: {}/{} (won: {})",
                report.topic, report.score, report.total, report.won
            );
            Ok(())
        }
        Err(Error::Interrupted) => {
            println!("\n👋 Abgebrochen.");
            info!("Interrupted during {}", trainer.phase());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
