//! Interactive REPL over the Reverie orchestrator.
//!
//! Plain lines are answered with recalled context; slash commands cover the
//! speech bridge. The real message transport stays outside this repository,
//! so this binary is the reference way to drive the agent end to end.

use anyhow::Context as _;
use clap::Parser;
use log::info;
use reverie_rs::config::{self, ReverieConfig};
use reverie_rs::core::Orchestrator;
use reverie_rs::llm::{ChatModel, GeminiClient, SpeechModel};
use reverie_rs::memory::{EmbeddingProvider, MemoryManager, VectorStore};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Default MIME type for transcribed audio files.
const AUDIO_MIME: &str = "audio/ogg; codecs=opus";

#[derive(Debug, Parser)]
#[command(name = "reverie", about = "Conversational agent with vector memory")]
struct Args {
    /// Config file path (json5).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Memory store directory, overriding the config.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reverie_rs::init_logging();
    let args = Args::parse();
    let config = config::load_config(args.config.as_deref())?;

    let client = build_client(&config)?;
    let data_dir = args
        .data_dir
        .or_else(|| config.memory.data_dir.clone())
        .or_else(config::default_data_dir)
        .context("could not resolve a data directory")?;
    let store = Arc::new(VectorStore::open(
        &data_dir,
        client.model_id(),
        client.dimension(),
    )?);
    let memory = Arc::new(
        MemoryManager::new(
            Arc::clone(&client) as Arc<dyn EmbeddingProvider>,
            store,
        )
        .with_recall_limit(config.memory.recall_limit),
    );
    let orchestrator = Orchestrator::new(memory, Arc::clone(&client) as Arc<dyn ChatModel>)
        .with_speech(Arc::clone(&client) as Arc<dyn SpeechModel>)
        .with_voice(config.speech.voice.clone());
    info!(
        "ready (model={}, store={})",
        config.model.name,
        data_dir.display()
    );

    repl(&orchestrator).await
}

fn build_client(config: &ReverieConfig) -> anyhow::Result<Arc<GeminiClient>> {
    let api_key = std::env::var(&config.model.api_key_env)
        .with_context(|| format!("missing API key in ${}", config.model.api_key_env))?;
    let mut builder = GeminiClient::builder(api_key)
        .chat_model(config.model.name.clone())
        .embedding_model(
            config.memory.embedding_model.clone(),
            config.memory.embedding_dimension,
        )
        .stt_model(config.speech.stt_model.clone())
        .tts_model(config.speech.tts_model.clone())
        .temperature(config.model.temperature)
        .timeout_secs(config.model.timeout_secs);
    if let Some(max_output_tokens) = config.model.max_output_tokens {
        builder = builder.max_output_tokens(max_output_tokens);
    }
    Ok(Arc::new(builder.build()?))
}

async fn repl(orchestrator: &Orchestrator) -> anyhow::Result<()> {
    println!("reverie ready. /voice arms voice mode, /speak <text> writes a WAV,");
    println!("/transcribe <file> transcribes audio, /quit exits.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "/quit" || line == "/exit" {
            break;
        } else if line == "/voice" {
            orchestrator.enable_voice();
            println!("voice mode enabled");
        } else if let Some(text) = line.strip_prefix("/speak ") {
            match orchestrator.speak(text.trim()).await {
                Ok(wav) => {
                    let path = "speech.wav";
                    std::fs::write(path, wav)?;
                    println!("wrote {path}");
                }
                Err(err) => eprintln!("error: {err}"),
            }
        } else if let Some(path) = line.strip_prefix("/transcribe ") {
            match std::fs::read(path.trim()) {
                Ok(audio) => match orchestrator.transcribe(&audio, AUDIO_MIME).await {
                    Ok(transcript) => println!("{transcript}"),
                    Err(err) => eprintln!("error: {err}"),
                },
                Err(err) => eprintln!("error: could not read {}: {err}", path.trim()),
            }
        } else {
            match orchestrator.respond(line).await {
                Ok(reply) => println!("{reply}"),
                Err(err) => eprintln!("error: {err}"),
            }
        }
    }
    Ok(())
}
