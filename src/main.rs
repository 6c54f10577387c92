use anyhow::{Context, Result, bail};
use clap::Parser;
use signsub::cli::{Cli, Commands, ConfigAction};
use signsub::config::{BackendMode, Config};
use signsub::pipeline::PipelineBuilder;
use signsub::source::JsonlPoseSource;
use signsub::subtitle::to_srt;
use signsub::vocab::{Language, Vocabulary};
use std::io::BufReader;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            backend,
            language,
            min_confidence,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_command(config, &input, backend, language, min_confidence, output).await?;
        }
        Commands::Vocab => {
            print_vocab_stats();
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

async fn run_command(
    mut config: Config,
    input: &Path,
    backend: Option<String>,
    language: Option<String>,
    min_confidence: Option<f32>,
    output: Option<std::path::PathBuf>,
) -> Result<()> {
    if let Some(backend) = backend {
        config.detection.backend = match backend.as_str() {
            "local-rules" => BackendMode::LocalRules,
            "remote" => BackendMode::Remote,
            "local-model" => BackendMode::LocalModel,
            other => bail!("unknown backend '{other}'"),
        };
    }
    if let Some(language) = language {
        config.detection.language = match language.as_str() {
            "english" => Language::English,
            "spanish" => Language::Spanish,
            "khmer" => Language::Khmer,
            other => bail!("unknown language '{other}'"),
        };
    }
    if let Some(min_confidence) = min_confidence {
        config.detection.min_confidence = min_confidence;
    }
    config.validate()?;

    if config.detection.backend != BackendMode::LocalRules {
        bail!(
            "only the local-rules backend can replay a landmark file; \
             the remote and local-model backends need a live frame source"
        );
    }

    let file = std::fs::File::open(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let source = JsonlPoseSource::new(BufReader::new(file));

    let mut pipeline = PipelineBuilder::new(config.clone())
        .pose_source(Box::new(source))
        .build()?;
    let result = pipeline.run().await?;

    println!("{} sign events accepted", result.events.len());
    for event in &result.events {
        if config.subtitle.show_confidence {
            println!("  [{:>5.2}] {}", event.confidence, event.sign);
        } else {
            println!("  {}", event.sign);
        }
    }

    println!("{} subtitles", result.subtitles.len());
    for entry in &result.subtitles {
        println!("  {} ({}ms - {}ms)", entry.text, entry.start_ms, entry.end_ms);
    }

    if let Some(path) = output {
        std::fs::write(&path, to_srt(&result.subtitles))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn print_vocab_stats() {
    let vocab = Vocabulary::new();
    let stats = vocab.stats();
    println!("signsub {}", signsub::version_string());
    println!("vocabulary words:  {}", stats.words);
    println!("categories:        {}", stats.categories);
    println!("translated signs:  {}", stats.translated_signs);
}

fn handle_config_command(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = path
                .map(|p| p.to_path_buf())
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
