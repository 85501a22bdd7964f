//! NyayaSetu - Main CLI Entry Point

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use nyayasetu::cli::{Args, Commands, Config, Verbosity};
use nyayasetu::corpus::load_corpus;
use nyayasetu::language::Language;
use nyayasetu::repl::ReplSession;
use nyayasetu::LegalAssistant;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{}: {}", "Error".red(), message);
        return ExitCode::from(2);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(2);
        }
    };

    let result = match &args.command {
        Some(Commands::Config) => show_config(&config),
        Some(Commands::Info) => run_info(&args, &config),
        Some(Commands::Start) => run_repl(&args, &config),
        Some(Commands::Showcase) => run_showcase(&args, &config),
        None => run_single_question(&args, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> nyayasetu::Result<Config> {
    let mut config = Config::load(args.config.clone())?;
    if let Some(database) = &args.database {
        config.corpus.database_dir = database.to_string_lossy().to_string();
    }
    Ok(config)
}

/// Load the corpus and bring up the full pipeline; fatal on failure
fn initialize(args: &Args, config: &Config) -> nyayasetu::Result<LegalAssistant> {
    let verbosity = args.verbosity();

    if verbosity.show_progress() {
        println!(
            "📚 Scanning '{}' for documents...",
            config.database_dir().display()
        );
    }
    let store = load_corpus(&config.database_dir(), config.corpus.min_passage_chars)?;
    if verbosity.show_progress() {
        println!("✅ Knowledge base loaded with {} passages.", store.len());
    }

    let spinner = model_spinner(verbosity);
    let assistant = LegalAssistant::load(store, &config.assistant_config());
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let assistant = assistant?;
    if verbosity.show_progress() {
        let info = assistant.model_info();
        println!(
            "✅ Pipeline ready on {} ({} passages indexed).",
            info.device, info.corpus_size
        );
    }

    Ok(assistant)
}

fn model_spinner(verbosity: Verbosity) -> Option<ProgressBar> {
    if !verbosity.show_progress() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message("Loading retriever, reranker, and LLM (first run downloads models)...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(pb)
}

fn run_single_question(args: &Args, config: &Config) -> nyayasetu::Result<()> {
    let assistant = initialize(args, config)?;
    let question = args.question.as_deref().unwrap_or_default();
    let language = resolve_language(args, question);

    let report = assistant.ask_with_report(question, language.code())?;

    if args.verbosity().show_detail() {
        for passage in &report.passages {
            println!(
                "  {} passage #{} (score {:.2})",
                "retrieved".dimmed(),
                passage.ordinal,
                passage.score
            );
        }
        println!("  {} {}", "timings".dimmed(), report.timings);
    }

    println!("{}", report.answer);
    Ok(())
}

fn resolve_language(args: &Args, question: &str) -> Language {
    use nyayasetu::language::{LanguageDetector, ScriptDetector};

    match &args.language {
        Some(code) => Language::from_code(code),
        None => ScriptDetector.detect(question),
    }
}

fn run_repl(args: &Args, config: &Config) -> nyayasetu::Result<()> {
    let assistant = initialize(args, config)?;
    let forced = args.language.as_deref().map(Language::from_code);
    let mut session = ReplSession::new(forced, args.verbosity().show_detail())?;
    session.run(&assistant)
}

fn run_info(args: &Args, config: &Config) -> nyayasetu::Result<()> {
    let assistant = initialize(args, config)?;
    let info = assistant.model_info();

    println!("\n{}", "NyayaSetu diagnostics".bold());
    println!("  Device:      {}", info.device);
    println!("  Corpus size: {} passages", info.corpus_size);
    println!("  Generator:   {}", info.generator_model);
    Ok(())
}

fn show_config(config: &Config) -> nyayasetu::Result<()> {
    println!("\n{}", "NyayaSetu configuration".bold());
    println!("Models:");
    println!("  Embedder:  {}", config.models.embedder);
    println!("  Reranker:  {}", config.models.reranker);
    println!("  Generator: {}", config.models.generator);
    println!("Retrieval:");
    println!("  top_k:        {}", config.retrieval.top_k);
    println!("  rerank_top_n: {}", config.retrieval.rerank_top_n);
    println!("  min_score:    {}", config.retrieval.min_score);
    println!("Generation:");
    println!("  max_new_tokens: {}", config.generation.max_new_tokens);
    println!("Corpus:");
    println!("  database_dir:      {}", config.corpus.database_dir);
    println!("  min_passage_chars: {}", config.corpus.min_passage_chars);
    Ok(())
}

/// Canned multilingual queries with per-language latency
fn run_showcase(args: &Args, config: &Config) -> nyayasetu::Result<()> {
    let assistant = initialize(args, config)?;

    let cases = [
        (
            "en",
            "What is the penalty for driving without a license under the Motor Vehicles Act?",
        ),
        (
            "hi",
            "क्या पुलिस 24 घंटे से अधिक समय तक किसी को हिरासत में रख सकती है?",
        ),
        ("pa", "ਕੀ ਮੈਂ ਖਰਾਬ ਪ੍ਰੈਸ਼ਰ ਕੂਕਰ ਵਾਪਸ ਕਰ ਸਕਦਾ ਹਾਂ?"),
    ];

    println!("\n🌐 Running multilingual showcase...");
    for (code, query) in cases {
        println!("    Query ({}): {}", code, query);
        let started = Instant::now();
        match assistant.ask(query, code) {
            Ok(answer) => {
                let truncated: String = answer.chars().take(100).collect();
                println!("    > Response: {}...", truncated);
                println!("    > Time: {:.2}s\n", started.elapsed().as_secs_f64());
            }
            Err(e) => {
                eprintln!("    > {}: {}\n", "Failed".red(), e);
            }
        }
    }

    Ok(())
}
