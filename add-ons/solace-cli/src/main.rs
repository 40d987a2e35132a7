//! solace: interactive terminal companion.
//!
//! Usage: `solace [--config PATH] [--lang en|hi]`
//!
//! Plain lines are processed by the wellness pipeline. Slash commands:
//! `/journal [text]`, `/trends`, `/resources <mood>`, `/coping <mood>`, `/lang <en|hi>`,
//! `/history`, `/clear`, `/help`. `exit` or Ctrl-C quits.

use solace_core::{AgentConfig, Language, PipelineOutcome, Role, Session, WellnessPipeline, DEFAULT_RECENT_LIMIT};
use solace_skills::{create_classifier, DictionaryTranslator};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

const HELPLINES: &str = "If you are in danger right now, please call India Crisis Helpline: 9152987821 \
    or find a local service at https://www.befrienders.org/";

struct Args {
    config: Option<PathBuf>,
    language: Option<Language>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        language: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--lang" => args.language = it.next().as_deref().and_then(Language::from_code),
            "--help" | "-h" => {
                println!("Usage: solace [--config PATH] [--lang en|hi]");
                std::process::exit(0);
            }
            other => eprintln!("[solace] ignoring unknown argument: {}", other),
        }
    }
    args
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[solace] .env not loaded: {} (using system environment)", e);
    }
    let args = parse_args();

    let config = match &args.config {
        Some(p) => AgentConfig::load_from(p),
        None => AgentConfig::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[solace] cannot start: {}", e);
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::never(&config.storage.log_dir, "app.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
                )),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let classifier = create_classifier(&config.agent.llm_mode);
    let pipeline = match WellnessPipeline::from_config(&config, classifier) {
        Ok(p) => p.with_translator(Arc::new(DictionaryTranslator::new())),
        Err(e) => {
            eprintln!("[solace] cannot start: {}", e);
            std::process::exit(1);
        }
    };
    let mut session = pipeline.new_session();
    if let Some(lang) = args.language {
        session.language = lang;
    }

    println!("Hi, I'm here to listen. Tell me how you're feeling (type /help for commands, exit to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(&pipeline, &mut session, line.trim()).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }
    println!("Take care of yourself. I'm here whenever you want to talk.");
}

/// Returns `false` when the user asked to quit.
async fn handle_line(pipeline: &WellnessPipeline, session: &mut Session, line: &str) -> bool {
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return false;
    }
    let (command, rest) = match line.strip_prefix('/') {
        Some(cmd) => {
            let mut parts = cmd.splitn(2, char::is_whitespace);
            (parts.next().unwrap_or(""), parts.next().unwrap_or("").trim())
        }
        None => ("", line),
    };

    match command {
        "" => chat(pipeline, session, rest).await,
        "journal" if rest.is_empty() => match pipeline.recent_journal_entries(DEFAULT_RECENT_LIMIT) {
            Ok(entries) if entries.is_empty() => println!("Your journal is empty so far."),
            Ok(entries) => {
                for e in entries {
                    println!("{}\n", e);
                }
            }
            Err(e) => report(e),
        },
        "journal" => match pipeline.save_journal_entry(rest) {
            Ok(outcome) => {
                match outcome.receipt {
                    Some(receipt) => println!("Saved ({} characters) at {}.", receipt.length, receipt.timestamp),
                    None => println!("Your entry could not be saved."),
                }
                if let Some(msg) = outcome.crisis_message {
                    println!("\n{}\n{}", msg, HELPLINES);
                }
            }
            Err(e) => report(e),
        },
        "trends" => match pipeline.trends() {
            Ok(report) => {
                println!("Entries: {} over {} day(s)", report.usage.total_entries, report.usage.unique_days);
                println!("Average confidence: {:.2}", report.average_confidence);
                match report.dominant_weekly_mood {
                    Some(m) => println!("Most frequent mood this week: {}", m),
                    None => println!("No check-ins in the last 7 days."),
                }
                for (mood, count) in &report.weekly_mood_counts {
                    println!("  {:<12} {}", mood, "#".repeat(*count));
                }
            }
            Err(e) => report(e),
        },
        "resources" => match pipeline.recommend_resources(rest) {
            Ok(links) => {
                for l in links {
                    println!("• {}: {}", l.title, l.link);
                }
            }
            Err(e) => report(e),
        },
        "coping" => {
            for s in pipeline.suggest_coping(rest, pipeline.settings().suggestion_count) {
                println!("• {}", s);
            }
        }
        "lang" => match Language::from_code(rest) {
            Some(l) => {
                session.language = l;
                println!("Reply language set to {}.", l.code());
            }
            None => println!("Supported languages: en, hi"),
        },
        "history" => {
            for turn in session.memory.context() {
                let who = match turn.role {
                    Role::User => "you",
                    Role::Assistant => "solace",
                    Role::System => "system",
                };
                println!("[{}] {}: {}", turn.timestamp.format("%H:%M"), who, turn.content);
            }
        }
        "clear" => {
            session.memory.clear();
            println!("Conversation memory cleared.");
        }
        _ => println!(
            "Commands: /journal [text], /trends, /resources <mood>, /coping <mood>, /lang <en|hi>, /history, /clear, exit"
        ),
    }
    true
}

async fn chat(pipeline: &WellnessPipeline, session: &mut Session, text: &str) {
    match pipeline.process(session, text).await {
        Ok(outcome @ PipelineOutcome::Crisis { .. }) => {
            println!("\n{}\n{}\n", outcome.reply(), HELPLINES);
        }
        Ok(outcome) => println!("\n{}\n", outcome.reply()),
        Err(e) => report(e),
    }
}

fn report(e: solace_core::WellnessError) {
    tracing::error!(error = %e, "request failed");
    if matches!(e, solace_core::WellnessError::Validation(_)) {
        println!("{}", e);
    } else {
        println!("Sorry, something went wrong saving or reading your data. Please try again.");
    }
}
