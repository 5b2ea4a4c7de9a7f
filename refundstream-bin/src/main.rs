use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use refundstream_core::{
    config::Config,
    model::{ExplainRequest, SessionOutcome},
    render::{display_lines, DisplayLine},
    session::SessionController,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Refund explanation stream client", long_about = None)]
struct Cli {
    /// Config file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the backend base URL
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream an explanation for a return (prints updates live)
    Explain {
        #[arg(long)]
        return_id: String,
        #[arg(short, long, help = "Question to ask; defaults to the configured one")]
        question: Option<String>,
        #[arg(long, help = "Ask the upstream to use its live backend")]
        use_backend: bool,
    },
    /// Print the effective configuration
    Config,
}

/// Prints display updates, writing only the new tail when an update extends
/// what is already on screen and re-rendering otherwise.
#[derive(Default)]
struct TerminalView {
    shown: String,
}

impl TerminalView {
    fn update(&mut self, display: &str) {
        let mut out = io::stdout().lock();
        match display.strip_prefix(self.shown.as_str()) {
            Some(tail) if !self.shown.is_empty() => {
                let _ = write!(out, "{tail}");
            }
            _ => {
                if !self.shown.is_empty() {
                    let _ = writeln!(out);
                }
                for (i, line) in display_lines(display).into_iter().enumerate() {
                    if i > 0 {
                        let _ = writeln!(out);
                    }
                    match line {
                        DisplayLine::StepHeader("") => {}
                        DisplayLine::StepHeader(step) => {
                            let _ = write!(out, "== {step} ==");
                        }
                        DisplayLine::Text(text) => {
                            let _ = write!(out, "{text}");
                        }
                    }
                }
            }
        }
        out.flush().ok();
        self.shown = display.to_string();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    if let Some(url) = cli.url {
        cfg.backend.base_url = url;
    }

    match cli.command {
        Commands::Config => {
            println!("explain_url = {}", cfg.backend.explain_url());
            println!("{cfg:#?}");
        }
        Commands::Explain {
            return_id,
            question,
            use_backend,
        } => {
            let ctl = Arc::new(SessionController::from_config(&cfg)?);
            tracing::info!(url = %cfg.backend.explain_url(), "starting explain session");

            let watcher = {
                let ctl = ctl.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        ctl.cancel();
                    }
                })
            };

            let req = ExplainRequest::new(
                return_id,
                question.unwrap_or_default(),
                use_backend || ctl.use_backend_default(),
            );
            let mut view = TerminalView::default();
            let outcome = {
                let mut sink = |s: &str| view.update(s);
                ctl.explain(req, &mut sink).await
            };
            watcher.abort();
            println!();

            match outcome {
                SessionOutcome::Finished | SessionOutcome::Exhausted => {}
                SessionOutcome::Cancelled | SessionOutcome::Superseded => eprintln!("[cancelled]"),
                SessionOutcome::Failed => std::process::exit(1),
            }
        }
    }

    Ok(())
}
