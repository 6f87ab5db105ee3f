use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use teacher_feedback::board::Notification;
use teacher_feedback::import;
use teacher_feedback::models::{Category, RatingField, RawSubmission};
use teacher_feedback::report;
use teacher_feedback::store::{FileStorage, RecordStore, DEFAULT_KEY};
use teacher_feedback::FeedbackBoard;

#[derive(Parser)]
#[command(name = "teacher-feedback")]
#[command(about = "Collect teacher evaluations and summarise them per teacher", long_about = None)]
struct Cli {
    /// Directory holding the feedback blob
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,
    /// Name of the feedback blob
    #[arg(long, global = true, default_value = DEFAULT_KEY)]
    key: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one evaluation
    Submit(SubmitArgs),
    /// Submit evaluations from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show per-teacher statistics
    List {
        /// Print the render tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Delete all stored feedback
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Rating flags may be repeated; more than one value counts as no answer.
#[derive(clap::Args)]
struct SubmitArgs {
    #[arg(long)]
    teacher: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    effectiveness: Vec<String>,
    #[arg(long)]
    communication: Vec<String>,
    #[arg(long)]
    knowledge: Vec<String>,
    #[arg(long)]
    management: Vec<String>,
    #[arg(long)]
    punctuality: Vec<String>,
    #[arg(long)]
    support: Vec<String>,
    #[arg(long)]
    aids: Vec<String>,
    #[arg(long)]
    satisfaction: Vec<String>,
    #[arg(long)]
    comments: Option<String>,
}

impl From<SubmitArgs> for RawSubmission {
    fn from(args: SubmitArgs) -> Self {
        let ratings = [
            (RatingField::Category(Category::Effectiveness), args.effectiveness),
            (RatingField::Category(Category::Communication), args.communication),
            (RatingField::Category(Category::Knowledge), args.knowledge),
            (RatingField::Category(Category::Management), args.management),
            (RatingField::Category(Category::Punctuality), args.punctuality),
            (RatingField::Category(Category::Support), args.support),
            (RatingField::Category(Category::Aids), args.aids),
            (RatingField::Satisfaction, args.satisfaction),
        ];
        RawSubmission {
            teacher_name: args.teacher,
            subject: args.subject,
            selections: ratings.into_iter().collect(),
            comments: args.comments,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = FileStorage::new(&cli.data_dir);
    let mut board = FeedbackBoard::from_store(RecordStore::load_with_key(storage, cli.key));

    match cli.command {
        Commands::Submit(args) => {
            let note = board.submit(&RawSubmission::from(args));
            announce(note)?;
        }
        Commands::Import { csv } => {
            let summary = import::import_csv(&mut board, &csv)?;
            println!(
                "Inserted {} feedback entries from {} ({} skipped).",
                summary.inserted,
                csv.display(),
                summary.skipped
            );
        }
        Commands::List { json } => {
            let tree = board.render();
            if json {
                let rendered =
                    serde_json::to_string_pretty(&tree).context("failed to encode render tree")?;
                println!("{rendered}");
            } else {
                print!("{}", report::build_report(&tree, &board.subject_mix()));
            }
        }
        Commands::Report { out } => {
            let output = report::build_report(&board.render(), &board.subject_mix());
            std::fs::write(&out, output)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Clear { yes } => {
            let mut gate = |prompt: &str| yes || ask(prompt);
            match board.clear_all(&mut gate) {
                Some(note) => announce(note)?,
                None => println!("Nothing deleted."),
            }
        }
    }

    Ok(())
}

fn announce(note: Notification) -> anyhow::Result<()> {
    if note.is_error() {
        anyhow::bail!(note.message);
    }
    println!("[{}] {}", note.kind, note.message);
    Ok(())
}

fn ask(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
