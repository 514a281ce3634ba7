//! lessonforge CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lessonforge", version, about = "AI classroom-resource generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .docx test paper from a template
    Test {
        /// Subject title for the cover page (e.g. "Year 7 Science")
        #[arg(long)]
        subject: String,

        /// Unit or SAC title (e.g. "Unit 2 SAC Outcome 1")
        #[arg(long)]
        unit: String,

        /// Year printed on the cover page
        #[arg(long)]
        year: String,

        /// Topic the questions should cover
        #[arg(long)]
        topic: String,

        /// Rubric text, inline
        #[arg(long, conflicts_with = "rubric_file")]
        rubric: Option<String>,

        /// Rubric text, from a file
        #[arg(long)]
        rubric_file: Option<PathBuf>,

        /// Number of multiple-choice questions
        #[arg(long, default_value = "10")]
        mcq: u32,

        /// Total marks for the MCQ section
        #[arg(long, default_value = "10")]
        mcq_marks: u32,

        /// Number of short-answer questions
        #[arg(long, default_value = "5")]
        saq: u32,

        /// Total marks for the SAQ section
        #[arg(long, default_value = "10")]
        saq_marks: u32,

        /// Template .docx (defaults to the configured template_path)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Output path (defaults to <subject>_<unit>_test.docx)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Temperature override
        #[arg(long)]
        temperature: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a .pptx lesson deck from source text
    Slides {
        /// Plain-text source the deck should summarise
        #[arg(long)]
        source: PathBuf,

        /// Output path (defaults to <source>_presentation.pptx)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Temperature override
        #[arg(long)]
        temperature: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a quiz-game .csv
    Quiz {
        /// Topic for the questions
        #[arg(long)]
        topic: String,

        /// Number of questions
        #[arg(long, default_value = "15")]
        count: u32,

        /// Output path (defaults to <topic>_quiz.csv)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the raw CSV to stdout as well
        #[arg(long)]
        preview: bool,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Temperature override
        #[arg(long)]
        temperature: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a rubric feedback comment
    Comment {
        /// Test questions, inline
        #[arg(long, conflicts_with = "questions_file")]
        questions: Option<String>,

        /// Test questions, from a file
        #[arg(long)]
        questions_file: Option<PathBuf>,

        /// Rubric criteria, inline
        #[arg(long, conflicts_with = "rubric_file")]
        rubric: Option<String>,

        /// Rubric criteria, from a file
        #[arg(long)]
        rubric_file: Option<PathBuf>,

        /// Description of the student's performance, inline
        #[arg(long, conflicts_with = "performance_file")]
        performance: Option<String>,

        /// Description of the student's performance, from a file
        #[arg(long)]
        performance_file: Option<PathBuf>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Temperature override
        #[arg(long)]
        temperature: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage the prompt library
    Gems {
        #[command(subcommand)]
        action: commands::gems::GemsAction,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show today's API usage counters
    Usage {
        /// Zero all counters
        #[arg(long)]
        reset: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lessonforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Test {
            subject,
            unit,
            year,
            topic,
            rubric,
            rubric_file,
            mcq,
            mcq_marks,
            saq,
            saq_marks,
            template,
            output,
            model,
            temperature,
            config,
        } => {
            commands::test::execute(commands::test::TestArgs {
                subject,
                unit,
                year,
                topic,
                rubric,
                rubric_file,
                mcq,
                mcq_marks,
                saq,
                saq_marks,
                template,
                output,
                model,
                temperature,
                config,
            })
            .await
        }
        Commands::Slides {
            source,
            output,
            model,
            temperature,
            config,
        } => commands::slides::execute(source, output, model, temperature, config).await,
        Commands::Quiz {
            topic,
            count,
            output,
            preview,
            model,
            temperature,
            config,
        } => commands::quiz::execute(topic, count, output, preview, model, temperature, config).await,
        Commands::Comment {
            questions,
            questions_file,
            rubric,
            rubric_file,
            performance,
            performance_file,
            model,
            temperature,
            config,
        } => {
            commands::comment::execute(
                (questions, questions_file),
                (rubric, rubric_file),
                (performance, performance_file),
                model,
                temperature,
                config,
            )
            .await
        }
        Commands::Gems { action, config } => commands::gems::execute(action, config),
        Commands::Usage { reset, config } => commands::usage::execute(reset, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
