use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

use engagement_engine::dataset::{load_posts, LoadOptions};
use engagement_engine::insights::{
    all_insights, generator_parameter_performance, image_prompt_performance, language_preference,
    posting_time_performance, text_prompt_performance, topic_performance, weekday_name, GeneratorInsights,
    LanguageInsights, PhraseInsights, PostingTimeInsights, RankedItem, TopicInsights,
};
use engagement_engine::{format_float, train, CandidatePost, EngineConfig, HistoricalPost, Predictor};

#[derive(Parser)]
#[command(name = "engagement-engine", about = "Post engagement predictor and insight reports")]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Path to the TOML config (defaults to $ENGAGEMENT_CONFIG_PATH or config/engine.toml)"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Train the engagement model and replace the saved artifact")]
    Train(DataArgs),
    #[command(about = "Predict the engagement score of a candidate post")]
    Predict(PredictArgs),
    #[command(about = "Print ranked insight reports")]
    Insights(InsightsArgs),
    #[command(about = "Next calendar slot at the best performing weekday and hour")]
    NextSlot(DataArgs),
    #[command(about = "Write the effective configuration to a file")]
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct DataArgs {
    #[arg(long, help = "JSON array of historical posts exported by the data store")]
    data: PathBuf,
    #[arg(long, help = "Compute missing engagement scores from likes, comments, shares and reach")]
    derive_missing_scores: bool,
}

#[derive(Args, Debug, Clone)]
struct PredictArgs {
    #[arg(long, help = "JSON object with candidate fields; read from stdin when no field flags are given")]
    features: Option<PathBuf>,
    #[arg(long)]
    topic: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    provider: Option<String>,
    #[arg(long)]
    model_name: Option<String>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    text_prompt_en: Option<String>,
    #[arg(long)]
    text_prompt_ar: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InsightKind {
    Topics,
    TextPrompts,
    ImagePrompts,
    PostingTimes,
    Generator,
    Languages,
    All,
}

#[derive(Args, Debug, Clone)]
struct InsightsArgs {
    #[arg(value_enum)]
    kind: InsightKind,
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, help = "Emit the report as JSON instead of text")]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/engine.toml")]
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = EngineConfig::load(cli.config).map_err(|err| err.to_string())?;

    // Training and tree scoring are CPU bound; keep them off the async workers.
    tokio::task::spawn_blocking(move || dispatch(cli.command, config))
        .await
        .map_err(|err| format!("worker failed: {}", err))?
}

fn dispatch(command: Command, config: EngineConfig) -> Result<(), String> {
    match command {
        Command::Train(args) => run_train(args, &config),
        Command::Predict(args) => run_predict(args, &config),
        Command::Insights(args) => run_insights(args, &config),
        Command::NextSlot(args) => run_next_slot(args),
        Command::InitConfig(args) => {
            config.write(&args.path).map_err(|err| err.to_string())?;
            println!("Wrote config to {}", args.path.display());
            Ok(())
        }
    }
}

fn load_data(args: &DataArgs) -> Result<Vec<HistoricalPost>, String> {
    let options = LoadOptions {
        derive_missing_scores: args.derive_missing_scores,
    };
    load_posts(&args.data, options).map_err(|err| err.to_string())
}

fn run_train(args: DataArgs, config: &EngineConfig) -> Result<(), String> {
    let posts = load_data(&args)?;
    let outcome = train(&posts, &config.model);
    println!("Model training result: {}", outcome.message);
    if let Some(summary) = &outcome.summary {
        println!(
            "Rows: {} (train {} | holdout {})",
            summary.rows, summary.train_rows, summary.test_rows
        );
        match &summary.holdout {
            Some(metrics) => println!(
                "Holdout: RMSE {} | R-squared {}",
                format_float(metrics.rmse, 4),
                format_float(metrics.r2, 4)
            ),
            None => println!("Holdout: skipped, dataset too small"),
        }
        println!("Artifact: {}", summary.artifact_path.display());
    }
    if outcome.success {
        Ok(())
    } else {
        Err(outcome.message)
    }
}

fn run_predict(args: PredictArgs, config: &EngineConfig) -> Result<(), String> {
    let candidate = read_candidate(args)?;
    let predictor = Predictor::new(&config.model.artifact_path);
    let score = predictor.predict(&candidate).map_err(|err| err.to_string())?;
    println!("Predicted engagement score: {}", format_float(score, 4));
    Ok(())
}

fn read_candidate(args: PredictArgs) -> Result<CandidatePost, String> {
    let mut candidate = match &args.features {
        Some(path) => parse_candidate(&read_file(path)?)?,
        None if !has_field_flags(&args) => parse_candidate(&read_stdin()?)?,
        None => CandidatePost::default(),
    };

    if let Some(value) = args.topic {
        candidate.topic = value;
    }
    if let Some(value) = args.language {
        candidate.language = value;
    }
    if let Some(value) = args.provider {
        candidate.provider = value;
    }
    if let Some(value) = args.model_name {
        candidate.model_name = value;
    }
    if let Some(value) = args.temperature {
        candidate.temperature = value;
    }
    if let Some(value) = args.content {
        candidate.content = value;
    }
    if let Some(value) = args.text_prompt_en {
        candidate.text_prompt_en = value;
    }
    if let Some(value) = args.text_prompt_ar {
        candidate.text_prompt_ar = value;
    }
    Ok(candidate)
}

fn has_field_flags(args: &PredictArgs) -> bool {
    args.topic.is_some()
        || args.language.is_some()
        || args.provider.is_some()
        || args.model_name.is_some()
        || args.temperature.is_some()
        || args.content.is_some()
        || args.text_prompt_en.is_some()
        || args.text_prompt_ar.is_some()
}

fn parse_candidate(data: &str) -> Result<CandidatePost, String> {
    serde_json::from_str(data).map_err(|err| format!("invalid candidate features: {}", err))
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("failed reading {}: {}", path.display(), err))
}

fn read_stdin() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing candidate features: pass --features, field flags, or pipe JSON on stdin".to_string());
    }
    Ok(buffer)
}

fn run_insights(args: InsightsArgs, config: &EngineConfig) -> Result<(), String> {
    let posts = load_data(&args.data)?;
    let insights = &config.insights;

    if args.json {
        let payload = match args.kind {
            InsightKind::Topics => serde_json::to_string_pretty(&topic_performance(&posts, insights)),
            InsightKind::TextPrompts => serde_json::to_string_pretty(&text_prompt_performance(&posts, insights)),
            InsightKind::ImagePrompts => serde_json::to_string_pretty(&image_prompt_performance(&posts, insights)),
            InsightKind::PostingTimes => serde_json::to_string_pretty(&posting_time_performance(&posts)),
            InsightKind::Generator => serde_json::to_string_pretty(&generator_parameter_performance(&posts)),
            InsightKind::Languages => serde_json::to_string_pretty(&language_preference(&posts)),
            InsightKind::All => serde_json::to_string_pretty(&all_insights(&posts, insights)),
        }
        .map_err(|err| format!("failed to serialize insights: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    match args.kind {
        InsightKind::Topics => print_topics(&topic_performance(&posts, insights)),
        InsightKind::TextPrompts => print_phrases("Text Prompt", &text_prompt_performance(&posts, insights)),
        InsightKind::ImagePrompts => print_phrases("Image Prompt", &image_prompt_performance(&posts, insights)),
        InsightKind::PostingTimes => print_posting_times(&posting_time_performance(&posts)),
        InsightKind::Generator => print_generator(&generator_parameter_performance(&posts)),
        InsightKind::Languages => print_languages(&language_preference(&posts)),
        InsightKind::All => {
            let suite = all_insights(&posts, insights);
            print_topics(&suite.topics);
            print_phrases("Text Prompt", &suite.text_prompts);
            print_phrases("Image Prompt", &suite.image_prompts);
            print_posting_times(&suite.posting_times);
            print_generator(&suite.generator);
            print_languages(&suite.languages);
        }
    }
    Ok(())
}

fn run_next_slot(args: DataArgs) -> Result<(), String> {
    let posts = load_data(&args)?;
    let report = posting_time_performance(&posts);
    let now = Local::now().naive_local();
    match report.next_slot(now) {
        Some(slot) => {
            println!("Next optimal posting slot: {}", slot.format("%Y-%m-%d %H:%M"));
            Ok(())
        }
        None => Err(format!("could not determine optimal posting time: {}", report.message)),
    }
}

fn print_ranked(title: &str, items: &[RankedItem]) {
    if items.is_empty() {
        println!("{}: none identified.", title);
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  - {}: {} ({} posts)", item.label, format_float(item.score, 4), item.samples);
    }
}

fn print_topics(report: &TopicInsights) {
    println!("\n--- Topic Performance ---\nMessage: {}", report.message);
    print_ranked("High-Performing Topics (Avg Engagement Score)", &report.high);
    print_ranked("Low-Performing Topics (Avg Engagement Score)", &report.low);
}

fn print_phrases(title: &str, report: &PhraseInsights) {
    println!("\n--- {} Performance ---\nMessage: {}", title, report.message);
    if let Some((low, high)) = report.thresholds {
        println!(
            "Cohort thresholds: low <= {} | high >= {}",
            format_float(low, 4),
            format_float(high, 4)
        );
    }
    print_ranked(&format!("High-Performing {} Phrases (TF-IDF)", title), &report.high);
    print_ranked(&format!("Low-Performing {} Phrases (TF-IDF)", title), &report.low);
}

fn print_posting_times(report: &PostingTimeInsights) {
    println!("\n--- Optimal Posting Times ---\nMessage: {}", report.message);
    print_ranked("Top Performing Hours (Avg Engagement Score)", &report.hours);
    print_ranked("Top Performing Days (Avg Engagement Score)", &report.days);
    if let (Some(day), Some(hour)) = (report.best_day, report.best_hour) {
        println!("Best slot: {} at {:02}:00", weekday_name(day), hour);
    }
}

fn print_generator(report: &GeneratorInsights) {
    println!("\n--- Generator Parameter Insights ---\nMessage: {}", report.message);
    print_ranked("Top Performing Providers", &report.providers);
    print_ranked("Top Performing Models", &report.models);
    print_ranked("Top Performing Temperatures", &report.temperatures);
}

fn print_languages(report: &LanguageInsights) {
    println!("\n--- Language Preference Insights ---\nMessage: {}", report.message);
    print_ranked("Top Performing Languages", &report.ranked);
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
