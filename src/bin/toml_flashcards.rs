use clap::Parser;
use flashai::config::toml_config::TomlConfig;
use flashai::core::retry::RetryPolicy;
use flashai::utils::error::ErrorSeverity;
use flashai::utils::{logger, validation::Validate};
use flashai::{
    ConfigProvider, FlashcardPipeline, GenerationEngine, GenerationRequest, LocalStorage,
};

#[derive(Parser)]
#[command(name = "toml-flashcards")]
#[command(about = "Flashcard generator with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "flashai.toml")]
    config: String,

    /// Text to turn into flashcards
    text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long)]
    input_file: Option<String>,

    /// Override the topic from config
    #[arg(long)]
    topic: Option<String>,

    /// Override the language from config
    #[arg(long)]
    language: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show classification and prompt without calling the model
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based flashcard generator");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 應用命令列覆蓋設定
    let text = match &args.input_file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => args.text.clone().unwrap_or_default(),
    };
    let mut request = GenerationRequest::new(text);
    if let Some(topic) = args.topic.as_deref().or(config.topic()) {
        request = request.with_topic(topic);
    }
    if let Some(language) = &args.language {
        request = request.with_language(language.clone());
    }

    if request.text.trim().is_empty()
        && request.topic.as_deref().map_or(true, |t| t.trim().is_empty())
    {
        eprintln!("❌ No content provided: pass text, --input-file, or set a topic");
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let pipeline = FlashcardPipeline::from_config(&config)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        perform_dry_run(&pipeline, &request);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = GenerationEngine::new(pipeline, storage).with_formats(config.export_formats());

    match engine.run(&request).await {
        Ok(report) => {
            tracing::info!("✅ Flashcard generation completed successfully!");
            println!("✅ Generated {} flashcards", report.flashcards.len());
            if report.offline {
                println!("⚠️ No API key configured: these are offline sample cards");
            }
            for output in &report.outputs {
                println!("📁 Saved to: {}", output);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Flashcard generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let retry: RetryPolicy = config.retry_policy();

    println!("📋 Configuration Summary:");
    println!("  Provider: {} ({})", config.provider(), config.model());
    println!("  Endpoint: {}", config.endpoint());
    println!(
        "  API Key: {}",
        if config.api_key().is_some() { "configured" } else { "missing (offline mode)" }
    );
    println!(
        "  Retry: {} attempt(s), base delay {:?}",
        retry.max_attempts, retry.base_delay
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output.formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run<G: flashai::ContentGenerator>(
    pipeline: &FlashcardPipeline<G>,
    request: &GenerationRequest,
) {
    let plan = pipeline.plan(
        &request.text,
        request.topic.as_deref(),
        request.language.as_deref(),
    );

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("🧭 Classification: {}", plan.classification);
    println!("🌐 Language: {}", plan.language);
    println!("📏 Subject length: {} chars", plan.subject.chars().count());
    if pipeline.is_offline() {
        println!("⚠️ Offline: a real run would return fallback cards");
    }
    println!();
    println!("📝 Prompt:");
    println!("{}", plan.prompt);
    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
