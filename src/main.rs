use anyhow::Context;
use clap::Parser;
use flashai::utils::error::ErrorSeverity;
use flashai::utils::{logger, validation::Validate};
use flashai::{CliConfig, Flashcard, FlashcardPipeline, GenerationEngine, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting flashai CLI");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let request = match config.load_request().await {
        Ok(request) => request,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 建立管道與輸出
    let pipeline =
        FlashcardPipeline::from_config(&config).context("failed to build the Gemini client")?;
    if pipeline.is_offline() {
        tracing::warn!("⚠️ No API key found (GEMINI_API_KEY), using offline sample flashcards");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = GenerationEngine::new(pipeline, storage).with_formats(config.formats.clone());

    match engine.run(&request).await {
        Ok(report) => {
            tracing::info!("✅ Flashcard generation completed successfully!");
            println!("✅ Generated {} flashcards", report.flashcards.len());
            for output in &report.outputs {
                println!("📁 Saved to: {}", output);
            }
            if config.print {
                print_cards(&report.flashcards);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Flashcard generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼；既有輸出檔案不會被覆寫
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

fn print_cards(cards: &[Flashcard]) {
    for (index, card) in cards.iter().enumerate() {
        println!();
        println!("Card {} [{}]", index + 1, card.id);
        println!("  Q: {}", card.question);
        println!("  A: {}", card.answer);
    }
}
