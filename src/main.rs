use clap::Parser;
use postal_etl::core::ConfigProvider;
use postal_etl::utils::error::ErrorSeverity;
use postal_etl::utils::{logger, validation::Validate};
use postal_etl::{
    resolve, Cli, Command, CsvSource, CttClient, EnrichmentPipeline, EtlEngine, EtlError,
    FixedDelay, SqliteStore, TomlConfig,
};
use std::io::{self, BufRead, Write};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting postal-etl");

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let result = match &cli.command {
        Command::Enrich(args) => run_enrichment(&config, args.interactive).await,
        Command::Lookup(args) => run_lookup(&config, args.code.as_deref()),
    };

    if let Err(e) = result {
        exit_with(e);
    }
}

async fn run_enrichment(config: &TomlConfig, interactive: bool) -> Result<(), EtlError> {
    config.validate_for_enrichment()?;

    let source = CsvSource::new(config.input_path(), config.input_column())
        .with_delimiter(config.input_delimiter());
    let client = CttClient::from_config(config)?;
    let store = SqliteStore::open(config.db_path())?;
    let pipeline = EnrichmentPipeline::new(client, store, FixedDelay::new(config.request_delay()))
        .with_skip_known(config.skip_known());

    let engine = EtlEngine::new(source, pipeline);
    let report = engine.run().await?;
    println!("{}", report);

    if interactive {
        let store = engine.into_pipeline().into_store();
        let code = prompt_postal_code()?;
        println!("{}", resolve(&store, &code)?);
    }

    Ok(())
}

fn run_lookup(config: &TomlConfig, code: Option<&str>) -> Result<(), EtlError> {
    config.validate()?;

    let store = SqliteStore::open(config.db_path())?;
    let code = match code {
        Some(code) => code.to_string(),
        None => prompt_postal_code()?,
    };
    println!("{}", resolve(&store, &code)?);
    Ok(())
}

fn prompt_postal_code() -> io::Result<String> {
    print!("Postal code to look up (DDDD-DDD): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ postal-etl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
