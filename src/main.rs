use clap::Parser;
use gamefik_validator::app::{build_engine, report, DefaultEngine};
use gamefik_validator::domain::ports::Storage;
use gamefik_validator::utils::{logger, validation::Validate};
use gamefik_validator::{server, AppConfig, Cli, Command, LocalStorage, OutputFormat, ValidatorError};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or_default();

    match &command {
        Command::Serve { .. } => {
            // The log format is only known once the config is loaded
            let json = AppConfig::load(cli.config.as_deref())
                .map(|config| config.json_logs())
                .unwrap_or(false);
            logger::init_server_logger(cli.verbose, json);
        }
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("Starting gamefik-validator");

    let config = match load_config(&cli, &command) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    tracing::debug!(
        "Config: bind {}:{}, model {}, templates {}",
        config.server.host,
        config.server.port,
        config.llm.model,
        config.contract.templates_dir.display()
    );

    if let Err(e) = run(command, &config).await {
        fail(&e);
    }

    Ok(())
}

fn load_config(cli: &Cli, command: &Command) -> gamefik_validator::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Command::Serve { host, port } = command {
        config.apply_cli_overrides(host.as_deref(), *port);
    }

    config.validate()?;
    Ok(config)
}

fn fail(e: &ValidatorError) -> ! {
    tracing::error!(
        "❌ Validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(1);
}

async fn emit(rendered: String, output: Option<&Path>) -> gamefik_validator::Result<()> {
    match output {
        Some(path) => {
            let storage = LocalStorage::new(".");
            storage
                .write_file(&path.to_string_lossy(), rendered.as_bytes())
                .await?;
            println!("📁 Report saved to: {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> gamefik_validator::Result<()> {
    match command {
        Command::Serve { .. } => {
            let addr = config.bind_address()?;
            let engine = Arc::new(build_engine(config)?);
            if config.llm.api_key.is_none() {
                tracing::warn!("No Anthropic API key configured; validations will fail until ANTHROPIC_API_KEY is set");
            }
            server::start_server(addr, engine, config.max_upload_bytes()).await
        }
        Command::Extract { file } => {
            let engine = build_engine(config)?;
            let text = engine.extract(&file).await?;
            print!("{}", report::render_extract(&text));
            Ok(())
        }
        Command::Crm { files, format, output } => {
            let engine = build_engine(config)?;
            let outcome = engine.crm(&files).await?;
            let rendered = match format {
                OutputFormat::Text => report::render_crm_text(&outcome),
                OutputFormat::Json => report::to_json(&outcome)?,
                OutputFormat::Csv => report::render_crm_csv(&outcome)?,
            };
            emit(rendered, output.as_deref()).await
        }
        Command::Contract { file, format, output } => {
            let engine: DefaultEngine = build_engine(config)?;
            let outcome = engine.contract(&file).await?;
            let rendered = match format {
                OutputFormat::Text => report::render_contract_text(&outcome),
                OutputFormat::Json => report::to_json(&outcome)?,
                OutputFormat::Csv => {
                    return Err(ValidatorError::input(
                        "Unsupported format",
                        "CSV output is only available for the crm command",
                    ))
                }
            };
            emit(rendered, output.as_deref()).await
        }
        Command::Detect { file } => {
            let engine = build_engine(config)?;
            let detection = engine.detect(&file).await?;
            print!("{}", report::render_detection(&detection));
            Ok(())
        }
        Command::Clauses { model, file } => {
            let engine = build_engine(config)?;
            let result = engine.clauses(model, &file).await?;
            print!("{}", report::render_clauses(&result));
            Ok(())
        }
    }
}
