use clap::Parser;
use no_more_legalese::{
    cli::{self, Cli, Command},
    config::Config,
    llm::{LLMAdapter, LLM},
    session::SessionController,
    tui,
    utils::{init_logger, LogTarget},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command();

    // Load configuration; a missing API key stops here
    let config = Config::load(&cli.overrides())?;

    // The TUI owns the terminal, so it logs to a file
    let target = match command {
        Command::Tui { .. } => LogTarget::File,
        Command::Analyze { .. } => LogTarget::Stderr,
    };
    let _guard = init_logger(target, &config.logging)?;
    info!("Configuration loaded: {:?}", config.llm);

    let llm = LLM::new(&config.llm)?;
    info!(provider = %llm.provider(), model = %config.llm.model, "LLM client ready");
    let llm: Arc<dyn LLMAdapter> = Arc::new(llm);
    let mut controller = SessionController::new(llm, config.llm.model.clone());

    match command {
        Command::Tui { file } => tui::run(controller, file).await,
        Command::Analyze { file, questions } => {
            let mut stdout = std::io::stdout().lock();
            cli::run_analyze(&mut controller, &file, &questions, &mut stdout).await?;
            Ok(())
        }
    }
}
