use pdf_qa_agent::commands::CommandHandler;
use pdf_qa_agent::config::AppConfig;
use pdf_qa_agent::database::{ChunkStore, VectorDB};
use pdf_qa_agent::llm::DocumentIndex;
use pdf_qa_agent::prompts;
use pdf_qa_agent::providers::openai::OpenAIProvider;
use pdf_qa_agent::providers::traits::CompletionProvider;
use std::env;
use std::sync::Arc;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use rustyline::history::DefaultHistory;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OpenAI API key (falls back to OPENAI_API_KEY)
    #[arg(short, long)]
    api_key: Option<String>,

    /// PDF to load at startup
    #[arg(long)]
    pdf: Option<String>,

    /// Answer perspective (standard, corporate_lawyer, economist, ...)
    #[arg(long, default_value = "standard")]
    role: String,

    /// Qdrant URL (falls back to QDRANT_URL)
    #[arg(long)]
    qdrant_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);

    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let api_key = match &args.api_key {
        Some(key) => key.clone(),
        None => env::var("OPENAI_API_KEY")
            .map_err(|_| "API key must be provided via --api-key or OPENAI_API_KEY env var")?,
    };

    let mut config = AppConfig::from_env();
    if let Some(url) = &args.qdrant_url {
        config.qdrant_url = url.clone();
    }

    let provider = OpenAIProvider::new(
        api_key,
        prompts::get_system_prompt(&args.role).to_string(),
    )
    .await?;

    let vector_db = VectorDB::new(&config.qdrant_url).await?;

    let index = DocumentIndex::new(
        Arc::new(vector_db) as Arc<dyn ChunkStore + Send + Sync>,
        Arc::new(provider.clone()) as Arc<dyn CompletionProvider + Send + Sync>,
        &config,
    );

    let mut command_handler = CommandHandler::new(
        Box::new(provider),
        index,
        config.max_history,
        &args.role,
    )
    .await?;

    command_handler.handle_command("help").await?;

    if let Some(pdf) = &args.pdf {
        if let Err(e) = command_handler.handle_command(&format!("load {}", pdf)).await {
            println!("{}", e.red());
        }
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
