use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail, eyre};
use log::info;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use course_qa::config::Config;
use course_qa::llm::{AnthropicClient, LlmClient};
use course_qa::store::{InMemoryStore, VectorStore};
use course_qa::tools::{CourseOutlineTool, CourseSearchTool, SourceCitation, Tool};
use course_qa::{Answer, CourseAssistant};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("course-qa")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("course-qa.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_store(cli: &Cli, config: &Config) -> Result<Arc<dyn VectorStore>> {
    let max_results = config.store.max_results;
    let path = cli.catalog.as_ref().or(config.store.catalog_path.as_ref());

    let store = match path {
        Some(path) => InMemoryStore::load(path, max_results)
            .context(format!("Failed to load course catalog from {}", path.display()))?,
        None => {
            info!("No course catalog configured, starting with an empty store");
            InMemoryStore::new(max_results)
        }
    };
    Ok(Arc::new(store))
}

fn build_assistant(
    config: &Config,
    store: Arc<dyn VectorStore>,
) -> Result<(CourseAssistant, Arc<AnthropicClient>)> {
    let client = AnthropicClient::from_env(&config.llm.api_key_env, (&config.llm).into())
        .map_err(|e| eyre!("{} (set {} to ask questions)", e, config.llm.api_key_env))?;
    if !client.is_ready() {
        bail!("{} is empty (set it to ask questions)", config.llm.api_key_env);
    }

    let client = Arc::new(client);
    let llm: Arc<dyn LlmClient> = client.clone();
    let assistant = CourseAssistant::new(llm, store)
        .with_max_rounds(config.orchestrator.max_rounds)
        .with_max_history(config.session.max_history);

    Ok((assistant, client))
}

fn report_usage(cli: &Cli, client: &AnthropicClient) {
    let usage = client.total_usage();
    info!("token usage: {} in, {} out", usage.input_tokens, usage.output_tokens);
    if cli.is_verbose() {
        println!(
            "{} {} tokens ({} in, {} out)",
            "Usage:".yellow(),
            usage.total(),
            usage.input_tokens,
            usage.output_tokens
        );
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let store = build_store(cli, config)?;

    match &cli.command {
        Commands::Ask {
            question,
            history,
            max_rounds,
        } => {
            let (assistant, client) = build_assistant(config, store)?;
            let rounds = max_rounds.unwrap_or(config.orchestrator.max_rounds);
            let answer = assistant.orchestrate(question, history.as_deref(), rounds).await?;
            print_answer(&answer);
            report_usage(cli, &client);
            Ok(())
        }
        Commands::Chat => {
            let (assistant, client) = build_assistant(config, store)?;
            handle_chat_command(&assistant).await?;
            report_usage(cli, &client);
            Ok(())
        }
        Commands::Search { query, course, lesson } => {
            info!("Direct search: {:?} course={:?} lesson={:?}", query, course, lesson);
            let tool = CourseSearchTool::new(store);
            println!("{}", tool.search(query, course.as_deref(), *lesson).await);
            print_sources(&tool.citations());
            Ok(())
        }
        Commands::Outline { course } => {
            let tool = CourseOutlineTool::new(store);
            println!("{}", tool.outline(course).await);
            Ok(())
        }
        Commands::Courses => {
            let titles = store.course_titles().await?;
            println!("{} {}", "Courses:".green(), titles.len());
            for title in titles {
                println!("  {}", title);
            }
            Ok(())
        }
    }
}

async fn handle_chat_command(assistant: &CourseAssistant) -> Result<()> {
    println!("{}", "Ask about the course materials. Empty line or 'exit' quits.".cyan());

    let session = assistant.sessions().create_session();
    let stdin = io::stdin();

    loop {
        print!("{} ", ">".green());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() || question == "exit" {
            break;
        }

        let (answer, _) = assistant.ask(question, Some(&session)).await?;
        print_answer(&answer);
    }

    assistant.sessions().clear_session(&session);
    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    print_sources(&answer.citations);
}

fn print_sources(citations: &[SourceCitation]) {
    if citations.is_empty() {
        return;
    }

    println!();
    println!("{}", "Sources:".bold());
    for (i, citation) in citations.iter().enumerate() {
        match &citation.link {
            Some(link) => println!("  {}. {} ({})", i + 1, citation.label, link.blue()),
            None => println!("  {}. {}", i + 1, citation.label),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
