//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: answer one question
//! - chat: interactive session with history
//! - search / outline: run a tool directly
//! - courses: list the catalog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// course-qa - answer questions about course materials
#[derive(Parser, Debug)]
#[command(name = "course-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Course catalog JSON file (overrides config)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Prior conversation text to pass along
        #[arg(long)]
        history: Option<String>,

        /// Maximum tool rounds before the final answer
        #[arg(short = 'r', long)]
        max_rounds: Option<u32>,
    },

    /// Interactive question loop with conversation history
    Chat,

    /// Search course content directly
    Search {
        /// What to search for
        query: String,

        /// Course title (partial matches work)
        #[arg(long)]
        course: Option<String>,

        /// Lesson number to search within
        #[arg(short, long)]
        lesson: Option<i64>,
    },

    /// Show a course outline
    Outline {
        /// Course title (partial matches work)
        course: String,
    },

    /// List courses in the catalog
    Courses,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["course-qa"]).is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["course-qa", "-v", "-c", "/etc/qa.yml", "courses"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/etc/qa.yml")));
        assert!(matches!(cli.command, Commands::Courses));
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::try_parse_from(["course-qa", "ask", "What is MCP?", "-r", "3"]).unwrap();
        match cli.command {
            Commands::Ask {
                question,
                history,
                max_rounds,
            } => {
                assert_eq!(question, "What is MCP?");
                assert!(history.is_none());
                assert_eq!(max_rounds, Some(3));
            }
            _ => panic!("Expected ask command"),
        }
    }

    #[test]
    fn test_search_with_lesson_zero() {
        let cli = Cli::try_parse_from([
            "course-qa", "search", "intro", "--course", "MCP", "-l", "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { query, course, lesson } => {
                assert_eq!(query, "intro");
                assert_eq!(course.as_deref(), Some("MCP"));
                assert_eq!(lesson, Some(0));
            }
            _ => panic!("Expected search command"),
        }
    }

    #[test]
    fn test_outline_command() {
        let cli = Cli::try_parse_from(["course-qa", "outline", "Intro to X"]).unwrap();
        match cli.command {
            Commands::Outline { course } => assert_eq!(course, "Intro to X"),
            _ => panic!("Expected outline command"),
        }
    }

    #[test]
    fn test_catalog_override() {
        let cli = Cli::try_parse_from(["course-qa", "chat", "--catalog", "courses.json"]).unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("courses.json")));
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }
}
