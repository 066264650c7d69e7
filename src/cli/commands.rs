use clap::{Parser, Subcommand};

/// AI-powered portfolio summarization and iterative feedback
#[derive(Parser, Debug)]
#[command(
    name = "folioscope",
    about = "AI-powered portfolio summarization and iterative feedback",
    version,
    author,
    long_about = "folioscope aggregates a portfolio's repository, documents, and description \
                  into one synthesized narrative using an LLM, then generates iterative, \
                  context-aware feedback for portfolio notes. It supports multiple AI \
                  providers (Ollama, OpenAI, Claude, Gemini, Grok, Groq)."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug logging)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate a portfolio summary",
        long_about = "Aggregates the portfolio's repository, documents, and description into \
                      one narrative, waits for the pipeline to finish, and prints the record.\n\n\
                      Examples:\n  \
                      folioscope summarize pf-1 --description \"my side project\"\n  \
                      folioscope summarize pf-1 --repo-url https://github.com/me/project\n  \
                      folioscope summarize pf-1 --document https://example.com/design.txt"
    )]
    Summarize(SummarizeArgs),

    #[command(
        about = "Summarize a portfolio and generate feedback for its notes",
        long_about = "Runs the full chain: generates the portfolio summary, then one feedback \
                      round per note, each round building on the previous feedback.\n\n\
                      Examples:\n  \
                      folioscope review pf-1 --description \"my project\" --note \"1:first note\"\n  \
                      folioscope review pf-1 --repo-url https://github.com/me/project \\\n    \
                      --note \"1:intro note\" --note \"2:revised note\""
    )]
    Review(ReviewArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    #[arg(value_name = "PORTFOLIO_ID", help = "Portfolio identifier")]
    pub portfolio_id: String,

    #[arg(
        short = 'd',
        long,
        default_value = "",
        value_name = "TEXT",
        help = "Free-text portfolio description"
    )]
    pub description: String,

    #[arg(
        short = 'r',
        long = "repo-url",
        value_name = "URL",
        help = "Repository URL (repeatable; the first github.com URL is crawled)"
    )]
    pub repo_urls: Vec<String>,

    #[arg(
        long = "document",
        value_name = "URL",
        help = "Document location to fold into the narrative (repeatable)"
    )]
    pub documents: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub summarize: SummarizeArgs,

    #[arg(
        short = 'n',
        long = "note",
        value_name = "ID:CONTENT",
        required = true,
        help = "Portfolio note as 'id:content' (repeatable, processed in order)"
    )]
    pub notes: Vec<String>,

    #[arg(long, help = "Generate recruiter-perspective feedback instead of developer feedback")]
    pub hr: bool,
}

impl ReviewArgs {
    /// Parses the `--note` arguments into (id, content) pairs
    pub fn parsed_notes(&self) -> Result<Vec<(i64, String)>, String> {
        self.notes
            .iter()
            .map(|raw| {
                let (id, content) = raw
                    .split_once(':')
                    .ok_or_else(|| format!("invalid note '{}', expected 'id:content'", raw))?;
                let id = id
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("invalid note id in '{}'", raw))?;
                Ok((id, content.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        // Verify that CLI structure is valid
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_summarize_args() {
        let args = CliArgs::parse_from(["folioscope", "summarize", "pf-1"]);
        match args.command {
            Commands::Summarize(summarize) => {
                assert_eq!(summarize.portfolio_id, "pf-1");
                assert!(summarize.description.is_empty());
                assert!(summarize.repo_urls.is_empty());
                assert!(summarize.documents.is_empty());
            }
            _ => panic!("Expected Summarize command"),
        }
    }

    #[test]
    fn test_summarize_with_options() {
        let args = CliArgs::parse_from([
            "folioscope",
            "summarize",
            "pf-1",
            "--description",
            "my project",
            "--repo-url",
            "https://github.com/me/a",
            "--repo-url",
            "https://github.com/me/b",
            "--document",
            "https://example.com/doc.txt",
        ]);
        match args.command {
            Commands::Summarize(summarize) => {
                assert_eq!(summarize.description, "my project");
                assert_eq!(summarize.repo_urls.len(), 2);
                assert_eq!(summarize.documents.len(), 1);
            }
            _ => panic!("Expected Summarize command"),
        }
    }

    #[test]
    fn test_review_note_parsing() {
        let args = CliArgs::parse_from([
            "folioscope",
            "review",
            "pf-1",
            "--note",
            "1:my first note",
            "--note",
            "2:note with: colons",
        ]);
        match args.command {
            Commands::Review(review) => {
                let notes = review.parsed_notes().unwrap();
                assert_eq!(notes[0], (1, "my first note".to_string()));
                assert_eq!(notes[1], (2, "note with: colons".to_string()));
            }
            _ => panic!("Expected Review command"),
        }
    }

    #[test]
    fn test_review_rejects_malformed_note() {
        let args = CliArgs::parse_from(["folioscope", "review", "pf-1", "--note", "no-id"]);
        match args.command {
            Commands::Review(review) => assert!(review.parsed_notes().is_err()),
            _ => panic!("Expected Review command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["folioscope", "-v", "summarize", "pf-1"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from([
            "folioscope",
            "--log-level",
            "debug",
            "summarize",
            "pf-1",
        ]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
