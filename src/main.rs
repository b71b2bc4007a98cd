mod session;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use whoknows_core::{MatchMode, OutputFormat, WkaConfig};
use whoknows_gitpulse::knowledge::AuthorSummary;
use whoknows_gitpulse::mining::GitRepository;
use whoknows_gitpulse::ranking::RankedCandidate;
use whoknows_gitpulse::service::{KnowledgeService, QueryOutcome};

use crate::session::{run_session, TerminalPrompter};

#[derive(Parser)]
#[command(
    name = "whoknows",
    version,
    about = "Find out who knows about a feature, bug, or fix",
    long_about = "whoknows reads recent git commit history and ranks contributors by how often\n\
                   a topic appears in the commit messages they wrote.\n\n\
                   Examples:\n  \
                     whoknows ask login             Who wrote about login?\n  \
                     whoknows ask 'fix(' --limit 3  Metacharacters are literal by default\n  \
                     whoknows ask 'cache|evict' --regex\n  \
                     whoknows interactive           Prompt for a topic and pick a person\n  \
                     whoknows authors               List everyone in the history window"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .whoknows.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository path (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      One label per line (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown table"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rank contributors for a topic
    #[command(long_about = "Rank contributors for a topic.\n\n\
        Counts case-insensitive occurrences of the query in each author's commit\n\
        messages and prints the top authors with their share of the matches.\n\n\
        Examples:\n  whoknows ask login\n  whoknows ask 'session cookie' --limit 5 --format json")]
    Ask {
        /// Topic to search commit messages for
        query: String,

        #[command(flatten)]
        ranking: RankingArgs,

        #[command(flatten)]
        history: HistoryArgs,
    },
    /// Prompt for a topic and pick a contributor from the ranked list
    #[command(long_about = "Prompt for a topic and pick a contributor from the ranked list.\n\n\
        Commit history is read in the background while you type. This is also\n\
        what runs when whoknows is started in a terminal without a subcommand.")]
    Interactive {
        #[command(flatten)]
        ranking: RankingArgs,

        #[command(flatten)]
        history: HistoryArgs,
    },
    /// List every author in the history window
    Authors {
        #[command(flatten)]
        history: HistoryArgs,
    },
    /// Create a default .whoknows.toml configuration file
    #[command(long_about = "Create a default .whoknows.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .whoknows.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Clone, Default)]
struct RankingArgs {
    /// Maximum candidates to show (default: 10)
    #[arg(long)]
    limit: Option<usize>,

    /// Treat the query as a regular expression
    #[arg(long)]
    regex: bool,
}

#[derive(Args, Clone, Default)]
struct HistoryArgs {
    /// Number of most recent commits to read (default: 1000)
    #[arg(long)]
    max_commits: Option<usize>,

    /// Branch to read history from (default: HEAD)
    #[arg(long)]
    branch: Option<String>,
}

/// Settings after layering flags over the config file.
struct Resolved {
    top_n: usize,
    mode: MatchMode,
    max_commits: usize,
    branch: Option<String>,
}

impl Resolved {
    fn new(config: &WkaConfig, ranking: &RankingArgs, history: &HistoryArgs) -> Result<Self> {
        let top_n = ranking.limit.unwrap_or(config.ranking.top_n);
        if top_n == 0 {
            miette::bail!("--limit must be at least 1");
        }
        let max_commits = history.max_commits.unwrap_or(config.index.max_commits);
        if max_commits == 0 {
            miette::bail!("--max-commits must be at least 1");
        }
        Ok(Self {
            top_n,
            mode: if ranking.regex {
                MatchMode::Regex
            } else {
                config.ranking.match_mode
            },
            max_commits,
            branch: history.branch.clone().or_else(|| config.index.branch.clone()),
        })
    }
}

const DEFAULT_CONFIG: &str = r#"# who-knows-about configuration

[index]
# Number of most recent commits to read
# max_commits = 1000
# Branch to read history from (default: HEAD)
# branch = "main"

[ranking]
# Maximum candidates to show
# top_n = 10
# "literal" searches for the text as typed, "regex" treats it as a pattern
# match_mode = "literal"
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<WkaConfig> {
    match explicit {
        Some(path) => Ok(WkaConfig::from_file(path)?),
        None => {
            let default_path = Path::new(".whoknows.toml");
            if default_path.exists() {
                Ok(WkaConfig::from_file(default_path)?)
            } else {
                Ok(WkaConfig::default())
            }
        }
    }
}

fn discover_repository(path: &Path, branch: Option<String>) -> Option<GitRepository> {
    let repo = GitRepository::discover(path);
    if repo.is_none() {
        tracing::warn!(path = %path.display(), "not a git repository, nobody to rank");
    }
    repo.map(|r| r.with_branch(branch))
}

fn spinner(message: &'static str) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

async fn build_service(path: &Path, settings: &Resolved) -> KnowledgeService {
    let service = KnowledgeService::new();
    let source = discover_repository(path, settings.branch.clone());
    let pb = spinner("Reading commit history...");
    service.build(source, settings.max_commits).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    service
}

fn print_candidates(query: &str, candidates: &[RankedCandidate], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(candidates).into_diagnostic()?
            );
        }
        OutputFormat::Markdown => {
            println!("# Who knows about `{query}`\n");
            if candidates.is_empty() {
                println!("No one found.");
            } else {
                println!("| Rank | Author | Email | Matches | Share |");
                println!("|------|--------|-------|---------|-------|");
                for (i, c) in candidates.iter().enumerate() {
                    println!(
                        "| {} | {} | `{}` | {} | {}% |",
                        i + 1,
                        c.name,
                        c.email,
                        c.count,
                        c.percentage,
                    );
                }
            }
        }
        OutputFormat::Text => {
            if candidates.is_empty() {
                println!("No one found.");
            } else {
                for c in candidates {
                    println!("{c}");
                }
            }
        }
    }
    Ok(())
}

fn print_authors(authors: &[AuthorSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(authors).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("# Authors\n");
            println!("| Author | Email | Commits |");
            println!("|--------|-------|---------|");
            for a in authors {
                println!(
                    "| {} | `{}` | {} |",
                    a.name.as_deref().unwrap_or("-"),
                    a.email,
                    a.commits,
                );
            }
        }
        OutputFormat::Text => {
            if authors.is_empty() {
                println!("No authors found.");
            }
            for a in authors {
                let name = a.name.as_deref().unwrap_or("(unknown)");
                println!("{:<40} commits={}", format!("{name} <{}>", a.email), a.commits);
            }
        }
    }
    Ok(())
}

async fn run_interactive(path: &Path, settings: Resolved) -> Result<()> {
    let service = std::sync::Arc::new(KnowledgeService::new());
    let source = discover_repository(path, settings.branch.clone());
    let build = service.spawn_build(source, settings.max_commits);

    let mut prompter = TerminalPrompter;
    let outcome = run_session(&service, &mut prompter, settings.mode, settings.top_n).await?;
    if let Some(message) = outcome.confirmation() {
        println!("{message}");
    }

    build.await.into_diagnostic()?;
    Ok(())
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("whoknows v{version} — find out who knows about a feature, bug, or fix\n");
    println!("Commands:");
    println!("  ask <topic>   Rank contributors for a topic");
    println!("  interactive   Prompt for a topic and pick a contributor");
    println!("  authors       List everyone in the history window");
    println!("  init          Create default configuration\n");
    println!("Run 'whoknows <command> --help' for details.");
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::info!(
        max_commits = config.index.max_commits,
        top_n = config.ranking.top_n,
        match_mode = %config.ranking.match_mode,
        format = %cli.format,
        "configuration loaded"
    );

    match cli.command {
        None => {
            if TerminalPrompter::available() {
                let settings =
                    Resolved::new(&config, &RankingArgs::default(), &HistoryArgs::default())?;
                run_interactive(&cli.path, settings).await?;
            } else {
                print_welcome();
            }
        }
        Some(Command::Ask {
            ref query,
            ref ranking,
            ref history,
        }) => {
            let settings = Resolved::new(&config, ranking, history)?;
            let query = query.trim();
            if query.is_empty() {
                miette::bail!("provide a topic to search for");
            }
            let service = build_service(&cli.path, &settings).await;
            let candidates = match service.query(query, settings.mode, settings.top_n) {
                QueryOutcome::Ranked(candidates) => candidates,
                QueryOutcome::NotReady => Vec::new(),
            };
            print_candidates(query, &candidates, cli.format)?;
        }
        Some(Command::Interactive {
            ref ranking,
            ref history,
        }) => {
            if !TerminalPrompter::available() {
                miette::bail!(miette::miette!(
                    help = "Use 'whoknows ask <topic>' for non-interactive use",
                    "interactive mode needs a terminal"
                ));
            }
            let settings = Resolved::new(&config, ranking, history)?;
            run_interactive(&cli.path, settings).await?;
        }
        Some(Command::Authors { ref history }) => {
            let settings = Resolved::new(&config, &RankingArgs::default(), history)?;
            let service = build_service(&cli.path, &settings).await;
            let authors = service
                .snapshot()
                .map(|index| index.authors())
                .unwrap_or_default();
            print_authors(&authors, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".whoknows.toml");
            if path.exists() {
                miette::bail!(".whoknows.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .whoknows.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "whoknows", &mut std::io::stdout());
        }
    }

    Ok(())
}
