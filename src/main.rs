use clap::Parser;
use episort::cli::{RunConfig, run_cli};
use episort::locale::Language;
use episort::output::OutputFormatter;
use episort::pruner::PrunePolicy;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "episort", version, disable_help_flag = true)]
struct Args {
    /// File name fragment, usually the series title
    fragment: Option<String>,

    /// Rename rules: `text` removes it, `old=>new` replaces it
    rules: Vec<String>,

    /// Only print what would be moved
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Extract the episode number after applying rules
    #[arg(short, long)]
    episode: bool,

    /// Remove [...] segments before cleaning
    #[arg(short = 'b', long)]
    strip_brackets: bool,

    /// Remove empty directories whose name contains the fragment
    #[arg(long)]
    prune_by_name: bool,

    /// Output language
    #[arg(short, long, value_enum)]
    lang: Option<Language>,

    /// Print debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Print help
    #[arg(short, long)]
    help: bool,
}

impl Args {
    fn prune_policy(&self) -> PrunePolicy {
        if self.prune_by_name {
            PrunePolicy::MatchingName
        } else {
            PrunePolicy::MovedSources
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("episort={log_level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    let language = Language::resolve(args.lang);
    let messages = language.messages();

    if args.help {
        println!("{}", messages.usage());
        return ExitCode::SUCCESS;
    }

    let Some(fragment) = args.fragment.clone() else {
        OutputFormatter::error(messages.missing_fragment());
        eprintln!("\n{}", messages.usage());
        return ExitCode::FAILURE;
    };

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            OutputFormatter::error(&messages.working_dir_failed(&e));
            return ExitCode::FAILURE;
        }
    };

    let prune_policy = args.prune_policy();
    let config = RunConfig {
        fragment,
        rules: args.rules,
        language,
        dry_run: args.dry_run,
        episode: args.episode,
        strip_brackets: args.strip_brackets,
        prune_policy,
    };

    match run_cli(&config, &working_dir) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e.localized(&messages));
            ExitCode::FAILURE
        }
    }
}
