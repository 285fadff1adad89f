use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::Level;
use wandclash::config::Config;
use wandclash::error::{WandClashError, WcResult};
use wandclash::spellbook::SpellBook;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Spellbook JSON. The built-in library is used when omitted.
    #[arg(global = true, long)]
    spells: Option<String>,

    /// JSON config file; flags typed on the command line override it.
    #[arg(global = true, long = "config", id = "config_path")]
    config_path: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank spells by similarity to a drawn stroke
    Score(cmd::score::ScoreArgs),
    /// Cross-score every reference pattern to find look-alikes
    Audit(cmd::audit::AuditArgs),
    /// Recognition rates for noisy redraws of each pattern
    Calibrate(cmd::calibrate::CalibrateArgs),
}

fn fail(e: WandClashError) -> ! {
    eprintln!("\n❌ {}", e);
    process::exit(1);
}

fn resolve_config(path: Option<&str>, cli: &Config, matches: &ArgMatches) -> WcResult<Config> {
    match path {
        Some(p) => {
            let mut config = Config::load_from_file(p)?;
            config.merge_from_cli(cli, matches);
            config.validate()?;
            Ok(config)
        }
        None => {
            cli.validate()?;
            Ok(cli.clone())
        }
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let book = match &cli.spells {
        Some(path) => SpellBook::load_from_file(path).unwrap_or_else(|e| fail(e)),
        None => SpellBook::builtin(),
    };

    // Subcommand flags live in the subcommand's matches, not the root.
    let sub_matches = matches.subcommand().map_or(&matches, |(_, m)| m);
    let cli_config = match &cli.command {
        Commands::Score(args) => &args.config,
        Commands::Audit(args) => &args.config,
        Commands::Calibrate(args) => &args.config,
    };
    let config = resolve_config(cli.config_path.as_deref(), cli_config, sub_matches)
        .unwrap_or_else(|e| fail(e));

    let result = match cli.command {
        Commands::Score(args) => cmd::score::run(args, &config, &book),
        Commands::Audit(args) => cmd::audit::run(args, &config, &book),
        Commands::Calibrate(args) => cmd::calibrate::run(args, &config, &book),
    };
    if let Err(e) = result {
        fail(e);
    }
}
