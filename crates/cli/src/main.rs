mod cmd;
mod dates;
mod logging;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use perinote_core::periodic::Granularity;

#[derive(Debug, Parser)]
#[command(name = "pnote", version, about = "Find and navigate periodic notes in a markdown vault")]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (defaults to ~/.config/perinote/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use instead of the config's default
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Log more on stderr (repeat for more detail)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log less on stderr
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> i8 {
        let up = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let down = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        up.saturating_sub(down)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and periodic note formats
    Doctor,

    /// List every periodic note in the vault
    List(ListArgs),

    /// Print the note for the period containing a date
    Note(NoteArgs),

    /// Print the notes inside the period containing a date
    Period(PeriodArgs),

    /// Print the previous or next note of the same granularity
    Adjacent(AdjacentArgs),

    /// Keep the index live and print changes as notes come and go
    Watch,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list notes of this granularity (day, week, month, quarter, year)
    #[arg(long, short)]
    pub granularity: Option<Granularity>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    /// Granularity of the note (day, week, month, quarter, year)
    pub granularity: Granularity,

    /// Date inside the period: YYYY-MM-DD, today, yesterday, tomorrow, today+3d
    #[arg(default_value = "today")]
    pub date: String,
}

#[derive(Debug, Args)]
pub struct PeriodArgs {
    /// Granularity of the period (day, week, month, quarter, year)
    pub granularity: Granularity,

    /// Date inside the period: YYYY-MM-DD, today, yesterday, tomorrow, today-1w
    #[arg(default_value = "today")]
    pub date: String,

    /// Include notes of finer granularities inside the period
    #[arg(long)]
    pub finer: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AdjacentArgs {
    /// Note path, relative to the vault root or absolute
    pub path: PathBuf,

    /// Look for the previous note instead of the next one
    #[arg(long)]
    pub backward: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn main() {
    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Doctor => cmd::doctor::run(global),
        Commands::List(args) => cmd::list::run(global, &args),
        Commands::Note(args) => cmd::note::run(global, &args),
        Commands::Period(args) => cmd::period::run(global, &args),
        Commands::Adjacent(args) => cmd::adjacent::run(global, &args),
        Commands::Watch => cmd::watch::run(global),
        Commands::Completions(args) => cmd::completions::run(args.shell),
    }
}
