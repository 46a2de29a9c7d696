use clap::{Parser, Subcommand};
use es_l10n_cli::commands::{CheckArgs, ResolveArgs, run_check, run_resolve};
use es_l10n_cli::ui;
use miette::Result as MietteResult;

#[derive(Parser)]
#[command(name = "es-l10n")]
#[command(about = "Check and preview es-l10n dictionaries")]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report missing translations, plural form mismatches and unknown parameters
    Check(CheckArgs),

    /// Render a key in a language with the given parameters
    Resolve(ResolveArgs),
}

fn main() -> MietteResult<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();

    ui::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Resolve(args) => run_resolve(args),
    };

    result.map_err(miette::Report::new)
}
