//! Resolve command: renders one key the way an application would.

use crate::commands::PathArgs;
use crate::error::CliError;
use crate::ui;
use clap::Parser;
use es_l10n::{L10nArgs, L10nValue, Localizer};

/// Arguments for the resolve command.
#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Template key, written in the default language.
    pub key: String,

    /// Language to render in (defaults to the negotiated host language).
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Template parameter; numeric values are passed as numbers.
    #[arg(short, long = "arg", value_name = "NAME=VALUE")]
    pub args: Vec<String>,

    #[command(flatten)]
    pub path: PathArgs,
}

/// Run the resolve command.
pub fn run_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let params = args
        .args
        .iter()
        .map(|arg| parse_parameter(arg))
        .collect::<Result<L10nArgs<'_>, _>>()?;

    let localizer = Localizer::load(&args.path.base_dir())?;
    let language = args.lang.unwrap_or_else(|| localizer.language());

    let rendered = localizer.resolve(&args.key, &language, Some(&params));
    ui::print_resolved(&rendered);

    Ok(())
}

fn parse_parameter(arg: &str) -> Result<(&str, L10nValue), CliError> {
    let Some((name, value)) = arg.split_once('=') else {
        return Err(CliError::InvalidArgument(arg.to_string()));
    };
    if name.is_empty() {
        return Err(CliError::InvalidArgument(arg.to_string()));
    }

    let value = match value.parse::<f64>() {
        Ok(number) if number.is_finite() => L10nValue::Number(number),
        _ => L10nValue::from(value),
    };
    Ok((name, value))
}
