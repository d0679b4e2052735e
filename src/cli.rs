use crate::scanner::TrailingBlock;
use anyhow::Result;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub struct Config {
    pub input_path: PathBuf,
    pub output_root: PathBuf,
    pub trailing: TrailingBlock,
    pub dry_run: bool,
    pub verbosity: u8,
}

pub fn build_cli() -> Command {
    Command::new("mdunpack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recreates the files embedded in a Markdown document")
        .long_about(
            "Recreates the files embedded in a Markdown document.\n\n\
             Every `## /path/to/file` heading followed by a fenced code block \
             becomes a file under the output directory.",
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("INPUT_PATH")
                .help("Markdown document to unpack")
                .default_value("README.md")
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_PATH")
                .help("Root directory where files are created")
                .default_value(".")
                .num_args(1),
        )
        .arg(
            Arg::new("flush-unterminated")
                .long("flush-unterminated")
                .help("Also write a code block left open at the end of the document")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("List the files that would be written without writing them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase logging verbosity (repeatable)")
                .action(ArgAction::Count),
        )
}

/// Parses the process arguments. Returns `None` after printing help when no
/// flag was passed at all.
pub fn parse_args() -> Result<Option<Config>> {
    let mut cmd = build_cli();
    let matches = cmd.clone().get_matches();

    match config_from_matches(&matches) {
        Some(config) => Ok(Some(config)),
        None => {
            cmd.print_help()?;
            Ok(None)
        }
    }
}

/// Builds a [`Config`], or `None` if every argument was left at its default.
/// Defaults only apply once at least one flag is given explicitly.
pub fn config_from_matches(matches: &ArgMatches) -> Option<Config> {
    let any_flag = matches
        .ids()
        .any(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine));
    if !any_flag {
        return None;
    }

    let path_arg = |name: &str| {
        matches
            .get_one::<String>(name)
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    let trailing = if matches.get_flag("flush-unterminated") {
        TrailingBlock::Flush
    } else {
        TrailingBlock::Discard
    };

    Some(Config {
        input_path: path_arg("input"),
        output_root: path_arg("output"),
        trailing,
        dry_run: matches.get_flag("dry-run"),
        verbosity: matches.get_count("verbose"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<Config> {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("mdunpack").chain(args.iter().copied()))
            .unwrap();
        config_from_matches(&matches)
    }

    #[test]
    fn no_flags_means_usage() {
        assert!(parse(&[]).is_none());
    }

    #[test]
    fn one_flag_fills_in_defaults() {
        let config = parse(&["-o", "out"]).unwrap();
        assert_eq!(config.input_path, PathBuf::from("README.md"));
        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.trailing, TrailingBlock::Discard);
        assert!(!config.dry_run);
    }

    #[test]
    fn explicit_default_counts_as_a_flag() {
        let config = parse(&["-i", "README.md"]).unwrap();
        assert_eq!(config.output_root, PathBuf::from("."));
    }

    #[test]
    fn switches_are_parsed() {
        let config = parse(&["--flush-unterminated", "--dry-run", "-vv"]).unwrap();
        assert_eq!(config.trailing, TrailingBlock::Flush);
        assert!(config.dry_run);
        assert_eq!(config.verbosity, 2);
    }
}
