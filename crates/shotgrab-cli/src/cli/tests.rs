//! CLI parse tests.

use super::Cli;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_username_and_dest() {
    let cli = Cli::try_parse_from(["shotgrab", "someone", "/tmp/shots"]).unwrap();
    assert_eq!(cli.username, "someone");
    assert_eq!(cli.dest, Path::new("/tmp/shots"));
}

#[test]
fn cli_parse_dest_with_spaces() {
    let cli = Cli::try_parse_from(["shotgrab", "someone", "My Pictures/Steam"]).unwrap();
    assert_eq!(cli.dest, Path::new("My Pictures/Steam"));
}

#[test]
fn cli_rejects_missing_args() {
    let err = Cli::try_parse_from(["shotgrab"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    let err = Cli::try_parse_from(["shotgrab", "someone"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn cli_rejects_extra_args() {
    assert!(Cli::try_parse_from(["shotgrab", "a", "b", "c"]).is_err());
}

#[test]
fn cli_help_is_not_a_usage_error() {
    let err = Cli::try_parse_from(["shotgrab", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
}

#[test]
fn cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
