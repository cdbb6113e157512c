use crate::prelude::*;

#[test]
fn help_lists_the_core_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("spawn")
        .stdout_has("status")
        .stdout_has("send")
        .stdout_has("kill");
}

#[test]
fn version_prints_something_parseable() {
    cli().args(&["--version"]).passes();
}

#[test]
fn unknown_subcommand_fails_with_a_usage_error() {
    cli().args(&["frobnicate"]).fails().stderr_has("unrecognized");
}
