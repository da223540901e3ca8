//! Command-line interface definitions for the `cpi-infra` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `cpi-infra` binary.
#[derive(Debug, Parser)]
#[command(
    name = "cpi-infra",
    about = "Validate network definitions consumed by the cloud provider interface",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Validate a JSON subnet definition and print the normalised result.
    #[command(
        name = "validate-subnet",
        about = "Validate a JSON subnet definition and print the normalised result"
    )]
    ValidateSubnet(ValidateSubnetCommand),
}

/// Arguments for the `cpi-infra validate-subnet` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ValidateSubnetCommand {
    /// Path to a JSON document with `range`, `gateway` and `cloud_properties`.
    #[arg(value_name = "PATH")]
    pub(crate) path: String,
}
