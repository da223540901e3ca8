//! Binary entry point for the `cpi-infra` developer tool.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use clap::Parser;
use thiserror::Error;
use tracing::debug;

use cpi_infra::{Subnet, SubnetDefinition, SubnetError, telemetry};

mod cli;

use cli::{Cli, ValidateSubnetCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("invalid subnet definition JSON in {path}: {message}")]
    Parse { path: String, message: String },
    #[error(transparent)]
    Invalid(#[from] SubnetError),
}

fn main() {
    telemetry::init();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            write_error(io::stderr(), &err);
            1
        }
    };

    process::exit(exit_code);
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::ValidateSubnet(command) => validate_subnet(&command),
    }
}

fn validate_subnet(command: &ValidateSubnetCommand) -> Result<(), CliError> {
    let contents = read_definition(Utf8Path::new(&command.path))?;
    let definition: SubnetDefinition =
        serde_json::from_str(&contents).map_err(|err| CliError::Parse {
            path: command.path.clone(),
            message: err.to_string(),
        })?;
    let subnet = Subnet::from_definition(&definition)?;
    debug!(path = %command.path, "subnet definition is valid");
    write_summary(io::stdout(), &subnet);
    Ok(())
}

fn read_definition(path: &Utf8Path) -> Result<String, CliError> {
    let read_error = |message: String| CliError::Read {
        path: path.to_string(),
        message,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(String::from("path is missing a file name")))?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| read_error(err.to_string()))?;
    dir.read_to_string(file_name)
        .map_err(|err| read_error(err.to_string()))
}

fn write_summary(mut target: impl Write, subnet: &Subnet) {
    let properties = subnet.cloud_properties();
    let unset = "(controller default)";
    writeln!(target, "range: {}", subnet.range()).ok();
    writeln!(target, "gateway: {}", subnet.gateway()).ok();
    writeln!(target, "edge_cluster_id: {}", properties.edge_cluster_id).ok();
    writeln!(target, "t0_router_id: {}", properties.t0_router_id).ok();
    writeln!(target, "transport_zone_id: {}", properties.transport_zone_id).ok();
    writeln!(
        target,
        "t1_name: {}",
        properties.t1_name.as_deref().unwrap_or(unset)
    )
    .ok();
    writeln!(
        target,
        "switch_name: {}",
        properties.switch_name.as_deref().unwrap_or(unset)
    )
    .ok();
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn subnet() -> Subnet {
        Subnet::from_definition(&SubnetDefinition::new(
            "192.168.111.0/24",
            "192.168.111.1",
            json!({
                "edge_cluster_id": "cluster_id",
                "t0_router_id": "t0-router-id",
                "transport_zone_id": "zone-id",
                "t1_name": "router-name",
            }),
        ))
        .expect("valid subnet")
    }

    #[test]
    fn summary_lists_every_field() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &subnet());
        let rendered = String::from_utf8(buf).expect("utf8");

        assert!(rendered.contains("range: 192.168.111.0/24"), "{rendered}");
        assert!(rendered.contains("gateway: 192.168.111.1"), "{rendered}");
        assert!(rendered.contains("t1_name: router-name"), "{rendered}");
        assert!(
            rendered.contains("switch_name: (controller default)"),
            "{rendered}"
        );
    }

    #[test]
    fn write_error_renders_validation_message() {
        let mut buf = Vec::new();
        write_error(&mut buf, &CliError::Invalid(SubnetError::InvalidGateway));
        let rendered = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            rendered,
            "Incorrect subnet definition. Proper gateway must be given\n"
        );
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = read_definition(Utf8Path::new("/nonexistent/cpi-infra/subnet.json"))
            .expect_err("file does not exist");
        assert!(
            err.to_string()
                .starts_with("failed to read /nonexistent/cpi-infra/subnet.json"),
            "{err}"
        );
    }
}
