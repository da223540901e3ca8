//! Renders manual pages for `cpi-infra` and each of its subcommands into
//! `OUT_DIR`.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

fn render(command: clap::Command, out_dir: &Path, page: &str) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    Man::new(command).render(&mut buffer)?;
    fs::write(out_dir.join(page), buffer)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    for watched in ["build.rs", "src/cli/mod.rs"] {
        writeln!(stdout, "cargo:rerun-if-changed={watched}")?;
    }

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or("OUT_DIR was not set")?;

    let command = cli::Cli::command();
    let name = command.get_name().to_owned();
    for subcommand in command.get_subcommands() {
        let page = format!("{name}-{}.1", subcommand.get_name());
        render(subcommand.clone(), &out_dir, &page)?;
    }
    render(command, &out_dir, &format!("{name}.1"))?;

    Ok(())
}
