//! Writes `pcimaxctl.1` into the directory given as the only argument
//! (`man` by default).

use std::fs;
use std::path::PathBuf;

use clap::CommandFactory;

#[allow(dead_code)]
#[path = "../backends.rs"]
mod backends;
#[allow(dead_code)]
#[path = "../cli.rs"]
mod cli;

fn main() -> std::io::Result<()> {
    let dir = std::env::args_os().nth(1).map_or_else(|| PathBuf::from("man"), PathBuf::from);
    fs::create_dir_all(&dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut page)?;

    let path = dir.join("pcimaxctl.1");
    fs::write(&path, page)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
