//! CLI entry point for seamless image cloning

use clap::Parser;
use env_logger::Env;
use seamclone::io::cli::{Cli, CloneRunner};

fn main() -> seamclone::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    CloneRunner::new(cli).run().map(|_| ())
}
