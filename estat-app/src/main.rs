#![warn(unused_qualifications)]

mod args;
mod files;
mod presets;
mod project;
mod solve;

use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    bail,
};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use crate::files::SceneFile;

fn main() -> Result<(), Error> {
    let _ = dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let args = Args::parse();
    match args.command {
        Command::Solve(args) => solve::run_solve(args)?,
        Command::DumpDefaultScene { output, format } => {
            let scene_file = SceneFile::default();
            let scene_file = match format.as_str() {
                "toml" => toml::to_string_pretty(&scene_file)?,
                "json" => serde_json::to_string_pretty(&scene_file)?,
                _ => bail!("Invalid format: {format}"),
            };
            if let Some(output) = &output {
                std::fs::write(output, &scene_file)?;
            }
            else {
                println!("{scene_file}");
            }
        }
        Command::ListPresets => {
            for name in presets::preset_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

#[derive(Debug, Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a solve and dump the raw potential
    Solve(args::SolveArgs),
    /// Write a template scene file with all defaults filled in
    DumpDefaultScene {
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(short, long, default_value = "toml")]
        format: String,
    },
    /// List the built-in demonstration scenes
    ListPresets,
}
