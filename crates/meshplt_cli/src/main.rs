#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;
mod error;
mod logging;

#[derive(Parser)]
#[command(name = "meshplt", about = "Multi-block meshing and plot archive inspection tools")]
struct Cli {
	#[command(flatten)]
	verbosity: logging::Verbosity,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Load an archive and summarize what was read.
	Info(cmd::info::Args),
	/// List the archive's field dictionary.
	Dict(cmd::dict::Args),
	/// List committed states and optionally sample one field.
	States(cmd::states::Args),
	/// Build a graded hex mesh from a JSON block description.
	Mbmesh(cmd::mbmesh::Args),
}

fn main() {
	let cli = Cli::parse();
	logging::init(cli.verbosity.level());

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> error::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Dict(args) => cmd::dict::run(args),
		Commands::States(args) => cmd::states::run(args),
		Commands::Mbmesh(args) => cmd::mbmesh::run(args),
	}
}
