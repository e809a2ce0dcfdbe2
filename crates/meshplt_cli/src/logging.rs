use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Verbosity {
	#[arg(
		long,
		short = 'v',
		help = "Use verbose output (or `-vv` and `-vvv` for more verbose output)",
		action = clap::ArgAction::Count,
		global = true,
		overrides_with = "quiet",
	)]
	verbose: u8,

	#[arg(
		long,
		short = 'q',
		help = "Use quiet output (or `-qq` for silent output)",
		action = clap::ArgAction::Count,
		global = true,
		overrides_with = "verbose",
	)]
	quiet: u8,
}

impl Verbosity {
	/// Level filter selected by the `-v` and `-q` counts.
	pub fn level(&self) -> LevelFilter {
		match (self.quiet, self.verbose) {
			(0, 0) => LevelFilter::WARN,
			(0, 1) => LevelFilter::INFO,
			(0, 2) => LevelFilter::DEBUG,
			(0, _) => LevelFilter::TRACE,
			(1, _) => LevelFilter::ERROR,
			_ => LevelFilter::OFF,
		}
	}
}

/// Install the stderr subscriber; `RUST_LOG` directives refine the default level.
pub fn init(level: LevelFilter) {
	let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
	if let Err(err) = installed {
		eprintln!("warning: logging not installed: {err}");
	}
}
