use clap::Parser;
use go2web::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let stdout = std::io::stdout();
    cli::run(cli, &mut stdout.lock())
}
