// Entrypoint for the calculator.
// - Keeps `main` small: detect config, start logging, hand the console to
//   the session loop.
// - Returns `anyhow::Result` so setup failures are reported plainly.

use calculait::config::Config;
use calculait::input::ConsoleSource;
use calculait::{logging, Session};

fn main() -> anyhow::Result<()> {
    let config = Config::detect();
    logging::init_with_config(&config.logging);

    // Installs the Ctrl-C handler; see `input::ConsoleSource`.
    let input = ConsoleSource::new()?;
    let stdout = std::io::stdout();

    // Blocks until the user exits.
    let outcome = Session::new(input, stdout.lock(), config).run()?;
    tracing::debug!(?outcome, "calculator exited");
    Ok(())
}
