use std::io::{self, Write};

use log::LevelFilter;
use pawns_chess::*;

fn main() -> io::Result<()> {
    init_logging();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();

    writeln!(output, "Pawns-Only Chess")?;
    let mut game = GameController::setup(&mut input, &mut output)?;
    game.run(&mut input, &mut output)?;
    Ok(())
}

/// Diagnostics go to stderr so they never mix into the board output. Level
/// comes from `PAWNS_CHESS_LOG` (e.g. `debug`), defaulting to warnings only.
fn init_logging() {
    let level = std::env::var("PAWNS_CHESS_LOG")
        .ok()
        .and_then(|raw| raw.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Warn);

    let applied = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply();
    if let Err(err) = applied {
        eprintln!("logging unavailable: {err}");
    }
}
