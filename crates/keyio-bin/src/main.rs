//! keyio: replays a scripted key stream against the input dispatcher.

mod game;
mod logging;
mod script;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use keyio_input::BindingConfig;
use log::info;

use game::Game;
use script::InputScript;

#[derive(Parser, Debug)]
#[command(name = "keyio", about = "Polled keyboard dispatcher demo")]
struct Args {
    /// Path to a key binding JSON file. Defaults to the arrow keys and space.
    #[arg(long)]
    bindings: Option<PathBuf>,

    /// Path to a JSON list of `{ tick, code, pressed }` host events.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of game ticks to run.
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Tick period in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Enable debug logs for the keyio crates.
    #[arg(short, long, env = "KEYIO_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose)?;

    let config = match &args.bindings {
        Some(path) => BindingConfig::load_from(path)?,
        None => BindingConfig::default(),
    };
    let mut script = match &args.script {
        Some(path) => InputScript::load_from(path)?,
        None => InputScript::demo(),
    };
    script.truncate(args.ticks);

    let tick_period = Duration::from_millis(args.tick_ms);
    let game = Game::new(config)?;
    info!(
        "Running {} ticks of {} ms with {} scripted events",
        args.ticks,
        args.tick_ms,
        script.steps().len()
    );

    let host = script.replay(game.dispatcher(), tick_period)?;
    game.run(args.ticks, tick_period);
    host.join().map_err(|_| anyhow!("Host event thread panicked"))?;

    info!("Held at exit: {:?}", game.held_actions());
    let dispatcher = game.dispatcher();
    for (code, frame) in game.frames() {
        let action = dispatcher.binding(code).map(String::as_str).unwrap_or("?");
        info!("{} (key {}): frame {}", action, code, frame);
    }
    Ok(())
}
