//! keybridge -- Windows input synthesis and global media-key bridge.
//!
//! Entry point: configuration, logging, and the message loop.
//!
//! Requests arrive as JSON lines on stdin; replies and media-key events go
//! out as JSON lines on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use keybridge::config::Config;

fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("keybridge: {e}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    log::info!("keybridge v{}", env!("CARGO_PKG_VERSION"));

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> Result<(), keybridge::platform::PlatformError> {
    use std::io::{self, BufRead, Write};
    use std::sync::mpsc;
    use std::thread;

    use keybridge::channel::Bridge;
    use keybridge::hotkey::MediaKeyListener;
    use keybridge::platform::windows::message_loop::{self, LoopMessage, LoopWaker};
    use keybridge::platform::{self, FocusTargetResolver, NoFocus};
    use keybridge::synth::InputSynthesizer;

    // Hotkeys and the waker both bind to this thread.
    let waker = LoopWaker::for_current_thread();

    let focus: Box<dyn FocusTargetResolver> = if config.focus.enabled {
        platform::create_focus_resolver(config.focus.process_names.clone())
    } else {
        Box::new(NoFocus)
    };
    let synth = InputSynthesizer::new(
        platform::create_input_backend()?,
        focus,
        config.focus.settle_delay(),
    );
    let listener = MediaKeyListener::new(platform::create_hotkey_registrar()?);
    let mut bridge = Bridge::new(synth, listener);

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                if line_tx.send(line).is_err() || !waker.wake() {
                    break;
                }
            }
            log::info!("stdin closed, shutting down");
            waker.quit();
        })
        .map_err(|e| platform::PlatformError::Other(format!("cannot spawn stdin reader: {e}")))?;

    let mut stdout = io::stdout().lock();
    let mut written: io::Result<()> = Ok(());

    message_loop::run(|message| {
        match message {
            LoopMessage::Hotkey(id) => bridge.on_hotkey(id),
            LoopMessage::RequestsPending => {
                if written.is_ok() {
                    written = bridge.serve_lines(line_rx.try_iter(), &mut stdout);
                }
            }
        }
        if written.is_ok() {
            written = bridge.write_events(&mut stdout);
        }
        if let Err(e) = &written {
            log::error!("cannot write to stdout: {e}");
            waker.quit();
        }
    })?;

    // Dropping the bridge releases any hotkeys still held.
    drop(bridge);
    let _ = stdout.flush();
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> Result<(), keybridge::platform::PlatformError> {
    keybridge::platform::create_input_backend().map(|_| ())
}
