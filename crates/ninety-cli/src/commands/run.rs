use clap::Args;
use ninety_core::{Command, Config, Event, Runner, Session, Visibility};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::build_session;
use crate::display::Printer;

#[derive(Args)]
pub struct RunArgs {
    /// Clock multiplier (overrides runtime.speed)
    #[arg(long)]
    speed: Option<f64>,
    /// Seed for a reproducible text draw
    #[arg(long)]
    seed: Option<u64>,
    /// Play the ambient cue even if audio.enabled is false
    #[arg(long)]
    audio: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Start the session immediately
    #[arg(long)]
    now: bool,
    /// Exit once a session completes
    #[arg(long)]
    exit_on_complete: bool,
}

const HELP: &str = "commands: start, reset, restart, hide, show, status, quit";

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "s" => Some(Command::Start),
        "reset" | "r" => Some(Command::Reset),
        "restart" => Some(Command::Restart),
        "hide" | "h" => Some(Command::Visibility(Visibility::Hidden)),
        "show" | "v" => Some(Command::Visibility(Visibility::Visible)),
        "status" => Some(Command::Snapshot),
        "quit" | "q" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(speed) = args.speed {
        config.runtime.speed = speed;
        config.validate()?;
    }
    let session = build_session(&config, args.seed, args.audio)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let session = runtime.block_on(drive(session, &config, &args))?;

    tracing::debug!(
        phase = %session.phase(),
        elapsed_secs = session.elapsed_secs(),
        "run finished"
    );
    Ok(())
}

async fn drive(
    session: Session,
    config: &Config,
    args: &RunArgs,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut printer = Printer::new(args.json, session.texts().clone());
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    let runner = tokio::spawn(Runner::new(session, &config.runtime).run(cmd_rx, ev_tx));

    printer.start_screen(false);
    if !args.json {
        eprintln!("{HELP}");
    }

    let mut started = args.now;
    if args.now {
        cmd_tx.send(Command::Start).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = ev_rx.recv() => {
                let Some(event) = event else { break };
                printer.print(&event)?;
                if args.exit_on_complete && matches!(event, Event::SessionCompleted { .. }) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(cmd) => {
                        started |= matches!(cmd, Command::Start | Command::Restart);
                        cmd_tx.send(cmd).await?;
                    }
                    None => eprintln!("unknown command: {} ({HELP})", line.trim()),
                },
                None => {
                    stdin_open = false;
                    // Keep running only if a session is underway and we were asked to see it through.
                    if !(args.exit_on_complete && started) {
                        break;
                    }
                }
            },
        }
    }

    // The runner may already have stopped if the event side closed first.
    let _ = cmd_tx.send(Command::Quit).await;
    let session = runner.await??;
    while let Ok(event) = ev_rx.try_recv() {
        printer.print(&event)?;
    }
    Ok(session)
}
