use clap::Args;
use ninety_core::{dispatch, Command, Config, Visibility};

use super::build_session;
use crate::display::Printer;

#[derive(Args)]
pub struct SimulateArgs {
    /// Stop the virtual clock after this many seconds
    #[arg(long, default_value_t = 95)]
    until: u64,
    /// Send the host to the background at this second
    #[arg(long)]
    hide_at: Option<u64>,
    /// Bring the host back at this second
    #[arg(long)]
    show_at: Option<u64>,
    /// Reset to the start screen at this second
    #[arg(long)]
    reset_at: Option<u64>,
    /// Restart the session at this second
    #[arg(long)]
    restart_at: Option<u64>,
    /// Seed for a reproducible text draw
    #[arg(long)]
    seed: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
    /// Ignore the config file
    #[arg(long)]
    defaults: bool,
}

impl SimulateArgs {
    /// Host actions in time order. Ties keep flag order.
    fn actions(&self) -> Vec<(u64, Command)> {
        let mut actions: Vec<(u64, Command)> = [
            (self.hide_at, Command::Visibility(Visibility::Hidden)),
            (self.show_at, Command::Visibility(Visibility::Visible)),
            (self.reset_at, Command::Reset),
            (self.restart_at, Command::Restart),
        ]
        .into_iter()
        .filter_map(|(at, cmd)| at.map(|at| (at, cmd)))
        .collect();
        actions.sort_by_key(|(at, _)| *at);
        actions
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = if args.defaults {
        Config::default()
    } else {
        Config::load()?
    };
    let mut session = build_session(&config, args.seed, false)?;
    let mut printer = Printer::new(args.json, session.texts().clone());

    session.start_session()?;
    let origin_ms = session.clock_ms();
    let at_ms = |secs: u64| origin_ms.saturating_add(secs.saturating_mul(1_000));

    for (at, cmd) in args.actions() {
        if at > args.until {
            break;
        }
        session.advance_to(at_ms(at));
        dispatch(&mut session, cmd, config.runtime.reset_on_interruption)?;
        for event in session.drain_events() {
            printer.print(&event)?;
        }
    }

    session.advance_to(at_ms(args.until));
    for event in session.drain_events() {
        printer.print(&event)?;
    }
    printer.print(&session.snapshot_event())?;

    tracing::debug!(
        phase = %session.phase(),
        elapsed_secs = session.elapsed_secs(),
        "simulation finished"
    );
    Ok(())
}
