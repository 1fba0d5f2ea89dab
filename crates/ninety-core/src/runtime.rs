//! Real-time driver for a [`Session`].
//!
//! The session itself never sleeps. [`Runner`] maps wall-clock time (scaled
//! by `runtime.speed`) onto the session clock on a fixed interval and
//! applies host [`Command`]s between ticks. Everything runs on one task, so
//! commands and timer fires never interleave.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::Result;
use crate::events::Event;
use crate::session::{Session, Visibility};
use crate::storage::RuntimeConfig;

/// Input from the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Restart,
    Visibility(Visibility),
    /// Emit an `Event::StateSnapshot`.
    Snapshot,
    Quit,
}

/// Apply one host command to `session`.
///
/// With `reset_on_interruption`, a hidden host that flags an interruption
/// sends the session straight back to `Start`. `Snapshot` and `Quit` are
/// left to the caller.
pub fn dispatch(session: &mut Session, cmd: Command, reset_on_interruption: bool) -> Result<()> {
    match cmd {
        Command::Start => session.start_session()?,
        Command::Reset => session.reset_session(),
        Command::Restart => session.restart_session()?,
        Command::Visibility(visibility) => {
            if session.set_visibility(visibility) && reset_on_interruption {
                session.reset_session();
            }
        }
        Command::Snapshot | Command::Quit => {}
    }
    Ok(())
}

pub struct Runner {
    session: Session,
    speed: f64,
    resolution: Duration,
    reset_on_interruption: bool,
}

impl Runner {
    pub fn new(session: Session, config: &RuntimeConfig) -> Self {
        Self {
            session,
            speed: config.speed,
            resolution: Duration::from_millis(config.resolution_ms.max(1)),
            reset_on_interruption: config.reset_on_interruption,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drive the session until `Quit`, the command channel closes, or the
    /// event receiver is dropped. Returns the session in its final state.
    ///
    /// # Errors
    ///
    /// Propagates a failed `Start`/`Restart` (no valid text set).
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Result<Session> {
        let origin = Instant::now();
        let base_ms = self.session.clock_ms();
        let mut ticker = tokio::time::interval(self.resolution);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(
            speed = self.speed,
            resolution_ms = self.resolution.as_millis() as u64,
            "runner started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.sync_clock(origin, base_ms),
                cmd = commands.recv() => {
                    self.sync_clock(origin, base_ms);
                    match cmd {
                        None | Some(Command::Quit) => {
                            self.forward(&events);
                            break;
                        }
                        Some(cmd) => {
                            if !self.apply(cmd, &events)? {
                                tracing::debug!("event receiver dropped, stopping runner");
                                break;
                            }
                        }
                    }
                }
            }
            if !self.forward(&events) {
                tracing::debug!("event receiver dropped, stopping runner");
                break;
            }
        }

        Ok(self.session)
    }

    fn sync_clock(&mut self, origin: Instant, base_ms: u64) {
        let scaled_ms = origin.elapsed().as_secs_f64() * 1_000.0 * self.speed;
        self.session.advance_to(base_ms.saturating_add(scaled_ms as u64));
    }

    /// Returns false once nobody is listening.
    fn apply(&mut self, cmd: Command, events: &mpsc::UnboundedSender<Event>) -> Result<bool> {
        if cmd == Command::Snapshot {
            let snapshot = self.session.snapshot_event();
            return Ok(self.forward(events) && events.send(snapshot).is_ok());
        }
        dispatch(&mut self.session, cmd, self.reset_on_interruption)?;
        Ok(true)
    }

    /// Returns false once nobody is listening.
    fn forward(&mut self, events: &mpsc::UnboundedSender<Event>) -> bool {
        for event in self.session.drain_events() {
            if events.send(event).is_err() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentCue;
    use crate::texts::{FirstSelector, TextCatalog};
    use crate::timer::Phase;
    use tokio::task::JoinHandle;

    fn spawn(
        config: RuntimeConfig,
    ) -> (
        mpsc::Sender<Command>,
        mpsc::UnboundedReceiver<Event>,
        JoinHandle<Result<Session>>,
    ) {
        let session = Session::new(
            TextCatalog::default(),
            Box::new(FirstSelector),
            Box::new(SilentCue),
        )
        .unwrap();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Runner::new(session, &config).run(cmd_rx, ev_tx));
        (cmd_tx, ev_rx, handle)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_completes_in_real_time() {
        let (cmd, mut events, handle) = spawn(RuntimeConfig::default());
        cmd.send(Command::Start).await.unwrap();
        tokio::time::sleep(Duration::from_secs(91)).await;
        cmd.send(Command::Quit).await.unwrap();

        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(session.elapsed_secs(), 90);
        assert!(drain(&mut events)
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn speed_scales_the_session_clock() {
        let config = RuntimeConfig {
            speed: 10.0,
            ..RuntimeConfig::default()
        };
        let (cmd, _events, handle) = spawn(config);
        cmd.send(Command::Start).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        cmd.send(Command::Quit).await.unwrap();

        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn interruption_resets_to_start_when_configured() {
        let (cmd, mut events, handle) = spawn(RuntimeConfig::default());
        cmd.send(Command::Start).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        cmd.send(Command::Visibility(Visibility::Hidden)).await.unwrap();
        cmd.send(Command::Snapshot).await.unwrap();
        cmd.send(Command::Quit).await.unwrap();

        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.is_interrupted());

        let snapshot = drain(&mut events).into_iter().find_map(|e| match e {
            Event::StateSnapshot { snapshot, .. } => Some(snapshot),
            _ => None,
        });
        let snapshot = snapshot.expect("snapshot event");
        assert_eq!(snapshot.phase, Phase::Start);
        assert!(snapshot.interrupted);
    }

    #[tokio::test(start_paused = true)]
    async fn interruption_only_flags_when_reset_is_disabled() {
        let config = RuntimeConfig {
            reset_on_interruption: false,
            ..RuntimeConfig::default()
        };
        let (cmd, _events, handle) = spawn(config);
        cmd.send(Command::Start).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        cmd.send(Command::Visibility(Visibility::Hidden)).await.unwrap();
        cmd.send(Command::Quit).await.unwrap();

        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Breathing);
        assert!(session.is_interrupted());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_to_a_dropped_receiver_stops_the_runner() {
        let (cmd, events, handle) = spawn(RuntimeConfig::default());
        drop(events);
        cmd.send(Command::Snapshot).await.unwrap();

        let session = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner stops without a Quit")
            .unwrap()
            .unwrap();
        assert_eq!(session.phase(), Phase::Start);
        drop(cmd);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_the_command_channel_stops_the_runner() {
        let (cmd, _events, handle) = spawn(RuntimeConfig::default());
        drop(cmd);
        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.phase(), Phase::Start);
    }
}
