//! Normal mode: bounce windows as they open
//!
//! One thread, one loop: drain the event socket, react to each event, run a
//! single simulation tick if anything is bouncing, sleep, repeat.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::Result;
use crate::platform::{Compositor, Event, EventStream};
use crate::settings::Settings;
use crate::sim::{Simulation, Spawn};

pub struct Daemon<'a, C: Compositor> {
    wm: &'a C,
    sim: Simulation,
    /// Exact window title that opts a window in
    title: String,
}

impl<'a, C: Compositor> Daemon<'a, C> {
    pub fn new(wm: &'a C, settings: &Settings) -> Self {
        let seed = settings.resolved_seed();
        log::debug!("Simulation seed {seed}");
        Self {
            wm,
            sim: Simulation::new(seed, settings.size_request()).with_speed(settings.speed),
            title: settings.title.clone(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn handle_line(&mut self, line: &str) {
        match Event::parse(line) {
            Some(event) => self.handle_event(event),
            None => log::trace!("Ignoring {line:?}"),
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::WindowOpened { id, workspace, title, .. } => {
                if title != self.title {
                    return;
                }
                match self.sim.add_body(self.wm, id.clone(), workspace) {
                    Ok(Spawn::Placed(_) | Spawn::AlreadyTracked) => {}
                    Ok(Spawn::Closed) => log::info!("Closed {id}: workspace is full"),
                    Ok(Spawn::Vanished) => log::debug!("{id} closed before it could bounce"),
                    Err(e) => log::warn!("Could not add {id}: {e}"),
                }
            }
            Event::WorkspaceFocused(arena) => {
                log::debug!("Workspace {arena} focused");
                self.sim.on_arena_focus_change(self.wm, arena);
            }
            Event::WindowFocused(id) => self.sim.on_entity_focus_change(self.wm, &id),
        }
    }

    /// One loop iteration without the sleep; `false` once the event socket closed
    pub fn turn<R: Read>(&mut self, events: &mut EventStream<R>) -> Result<bool> {
        let poll = events.poll()?;
        for line in &poll.lines {
            self.handle_line(line);
        }
        if poll.closed {
            log::info!("Event socket closed");
            return Ok(false);
        }
        if !self.sim.is_empty() {
            self.sim.tick(self.wm);
        }
        Ok(true)
    }

    /// Loop until the event socket closes or `stop` is set
    pub fn run<R: Read>(&mut self, events: &mut EventStream<R>, interval: Duration, stop: &AtomicBool) -> Result<()> {
        log::info!("Waiting for windows titled {:?}", self.title);
        let result = loop {
            if stop.load(Ordering::SeqCst) {
                log::info!("Stop signal received");
                break Ok(());
            }
            match self.turn(events) {
                Ok(true) => std::thread::sleep(interval),
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.sim.shutdown(self.wm);
        result
    }
}

/// Connect to the event socket and run the daemon until it closes
pub fn run(wm: &impl Compositor, settings: &Settings, stop: Arc<AtomicBool>) -> Result<()> {
    let mut events = EventStream::connect()?;
    Daemon::new(wm, settings).run(&mut events, settings.poll_interval(), &stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockCompositor, client, monitor};
    use crate::sim::{ArenaId, BodyId};
    use std::collections::VecDeque;
    use std::io;

    /// Event socket replaying canned chunks, then EOF
    struct Replay(VecDeque<Vec<u8>>);

    impl Read for Replay {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    /// Yields its chunk once, then would block forever
    struct Idle(Option<Vec<u8>>);

    impl Read for Idle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.take() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Err(io::ErrorKind::WouldBlock.into()),
            }
        }
    }

    fn settings() -> Settings {
        Settings {
            seed: Some(3),
            ..Default::default()
        }
    }

    fn setup() -> MockCompositor {
        let wm = MockCompositor::new(vec![monitor(1, 1920, 1080, 0)]);
        wm.add_client(client("aa", 1, [0, 0], [800, 600], false));
        wm.add_client(client("bb", 1, [800, 0], [800, 600], false));
        wm
    }

    #[test]
    fn test_only_matching_titles_bounce() {
        let wm = setup();
        let mut daemon = Daemon::new(&wm, &settings());
        daemon.handle_line("openwindow>>aa,1,kitty,DVD");
        daemon.handle_line("openwindow>>bb,1,kitty,DVD player");
        daemon.handle_line("garbage");
        assert_eq!(daemon.simulation().len(), 1);
        assert!(daemon.simulation().contains(&BodyId::new("aa")));
    }

    #[test]
    fn test_custom_title() {
        let wm = setup();
        let s = Settings {
            title: "bounce, please".into(),
            ..settings()
        };
        let mut daemon = Daemon::new(&wm, &s);
        daemon.handle_line("openwindow>>bb,1,kitty,bounce, please");
        assert!(daemon.simulation().contains(&BodyId::new("bb")));
    }

    #[test]
    fn test_focus_events_route_to_suppression() {
        let wm = setup();
        let mut daemon = Daemon::new(&wm, &settings());
        daemon.handle_line("openwindow>>aa,1,kitty,DVD");
        assert!(!*wm.animations.borrow());

        daemon.handle_line("workspacev2>>4,4");
        assert!(*wm.animations.borrow());
        daemon.handle_line("workspace>>1");
        assert!(!*wm.animations.borrow());
        assert!(daemon.simulation().suppression().is_engaged(ArenaId(1)));
    }

    #[test]
    fn test_turn_ticks_and_stops_on_close() {
        let wm = setup();
        let mut daemon = Daemon::new(&wm, &settings());
        let mut events = EventStream::new(Idle(Some(b"openwindow>>aa,1,kitty,DVD\n".to_vec())));

        assert!(daemon.turn(&mut events).unwrap());
        assert_eq!(daemon.simulation().time_ticks, 1);
        assert!(daemon.turn(&mut events).unwrap());
        assert_eq!(daemon.simulation().time_ticks, 2);

        let mut closed = EventStream::new(Replay(VecDeque::new()));
        assert!(!daemon.turn(&mut closed).unwrap());
    }

    #[test]
    fn test_run_restores_animations_when_socket_closes() {
        let wm = setup();
        let mut daemon = Daemon::new(&wm, &settings());
        let mut events = EventStream::new(Replay(VecDeque::from([
            b"openwindow>>aa,1,kit".to_vec(),
            b"ty,DVD\nopenwindow>>bb,1,kitty,DVD\n".to_vec(),
        ])));

        let stop = AtomicBool::new(false);
        daemon.run(&mut events, Duration::from_millis(1), &stop).unwrap();
        assert!(daemon.simulation().is_empty());
        assert_eq!(wm.animation_writes(), vec![false, true]);
    }

    #[test]
    fn test_run_honors_stop_flag() {
        let wm = setup();
        let mut daemon = Daemon::new(&wm, &settings());
        daemon.handle_line("openwindow>>aa,1,kitty,DVD");
        let mut events = EventStream::new(Idle(None));
        let stop = AtomicBool::new(true);
        daemon.run(&mut events, Duration::from_millis(1), &stop).unwrap();
        assert!(*wm.animations.borrow());
        assert_eq!(daemon.simulation().time_ticks, 0);
    }
}
