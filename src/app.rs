use std::time::Duration;

use crate::config::GridConfig;
use crate::engine::{GameEngine, RunState, TickResult};
use crate::input::{map_key, Command};
use crate::scheduler::TickScheduler;
use crate::term::TermRenderer;

/// Wires the engine, scheduler, renderer and input mapping into the host
/// loop: poll keys until the next tick is due while Running, block on keys
/// while Idle or GameOver.
pub struct App {
    engine: GameEngine,
    term: TermRenderer,
    scheduler: TickScheduler,
    quit: bool,
}

impl App {
    pub fn new(config: GridConfig) -> Self {
        let engine = GameEngine::new(config);
        let scheduler = TickScheduler::new(engine.tick_interval());
        let term = TermRenderer::new(config.grid_count());
        App { engine, term, scheduler, quit: false }
    }

    pub fn run(&mut self) -> crossterm::Result<()> {
        self.term.setup()?;
        let res = self.event_loop();
        let restored = self.term.restore();
        res.and(restored)
    }

    fn event_loop(&mut self) -> crossterm::Result<()> {
        self.term.draw_frame(&self.engine)?;
        self.term.show_message(&[
            "Arrow keys or WASD to steer",
            "Space to start",
            "Q to quit",
        ])?;

        while !self.quit {
            match self.engine.run_state() {
                RunState::Running => self.running_step()?,
                RunState::Idle | RunState::GameOver => {
                    let ev = self.term.read_key_blocking()?;
                    if let Some(cmd) = map_key(&ev) {
                        self.apply(cmd)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn running_step(&mut self) -> crossterm::Result<()> {
        // Sleep on the input queue until the tick deadline, then drain
        // whatever else is buffered. Only the last accepted steer before
        // the tick matters.
        let mut key = self.term.poll_key(self.scheduler.until_next())?;
        while let Some(ev) = key {
            if let Some(cmd) = map_key(&ev) {
                self.apply(cmd)?;
            }
            if self.quit || self.engine.run_state() != RunState::Running {
                return Ok(());
            }
            key = self.term.poll_key(Duration::from_millis(0))?;
        }

        if self.scheduler.tick_due() {
            match self.engine.tick() {
                TickResult::Moved { reschedule, .. } => {
                    if let Some(interval) = reschedule {
                        self.scheduler.reschedule(interval);
                    }
                    self.term.draw_frame(&self.engine)?;
                }
                TickResult::Crashed => self.finish_run("Game over!")?,
                TickResult::Won => self.finish_run("You won!")?,
            }
        }
        Ok(())
    }

    fn finish_run(&mut self, headline: &str) -> crossterm::Result<()> {
        self.term.draw_frame(&self.engine)?;
        let score = format!("Final score: {}", self.engine.score());
        self.term.show_message(&[
            headline,
            &score,
            "",
            "Space to play again",
            "Q to quit",
        ])
    }

    fn apply(&mut self, cmd: Command) -> crossterm::Result<()> {
        match cmd {
            Command::Steer(dir) => self.engine.set_pending_direction(dir),
            Command::ToggleRun => self.toggle_run()?,
            Command::Quit => self.quit = true,
        }
        Ok(())
    }

    fn toggle_run(&mut self) -> crossterm::Result<()> {
        match self.engine.run_state() {
            RunState::Running => {
                self.engine.pause();
                self.term.draw_frame(&self.engine)?;
                self.term.show_message(&[
                    "Paused",
                    "Space starts a new game",
                    "Q to quit",
                ])
            }
            RunState::Idle | RunState::GameOver => {
                self.engine.start();
                self.scheduler.reschedule(self.engine.tick_interval());
                self.term.draw_frame(&self.engine)
            }
        }
    }
}
