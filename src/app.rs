use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::GameSession;
use crate::timer::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Playing,
    Score,
}

/// What the event loop should do after handling a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Terminal host: owns the current session and reacts to its finish event
#[derive(Debug)]
pub struct App<C: Clock + Clone> {
    pub session: GameSession<C>,
    pub state: AppState,
    pub final_score: i32,
    pub rounds: u64,
    clock: C,
    seed: Option<u64>,
    finish_signal: Rc<Cell<bool>>,
}

fn start_session<C: Clock + Clone>(
    clock: &C,
    seed: Option<u64>,
) -> (GameSession<C>, Rc<Cell<bool>>) {
    let mut session = GameSession::with_clock(clock.clone(), seed);
    let signal = Rc::new(Cell::new(false));
    let raised = Rc::clone(&signal);
    session.observe_finished(move |finished| {
        if *finished {
            raised.set(true);
        }
    });
    (session, signal)
}

impl<C: Clock + Clone> App<C> {
    pub fn new(clock: C, seed: Option<u64>) -> Self {
        let (session, finish_signal) = start_session(&clock, seed);
        Self {
            session,
            state: AppState::Playing,
            final_score: 0,
            rounds: 1,
            clock,
            seed,
            finish_signal,
        }
    }

    /// Throw away the current session and start a fresh one
    pub fn play_again(&mut self) {
        // a fixed seed still gives every round its own order
        let seed = self.seed.map(|s| s.wrapping_add(self.rounds));
        let (session, finish_signal) = start_session(&self.clock, seed);
        self.session.dispose();
        self.session = session;
        self.finish_signal = finish_signal;
        self.state = AppState::Playing;
        self.final_score = 0;
        self.rounds += 1;
    }

    /// UI tick: deliver due countdown ticks and pick up the finish event
    pub fn on_tick(&mut self) {
        self.session.pump();
        self.check_finished();
    }

    fn check_finished(&mut self) {
        if self.finish_signal.replace(false) {
            self.final_score = self.session.score();
            self.session.acknowledge_finish();
            self.state = AppState::Score;
            tracing::info!(score = self.final_score, round = self.rounds, "showing score");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match (self.state, key.code) {
            (_, KeyCode::Esc) | (_, KeyCode::Char('q')) => return Control::Quit,
            (AppState::Playing, KeyCode::Char('c') | KeyCode::Enter | KeyCode::Right) => {
                self.session.correct();
            }
            (AppState::Playing, KeyCode::Char('s') | KeyCode::Char(' ') | KeyCode::Left) => {
                self.session.skip();
            }
            (AppState::Score, KeyCode::Char('r') | KeyCode::Enter) => self.play_again(),
            _ => {}
        }

        Control::Continue
    }

    /// Tear down the session on the way out
    pub fn shutdown(&mut self) {
        self.session.dispose();
    }
}
