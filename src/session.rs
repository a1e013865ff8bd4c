use std::time::Duration;

use crate::observable::{Observable, SubscriptionId};
use crate::timer::{Clock, Countdown, SystemClock};
use crate::util::format_elapsed;
use crate::word_queue::WordQueue;

/// Total length of a game
pub const COUNTDOWN_TIME: Duration = Duration::from_millis(60_000);
/// Interval between countdown ticks
pub const ONE_SECOND: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Running,
    Finished,
}

/// One play-through: current word, score and countdown.
///
/// All mutation goes through `correct`, `skip`, `tick`/`pump`,
/// `acknowledge_finish` and `dispose`. Once finished, `correct` and `skip`
/// are ignored; once disposed, everything is.
#[derive(Debug)]
pub struct GameSession<C: Clock = SystemClock> {
    clock: C,
    countdown: Countdown,
    words: WordQueue,
    state: SessionState,
    disposed: bool,

    word: Observable<String>,
    score: Observable<i32>,
    remaining_time: Observable<u64>,
    remaining_time_formatted: Observable<String>,
    finished: Observable<bool>,
}

impl GameSession<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, None)
    }
}

impl Default for GameSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GameSession<C> {
    /// Start a session against `clock`; a seed fixes the word order
    pub fn with_clock(clock: C, seed: Option<u64>) -> Self {
        let countdown = Countdown::start(COUNTDOWN_TIME, ONE_SECOND, clock.now());
        let total_secs = COUNTDOWN_TIME.as_secs();

        let mut session = Self {
            clock,
            countdown,
            words: WordQueue::new(seed),
            state: SessionState::Running,
            disposed: false,
            word: Observable::new(String::new()),
            score: Observable::new(0),
            remaining_time: Observable::new(total_secs),
            remaining_time_formatted: Observable::new(format_elapsed(total_secs)),
            finished: Observable::new(false),
        };
        session.next_word();

        tracing::info!(
            word = %session.current_word(),
            seconds = total_secs,
            "game session created"
        );
        session
    }

    fn next_word(&mut self) {
        let word = self.words.next_word();
        tracing::debug!(word, remaining = self.words.remaining(), "next word");
        self.word.set(word.to_string());
    }

    fn accepts_input(&self) -> bool {
        !self.disposed && self.state == SessionState::Running
    }

    /// The word was guessed: score a point and move on
    pub fn correct(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.score.update(|s| *s += 1);
        tracing::debug!(score = *self.score.get(), "correct");
        self.next_word();
    }

    /// Give up on the word: lose a point and move on
    pub fn skip(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.score.update(|s| *s -= 1);
        tracing::debug!(score = *self.score.get(), "skip");
        self.next_word();
    }

    /// Countdown callback: `until_finished` is the time left in the game.
    ///
    /// Remaining time never goes back up; reaching zero finishes the game.
    pub fn tick(&mut self, until_finished: Duration) {
        if !self.accepts_input() {
            return;
        }

        let secs = until_finished.as_secs().min(*self.remaining_time.get());
        self.remaining_time.set(secs);
        self.remaining_time_formatted.set(format_elapsed(secs));
        tracing::trace!(remaining = secs, "tick");

        if secs == 0 {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.countdown.cancel();
        self.state = SessionState::Finished;
        tracing::info!(score = *self.score.get(), "game finished");
        self.finished.set(true);
    }

    /// Deliver every countdown tick that is due by the session clock.
    ///
    /// Returns how many ticks were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while self.accepts_input() {
            match self.countdown.poll(self.clock.now()) {
                Some(until_finished) => {
                    self.tick(until_finished);
                    delivered += 1;
                }
                None => break,
            }
        }
        delivered
    }

    /// Mark the finish event as handled
    pub fn acknowledge_finish(&mut self) {
        if self.disposed {
            return;
        }
        self.finished.set(false);
    }

    /// Stop the countdown and ignore all further calls. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.countdown.cancel();
        self.disposed = true;
        tracing::info!(score = *self.score.get(), "game session destroyed");
    }

    pub fn current_word(&self) -> &str {
        self.word.get()
    }

    pub fn score(&self) -> i32 {
        *self.score.get()
    }

    /// Whole seconds left on the countdown
    pub fn remaining_time(&self) -> u64 {
        *self.remaining_time.get()
    }

    pub fn remaining_time_formatted(&self) -> &str {
        self.remaining_time_formatted.get()
    }

    /// Whether the finish event is raised and not yet acknowledged
    pub fn finished(&self) -> bool {
        *self.finished.get()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn words(&self) -> &WordQueue {
        &self.words
    }

    pub fn observe_word(&mut self, f: impl FnMut(&String) + 'static) -> SubscriptionId {
        self.word.subscribe(f)
    }

    pub fn observe_score(&mut self, f: impl FnMut(&i32) + 'static) -> SubscriptionId {
        self.score.subscribe(f)
    }

    pub fn observe_remaining_time(&mut self, f: impl FnMut(&u64) + 'static) -> SubscriptionId {
        self.remaining_time.subscribe(f)
    }

    pub fn observe_remaining_time_formatted(
        &mut self,
        f: impl FnMut(&String) + 'static,
    ) -> SubscriptionId {
        self.remaining_time_formatted.subscribe(f)
    }

    pub fn observe_finished(&mut self, f: impl FnMut(&bool) + 'static) -> SubscriptionId {
        self.finished.subscribe(f)
    }

    /// Drop an observer registered on any field. Returns false if unknown.
    pub fn remove_observer(&mut self, id: SubscriptionId) -> bool {
        self.word.unsubscribe(id)
            || self.score.unsubscribe(id)
            || self.remaining_time.unsubscribe(id)
            || self.remaining_time_formatted.unsubscribe(id)
            || self.finished.unsubscribe(id)
    }
}

impl<C: Clock> Drop for GameSession<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use crate::word_queue::WORDS;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;

    fn seeded(seed: u64) -> (GameSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (GameSession::with_clock(clock.clone(), Some(seed)), clock)
    }

    #[test]
    fn test_new_session_defaults() {
        let (session, _) = seeded(1);

        assert_eq!(session.score(), 0);
        assert_eq!(session.remaining_time(), 60);
        assert_eq!(session.remaining_time_formatted(), "01:00");
        assert!(!session.finished());
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.is_timer_running());
        assert!(WORDS.contains(&session.current_word()));
        assert_eq!(session.words().remaining(), WORDS.len() - 1);
    }

    #[test]
    fn test_first_word_is_front_of_shuffle() {
        let expected = WordQueue::new(Some(9)).upcoming().next();
        let (session, _) = seeded(9);
        assert_eq!(Some(session.current_word()), expected);
    }

    #[test]
    fn test_score_tracks_correct_minus_skip() {
        let (mut session, _) = seeded(2);
        let moves = [true, false, false, false, true, false, false];
        for correct in moves {
            if correct {
                session.correct();
            } else {
                session.skip();
            }
        }
        assert_eq!(session.score(), -3);
    }

    #[test]
    fn test_three_correct_one_skip_lands_on_fifth_word() {
        let expected: Vec<&str> = WordQueue::new(Some(5)).upcoming().take(5).collect();
        let (mut session, _) = seeded(5);

        session.correct();
        session.correct();
        session.correct();
        session.skip();

        assert_eq!(session.score(), 2);
        assert_eq!(session.current_word(), expected[4]);
    }

    #[test]
    fn test_exhaustion_reshuffles_without_finishing() {
        let (mut session, _) = seeded(11);

        let mut first_round = HashSet::new();
        first_round.insert(session.current_word().to_string());
        for _ in 1..WORDS.len() {
            session.correct();
            first_round.insert(session.current_word().to_string());
        }
        assert_eq!(first_round.len(), WORDS.len());

        let mut second_round = HashSet::new();
        for _ in 0..WORDS.len() {
            session.skip();
            second_round.insert(session.current_word().to_string());
        }
        assert_eq!(second_round, first_round);
        assert_eq!(session.words().refills(), 1);
        assert!(!session.finished());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_tick_counts_down_by_one() {
        let (mut session, _) = seeded(3);
        for expected in (0..60u64).rev() {
            session.tick(Duration::from_secs(expected));
            assert_eq!(session.remaining_time(), expected);
        }
        assert!(session.finished());
    }

    #[test]
    fn test_tick_never_increases_remaining() {
        let (mut session, _) = seeded(3);
        session.tick(Duration::from_secs(30));
        session.tick(Duration::from_secs(45));
        assert_eq!(session.remaining_time(), 30);
        assert_eq!(session.remaining_time_formatted(), "00:30");
    }

    #[test]
    fn test_sixty_seconds_finishes_the_game() {
        let (mut session, clock) = seeded(4);

        clock.advance(COUNTDOWN_TIME);
        assert_eq!(session.pump(), 60);

        assert_eq!(session.remaining_time(), 0);
        assert_eq!(session.remaining_time_formatted(), "00:00");
        assert!(session.finished());
        assert_eq!(session.state(), SessionState::Finished);
        assert!(!session.is_timer_running());
    }

    #[test]
    fn test_pump_follows_the_clock() {
        let (mut session, clock) = seeded(4);

        clock.advance(Duration::from_millis(2500));
        assert_eq!(session.pump(), 2);
        assert_eq!(session.remaining_time(), 58);

        assert_eq!(session.pump(), 0);
        clock.advance(Duration::from_millis(500));
        assert_eq!(session.pump(), 1);
        assert_eq!(session.remaining_time_formatted(), "00:57");
    }

    #[test]
    fn test_finished_state_ignores_input_and_ticks() {
        let (mut session, clock) = seeded(6);
        session.correct();
        clock.advance(COUNTDOWN_TIME);
        session.pump();

        let word = session.current_word().to_string();
        session.correct();
        session.skip();
        session.tick(Duration::from_secs(10));
        clock.advance(COUNTDOWN_TIME);

        assert_eq!(session.pump(), 0);
        assert_eq!(session.score(), 1);
        assert_eq!(session.current_word(), word);
        assert_eq!(session.remaining_time(), 0);
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn test_finish_event_fires_once_until_acknowledged() {
        let (mut session, clock) = seeded(8);
        let raised = Rc::new(Cell::new(0));
        let counter = Rc::clone(&raised);
        session.observe_finished(move |finished| {
            if *finished {
                counter.set(counter.get() + 1);
            }
        });

        clock.advance(COUNTDOWN_TIME * 2);
        session.pump();
        session.pump();
        assert_eq!(raised.get(), 1);
        assert!(session.finished());

        session.acknowledge_finish();
        assert!(!session.finished());
        session.pump();
        assert!(!session.finished());
        assert_eq!(raised.get(), 1);
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn test_dispose_stops_the_timer() {
        let (mut session, clock) = seeded(10);
        clock.advance(ONE_SECOND * 5);
        session.pump();

        session.dispose();
        clock.advance(COUNTDOWN_TIME * 2);

        assert_eq!(session.pump(), 0);
        assert!(!session.is_timer_running());
        assert_eq!(session.remaining_time(), 55);
        assert!(!session.finished());
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_dispose_is_idempotent_and_freezes_state() {
        let (mut session, _) = seeded(12);
        session.correct();
        let word = session.current_word().to_string();

        session.dispose();
        session.dispose();
        session.correct();
        session.skip();
        session.tick(Duration::ZERO);
        session.acknowledge_finish();

        assert!(session.is_disposed());
        assert_eq!(session.score(), 1);
        assert_eq!(session.current_word(), word);
        assert!(!session.finished());
    }

    #[test]
    fn test_observers_see_every_change() {
        let (mut session, clock) = seeded(13);
        let words = Rc::new(RefCell::new(Vec::new()));
        let scores = Rc::new(RefCell::new(Vec::new()));
        let times = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&words);
        session.observe_word(move |w| sink.borrow_mut().push(w.clone()));
        let sink = Rc::clone(&scores);
        session.observe_score(move |s| sink.borrow_mut().push(*s));
        let sink = Rc::clone(&times);
        session.observe_remaining_time_formatted(move |t| sink.borrow_mut().push(t.clone()));

        session.correct();
        session.skip();
        session.skip();
        clock.advance(ONE_SECOND);
        session.pump();

        assert_eq!(words.borrow().len(), 4);
        assert_eq!(*scores.borrow(), vec![0, 1, 0, -1]);
        assert_eq!(*times.borrow(), vec!["01:00", "00:59"]);
    }

    #[test]
    fn test_remove_observer() {
        let (mut session, _) = seeded(14);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = session.observe_score(move |_| counter.set(counter.get() + 1));
        let seconds = session.observe_remaining_time(|_| {});

        assert!(session.remove_observer(id));
        assert!(!session.remove_observer(id));
        assert!(session.remove_observer(seconds));
        session.correct();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Running.to_string(), "Running");
        assert_eq!(SessionState::Finished.to_string(), "Finished");
    }
}
