//! Runs a quiz session on a single task.
//!
//! The driver owns the [`QuizSession`] and is the only place it is mutated.
//! Commands, clock ticks and delayed events are handled one at a time, so
//! transitions never race. Backend calls made while playing run on their own
//! tasks and report back tagged with the session epoch, so a slow backend
//! never holds up commands. Callers talk to it through a [`DriverHandle`] and
//! observe it through a stream of [`QuizEvent`]s.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use wordlink_core::session::{
    FINISH_DELAY, TICK_INTERVAL, WIN_BANNER_DELAY, WIN_BANNER_DURATION,
};
use wordlink_core::{
    active_categories, qualifies, Category, CategoryChoice, ConfirmAction, GuessOutcome,
    HighScore, HighScoreDraft, Identity, Question, QuizSession, SessionResult, SessionSnapshot,
    WinTier,
};

use crate::api::ApiError;
use crate::catalog::{active_questions_or_empty, leaderboard_or_empty, QuizBackend};
use crate::ticker::{DelayedEvents, Ticker};

/// Requests accepted by the driver.
#[derive(Debug)]
pub enum Command {
    ChooseCategory(CategoryChoice),
    Start,
    Guess(String),
    /// Next round, or finish on the last one.
    Confirm,
    SoftReset,
    HardReset,
    SubmitPlayerName(String),
    DismissHighScore,
    ReloadCatalog,
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// What the player sees of a round. The solution stays hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub round_index: usize,
    pub round_count: usize,
    pub question_id: String,
    pub title: String,
    pub category: Category,
    pub clue_words: Vec<String>,
    pub image_url: Option<String>,
}

impl RoundView {
    fn new(question: &Question, round_index: usize, round_count: usize) -> Self {
        Self {
            round_index,
            round_count,
            question_id: question.id.clone(),
            title: question.title.clone(),
            category: question.category,
            clue_words: question.clue_words.clone(),
            image_url: question.image_url.clone(),
        }
    }
}

/// Notifications emitted by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    CatalogLoaded {
        questions: usize,
        categories: Vec<Category>,
    },
    CategoryChosen(CategoryChoice),
    Started {
        category: CategoryChoice,
        round_count: usize,
    },
    RoundStarted(RoundView),
    Revealed(GuessOutcome),
    WinBanner(WinTier),
    WinBannerHidden,
    Finished(SessionResult),
    /// The result earns a leaderboard spot; a player name is expected.
    HighScorePrompt(SessionResult),
    /// The result does not beat the leaderboard.
    NoHighScore(SessionResult),
    HighScoreSaved(HighScore),
    Reset {
        hard: bool,
    },
    /// Something the player should be told, e.g. a rejected action.
    Notice(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlarmKind {
    ShowBanner,
    Finish,
    HideBanner,
}

#[derive(Debug, Clone, Copy)]
struct Alarm {
    kind: AlarmKind,
    epoch: u64,
}

/// Backend work finished on a helper task.
#[derive(Debug)]
enum Reply {
    Catalog(Vec<Question>),
    Leaderboard {
        epoch: u64,
        result: SessionResult,
        board: Vec<HighScore>,
    },
    Submitted {
        epoch: u64,
        result: SessionResult,
        outcome: Result<Option<HighScore>, ApiError>,
    },
}

/// The driver task stopped.
#[derive(Debug, thiserror::Error)]
#[error("quiz driver stopped")]
pub struct DriverStopped;

/// Sends commands to a running driver.
#[derive(Clone)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl DriverHandle {
    pub fn send(&self, command: Command) -> Result<(), DriverStopped> {
        self.commands.send(command).map_err(|_| DriverStopped)
    }

    /// Current session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, DriverStopped> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| DriverStopped)
    }
}

/// Builder for a driver task.
pub struct QuizDriver<B> {
    backend: B,
    identity: Identity,
    catalog: Option<Vec<Question>>,
    rng: StdRng,
}

impl<B: QuizBackend> QuizDriver<B> {
    pub fn new(backend: B, identity: Identity) -> Self {
        Self {
            backend,
            identity,
            catalog: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a known catalog instead of fetching one on startup.
    pub fn with_catalog(mut self, catalog: Vec<Question>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Deterministic round order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Spawn the driver on the current runtime.
    ///
    /// The task ends once every [`DriverHandle`] is dropped.
    pub fn spawn(self) -> (DriverHandle, mpsc::UnboundedReceiver<QuizEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (alarm_tx, alarm_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        let needs_catalog = self.catalog.is_none();
        let task = DriverTask {
            backend: Arc::new(self.backend),
            identity: self.identity,
            catalog: self.catalog.unwrap_or_default(),
            rng: self.rng,
            session: QuizSession::new(),
            pending_result: None,
            submitting: false,
            ticker: None,
            tick_tx,
            alarms: DelayedEvents::new(alarm_tx),
            replies: reply_tx,
            events: event_tx,
        };

        tokio::spawn(task.run(needs_catalog, command_rx, tick_rx, alarm_rx, reply_rx));

        (
            DriverHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }
}

struct DriverTask<B> {
    backend: Arc<B>,
    identity: Identity,
    catalog: Vec<Question>,
    rng: StdRng,
    session: QuizSession,
    /// Qualifying result still waiting for a player name.
    pending_result: Option<SessionResult>,
    /// A submission for `pending_result` is in flight.
    submitting: bool,
    ticker: Option<Ticker>,
    tick_tx: mpsc::UnboundedSender<u64>,
    alarms: DelayedEvents<Alarm>,
    replies: mpsc::UnboundedSender<Reply>,
    events: mpsc::UnboundedSender<QuizEvent>,
}

impl<B: QuizBackend> DriverTask<B> {
    async fn run(
        mut self,
        load_catalog: bool,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut ticks: mpsc::UnboundedReceiver<u64>,
        mut alarms: mpsc::UnboundedReceiver<Alarm>,
        mut replies: mpsc::UnboundedReceiver<Reply>,
    ) {
        // The first catalog is in place before any command is handled
        if load_catalog {
            let catalog = active_questions_or_empty(&*self.backend).await;
            self.on_catalog(catalog);
        }
        info!(identity = %self.identity, "quiz driver started");

        loop {
            tokio::select! {
                biased;

                Some(alarm) = alarms.recv() => self.on_alarm(alarm),
                Some(epoch) = ticks.recv() => {
                    self.session.tick(epoch);
                }
                Some(reply) = replies.recv() => self.on_reply(reply),
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
            }
        }

        self.stop_clock();
        self.alarms.cancel_all();
        info!("quiz driver stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::ChooseCategory(choice) => {
                if self.session.choose_category(choice) {
                    debug!(category = %choice, "category chosen");
                    self.emit(QuizEvent::CategoryChosen(choice));
                } else {
                    self.notice("The category can only be changed before starting");
                }
            }
            Command::Start => self.start(),
            Command::Guess(guess) => self.guess(&guess),
            Command::Confirm => self.confirm(),
            Command::SoftReset => self.soft_reset(),
            Command::HardReset => self.hard_reset(),
            Command::SubmitPlayerName(name) => self.submit_player_name(&name),
            Command::DismissHighScore => {
                if self.pending_result.is_some() {
                    debug!("high score prompt dismissed");
                    self.clear_pending();
                }
            }
            Command::ReloadCatalog => self.reload_catalog(),
            Command::Snapshot(reply) => {
                // Caller may have given up waiting
                let _ = reply.send(self.session.snapshot());
            }
        }
    }

    fn on_alarm(&mut self, alarm: Alarm) {
        match alarm.kind {
            AlarmKind::ShowBanner => {
                if let Some(tier) = self.session.show_win_banner(alarm.epoch) {
                    debug!(tier = tier.as_str(), "win banner shown");
                    self.emit(QuizEvent::WinBanner(tier));
                    self.alarms.schedule(
                        WIN_BANNER_DURATION,
                        Alarm {
                            kind: AlarmKind::HideBanner,
                            epoch: alarm.epoch,
                        },
                    );
                }
            }
            AlarmKind::Finish => {
                if let Some(result) = self.session.finish(alarm.epoch) {
                    self.on_finished(result);
                }
            }
            AlarmKind::HideBanner => {
                if self.session.hide_win_banner(alarm.epoch) {
                    self.emit(QuizEvent::WinBannerHidden);
                }
            }
        }
    }

    fn start(&mut self) {
        match self.session.start(&self.catalog, &mut self.rng) {
            Ok(round_count) => {
                info!(
                    category = %self.session.category(),
                    round_count,
                    "quiz started"
                );
                self.clear_pending();
                self.alarms.cancel_all();
                self.start_clock();
                self.emit(QuizEvent::Started {
                    category: self.session.category(),
                    round_count,
                });
                self.emit_round();
            }
            Err(e) => {
                warn!(error = %e, "quiz start refused");
                self.notice(e.to_string());
            }
        }
    }

    fn guess(&mut self, guess: &str) {
        let Some(outcome) = self.session.submit_guess(guess) else {
            debug!(phase = ?self.session.phase(), "guess ignored");
            return;
        };

        debug!(
            round = outcome.round_index,
            correct = outcome.correct,
            distance = outcome.distance,
            "guess judged"
        );

        if outcome.final_round {
            let epoch = outcome.epoch;
            self.alarms.schedule(
                WIN_BANNER_DELAY,
                Alarm {
                    kind: AlarmKind::ShowBanner,
                    epoch,
                },
            );
            self.alarms.schedule(
                FINISH_DELAY,
                Alarm {
                    kind: AlarmKind::Finish,
                    epoch,
                },
            );
        }
        self.emit(QuizEvent::Revealed(outcome));
    }

    fn confirm(&mut self) {
        match self.session.confirm() {
            Some(ConfirmAction::Advanced { round_index }) => {
                debug!(round_index, "next round");
                self.emit_round();
            }
            Some(ConfirmAction::Finished(result)) => self.on_finished(result),
            None => debug!(phase = ?self.session.phase(), "confirm ignored"),
        }
    }

    fn soft_reset(&mut self) {
        if !self.session.soft_reset() {
            self.notice("Nothing to replay yet");
            return;
        }
        debug!("soft reset");
        self.clear_pending();
        self.alarms.cancel_all();
        self.start_clock();
        self.emit(QuizEvent::Reset { hard: false });
        self.emit_round();
    }

    fn hard_reset(&mut self) {
        debug!("hard reset");
        self.session.hard_reset();
        self.clear_pending();
        self.alarms.cancel_all();
        self.stop_clock();
        self.emit(QuizEvent::Reset { hard: true });
    }

    fn on_finished(&mut self, result: SessionResult) {
        self.stop_clock();
        info!(
            mistakes = result.mistakes,
            secs = result.elapsed_secs(),
            "quiz finished"
        );
        self.emit(QuizEvent::Finished(result));

        let epoch = self.session.epoch();
        self.spawn_backend_call(move |backend| async move {
            let board = leaderboard_or_empty(&*backend).await;
            Reply::Leaderboard {
                epoch,
                result,
                board,
            }
        });
    }

    fn submit_player_name(&mut self, name: &str) {
        let Some(result) = self.pending_result else {
            self.notice("There is no high score to save");
            return;
        };
        if self.submitting {
            self.notice("The high score is already being saved");
            return;
        }

        let draft = match HighScoreDraft::new(name, self.identity.clone(), &result, Utc::now()) {
            Ok(draft) => draft,
            Err(e) => {
                self.notice(e.to_string());
                return;
            }
        };

        self.submitting = true;
        let epoch = self.session.epoch();
        self.spawn_backend_call(move |backend| async move {
            let outcome = backend.submit_high_score(&draft).await;
            Reply::Submitted {
                epoch,
                result,
                outcome,
            }
        });
    }

    fn reload_catalog(&self) {
        self.spawn_backend_call(|backend| async move {
            Reply::Catalog(active_questions_or_empty(&*backend).await)
        });
    }

    /// Run backend work on its own task; the reply comes back through `on_reply`.
    fn spawn_backend_call<F, Fut>(&self, call: F)
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: std::future::Future<Output = Reply> + Send + 'static,
    {
        let replies = self.replies.clone();
        let work = call(Arc::clone(&self.backend));
        tokio::spawn(async move {
            // Driver may be gone
            let _ = replies.send(work.await);
        });
    }

    fn on_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Catalog(catalog) => self.on_catalog(catalog),
            Reply::Leaderboard {
                epoch,
                result,
                board,
            } => {
                if epoch != self.session.epoch() || self.session.result() != Some(result) {
                    debug!(epoch, "stale leaderboard ignored");
                    return;
                }
                if qualifies(&board, &result) {
                    self.pending_result = Some(result);
                    self.emit(QuizEvent::HighScorePrompt(result));
                } else {
                    self.emit(QuizEvent::NoHighScore(result));
                }
            }
            Reply::Submitted {
                epoch,
                result,
                outcome,
            } => {
                if epoch != self.session.epoch() || !self.submitting {
                    debug!(epoch, "stale high score submission ignored");
                    return;
                }
                self.submitting = false;
                match outcome {
                    Ok(Some(saved)) => {
                        info!(player = %saved.player_name, "high score saved");
                        self.pending_result = None;
                        self.emit(QuizEvent::HighScoreSaved(saved));
                    }
                    Ok(None) => {
                        info!("high score not stored, the board moved on");
                        self.pending_result = None;
                        self.emit(QuizEvent::NoHighScore(result));
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to save high score");
                        self.notice(format!("Could not save the high score: {e}"));
                    }
                }
            }
        }
    }

    fn on_catalog(&mut self, catalog: Vec<Question>) {
        self.catalog = catalog;
        self.emit(QuizEvent::CatalogLoaded {
            questions: self.catalog.len(),
            categories: active_categories(&self.catalog),
        });
    }

    fn clear_pending(&mut self) {
        self.pending_result = None;
        self.submitting = false;
    }

    fn start_clock(&mut self) {
        // Replacing the ticker aborts the old one
        self.ticker = Some(Ticker::spawn(
            self.session.epoch(),
            TICK_INTERVAL,
            self.tick_tx.clone(),
        ));
    }

    fn stop_clock(&mut self) {
        self.ticker = None;
    }

    fn emit_round(&self) {
        if let Some(question) = self.session.current_round() {
            self.emit(QuizEvent::RoundStarted(RoundView::new(
                question,
                self.session.round_index(),
                self.session.round_count(),
            )));
        }
    }

    fn notice(&self, message: impl Into<String>) {
        self.emit(QuizEvent::Notice(message.into()));
    }

    fn emit(&self, event: QuizEvent) {
        // No listener is fine
        let _ = self.events.send(event);
    }
}
