//! # Reminder Engine
//!
//! Owns every piece of mutable reminder state (medication list, interaction
//! mode, schedule handle, missed-confirmation count) and reacts to one
//! [`Event`] at a time. Collaborators are only ever called outward.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Single inbound event channel replaces per-source callbacks
//! - 1.2.0: Escalation tiers at two and three missed confirmations
//! - 1.1.0: Setup mode for adding medications by voice
//! - 1.0.0: Initial daily reminder with spoken confirmation

use log::{debug, error, info, log, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::clock::Clock;
use super::event::{Event, UiAction};
use super::messages as msg;
use crate::core::{RegistryError, ScheduleError};
use crate::features::medications::{AddOutcome, AddSource, MedicationRegistry};
use crate::features::notify::{EngineSnapshot, Notifier, Severity};
use crate::features::reminders::{
    format_clock, whole_minutes, EscalationTier, EscalationTracker, FireOutcome,
    ReminderScheduler, TimerFire, TimerProvider,
};
use crate::features::voice::{
    Intent, InteractionMode, ModeController, RecognitionErrorKind, VoiceGateway,
};

pub struct ReminderEngine {
    registry: MedicationRegistry,
    mode: ModeController,
    scheduler: ReminderScheduler,
    escalation: EscalationTracker,
    status: String,
    notifier: Arc<dyn Notifier>,
    voice: Arc<dyn VoiceGateway>,
    clock: Arc<dyn Clock>,
}

impl ReminderEngine {
    pub fn new(
        registry: MedicationRegistry,
        timers: Arc<dyn TimerProvider>,
        notifier: Arc<dyn Notifier>,
        voice: Arc<dyn VoiceGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ReminderEngine {
            registry,
            mode: ModeController::new(),
            scheduler: ReminderScheduler::new(timers),
            escalation: EscalationTracker::new(),
            status: String::new(),
            notifier,
            voice,
            clock,
        }
    }

    /// Consume events until shutdown or until every sender is gone
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        self.announce_ready().await;
        info!("Reminder engine running");

        while let Some(event) = events.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.handle(event).await;
        }

        self.shutdown();
    }

    /// React to a single event
    pub async fn handle(&mut self, event: Event) {
        debug!("Engine event: {event:?}");
        match event {
            Event::UiActionInvoked(action) => self.handle_ui(action).await,
            Event::TranscriptReceived(transcript) => self.on_transcript(&transcript).await,
            Event::RecognitionErrorOccurred(kind) => self.on_recognition_error(kind).await,
            Event::RecognitionEnded => self.on_recognition_ended().await,
            Event::TimerFired(fire) => self.on_timer(fire).await,
            Event::Shutdown => self.shutdown(),
        }
    }

    async fn handle_ui(&mut self, action: UiAction) {
        match action {
            UiAction::AddMedication { name } => {
                self.add_medication(&name, AddSource::Typed).await
            }
            UiAction::RemoveMedication { index } => self.remove_medication(index).await,
            UiAction::StartReminder { time } => self.start_reminder(&time).await,
            UiAction::AddMedicationByVoice => self.listen(InteractionMode::Setup).await,
            UiAction::RespondToReminder => self.listen(InteractionMode::Confirmation).await,
            UiAction::RequestStatus => self.replay_state().await,
        }
    }

    /// Re-send the list, current status and a snapshot. Clients that attach
    /// after [`announce_ready`](Self::announce_ready) start from this.
    pub async fn replay_state(&self) {
        self.notifier.render_medications(self.registry.names()).await;
        if !self.status.is_empty() {
            self.notifier.set_status(&self.status).await;
        }
        let snapshot = self.snapshot();
        self.notifier.report_snapshot(&snapshot).await;
    }

    /// Initial status, welcome log line and list render
    pub async fn announce_ready(&mut self) {
        self.notifier.render_medications(self.registry.names()).await;
        self.set_status(msg::WELCOME).await;
        self.log(msg::WELCOME, Severity::Ok).await;
    }

    // ---------------------------------------------------------------------
    // Medication registry
    // ---------------------------------------------------------------------

    pub async fn add_medication(&mut self, name: &str, source: AddSource) {
        let voice = source == AddSource::Voice;

        match self.registry.add(name, source) {
            Ok(AddOutcome::Added(name)) => {
                self.notifier.render_medications(self.registry.names()).await;
                self.log(&format!("Added medication: {name}"), Severity::Normal)
                    .await;
                if voice {
                    self.voice.speak(&msg::added_spoken(&name)).await;
                }
            }
            Ok(AddOutcome::Duplicate(name)) => {
                self.log(
                    &format!("Medication \"{name}\" is already in the list."),
                    Severity::Warn,
                )
                .await;
                if voice {
                    self.voice.speak(&msg::duplicate_spoken(&name)).await;
                }
            }
            Ok(AddOutcome::PromptRetry) => self.voice.speak(msg::SETUP_RETRY).await,
            Err(e) => self.log(&e.to_string(), Severity::Warn).await,
        }
    }

    pub async fn remove_medication(&mut self, index: usize) {
        match self.registry.remove(index) {
            Ok(name) => {
                self.notifier.render_medications(self.registry.names()).await;
                self.log(&format!("Removed medication: {name}"), Severity::Warn)
                    .await;
            }
            Err(e @ RegistryError::IndexOutOfRange { .. }) => {
                error!("Rejected medication removal: {e}");
                self.log(&format!("Cannot remove medication: {e}"), Severity::Crit)
                    .await;
            }
            Err(e) => error!("Unexpected registry error on removal: {e}"),
        }
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    pub async fn start_reminder(&mut self, time: &str) {
        if self.registry.is_empty() {
            self.say_and_log(&ScheduleError::NoMedications.to_string(), Severity::Warn)
                .await;
            return;
        }

        let now = self.clock.now();
        let scheduled = match self.scheduler.start(time, &now) {
            Ok(scheduled) => scheduled,
            Err(ScheduleError::InvalidTimeFormat(raw)) => {
                warn!("Rejected reminder time '{raw}'");
                self.log(msg::INVALID_TIME_LOG, Severity::Crit).await;
                self.voice.speak(msg::INVALID_TIME).await;
                return;
            }
            Err(e) => {
                self.say_and_log(&e.to_string(), Severity::Warn).await;
                return;
            }
        };

        self.escalation.reset();

        let count = self.registry.len();
        let when = format_clock(scheduled.next_fire);
        let activated = msg::activated(count, &when);

        self.voice.speak(&activated).await;
        self.set_status(&msg::scheduled_status(&when, count)).await;
        self.notifier.clear_log().await;
        self.log(&activated, Severity::Ok).await;
        self.log(
            &msg::first_fire_eta(whole_minutes(scheduled.delay)),
            Severity::Normal,
        )
        .await;
    }

    async fn on_timer(&mut self, fire: TimerFire) {
        match self.scheduler.on_fired(fire, &self.clock.now()) {
            FireOutcome::Dispatch { first } => {
                self.dispatch().await;
                if first {
                    self.log(msg::DAILY_STARTED_LOG, Severity::Normal).await;
                }
            }
            FireOutcome::Stale => {}
        }
    }

    // ---------------------------------------------------------------------
    // Dispatch and escalation
    // ---------------------------------------------------------------------

    /// Speak the due reminder and count it as unconfirmed
    pub async fn dispatch(&mut self) {
        let Some(list) = self.registry.enumerate() else {
            self.voice.speak(msg::NOTHING_SCHEDULED).await;
            self.log(msg::NOTHING_SCHEDULED_LOG, Severity::Normal).await;
            return;
        };

        let time = format_clock(self.clock.now().naive_local());
        self.voice.speak(&msg::reminder(&time, &list)).await;
        self.log(&format!("Reminder sent for: {list}"), Severity::Normal)
            .await;

        for tier in self.escalation.record_dispatch() {
            match tier {
                EscalationTier::SecondReminder => {
                    self.voice.speak(msg::SECOND_REMINDER).await;
                    self.log(msg::SECOND_REMINDER_LOG, Severity::Warn).await;
                    self.set_status(msg::SECOND_REMINDER_STATUS).await;
                }
                EscalationTier::Critical => {
                    self.voice.speak(msg::CRITICAL).await;
                    self.log(msg::CRITICAL_LOG, Severity::Crit).await;
                    self.set_status(msg::CRITICAL_STATUS).await;
                }
            }
        }
    }

    pub async fn confirm(&mut self) {
        self.voice.speak(msg::CONFIRMED).await;
        let cleared = self.escalation.confirm();
        debug!("Confirmation cleared {cleared} missed reminder(s)");
        self.set_status(msg::CONFIRMED_STATUS).await;
        self.log(msg::CONFIRMED_LOG, Severity::Ok).await;
    }

    // ---------------------------------------------------------------------
    // Voice sessions
    // ---------------------------------------------------------------------

    async fn listen(&mut self, mode: InteractionMode) {
        match mode {
            InteractionMode::Setup => self.mode.enter_setup(),
            InteractionMode::Confirmation => self.mode.enter_confirmation(),
        }

        // Never capture while the assistant is still talking
        self.voice.cancel_speech().await;
        if mode == InteractionMode::Setup {
            self.voice.speak(msg::SETUP_PROMPT).await;
        }

        match self.voice.start_listening().await {
            Ok(()) => self.set_status(mode.listening_status()).await,
            Err(e) => {
                warn!("Could not start listening: {e}");
                self.log(msg::LISTEN_UNAVAILABLE_LOG, Severity::Crit).await;
                self.voice.speak(msg::LISTEN_UNAVAILABLE_SPEECH).await;
                self.mode.session_ended();
            }
        }
    }

    async fn on_transcript(&mut self, transcript: &str) {
        let transcript = transcript.trim();
        self.log(&format!("User said: \"{transcript}\""), Severity::Normal)
            .await;

        let intent = self.mode.route(transcript);
        // The session is over as soon as its transcript is in
        self.mode.session_ended();

        match intent {
            Intent::Cancel => {
                self.voice.speak(msg::SETUP_CANCELLED).await;
                self.log(msg::SETUP_CANCELLED_LOG, Severity::Normal).await;
            }
            Intent::AddMedication(name) => self.add_medication(&name, AddSource::Voice).await,
            Intent::Confirm => self.confirm().await,
            Intent::RepeatRequest => {
                self.voice.speak(msg::REPEATING).await;
                self.dispatch().await;
            }
            Intent::Unrecognized => {
                self.voice.speak(msg::UNRECOGNIZED).await;
                self.log(msg::UNRECOGNIZED_LOG, Severity::Warn).await;
            }
        }
    }

    async fn on_recognition_error(&mut self, kind: RecognitionErrorKind) {
        warn!("Speech recognition error: {kind}");
        let mode = self.mode.current();

        if !kind.is_access_denied() {
            self.set_status(&msg::error_idle_status(&kind.to_string()))
                .await;
        }
        self.log(&format!("⚠ Speech error: {kind}"), Severity::Warn)
            .await;

        match kind {
            RecognitionErrorKind::PermissionDenied | RecognitionErrorKind::ServiceDenied => {
                self.set_status(msg::PERMISSION_STATUS).await;
                self.log(msg::PERMISSION_LOG, Severity::Crit).await;
                self.voice.speak(msg::PERMISSION_SPEECH).await;
            }
            RecognitionErrorKind::NoSpeech => {
                self.log(msg::NO_SPEECH_LOG, Severity::Warn).await;
                if mode == InteractionMode::Setup {
                    self.voice.speak(msg::NO_SPEECH_SETUP_RETRY).await;
                }
            }
            RecognitionErrorKind::Other(_) => {}
        }

        self.mode.session_ended();
    }

    async fn on_recognition_ended(&mut self) {
        self.mode.session_ended();
        if self.status.contains("Listening") {
            self.set_status(msg::IDLE_STATUS).await;
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle and state
    // ---------------------------------------------------------------------

    /// Cancel all outstanding timers
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        info!("Reminder engine stopped, all timers cancelled");
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status.clone(),
            mode: self.mode.current(),
            missed_confirmations: self.escalation.missed(),
            medications: self.registry.names().to_vec(),
            reminder_time: self
                .scheduler
                .reminder_time()
                .map(|t| t.format("%H:%M").to_string()),
            next_fire: self
                .scheduler
                .next_fire()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode.current()
    }

    pub fn missed_confirmations(&self) -> u32 {
        self.escalation.missed()
    }

    pub fn medications(&self) -> &[String] {
        self.registry.names()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    async fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.notifier.set_status(text).await;
    }

    async fn log(&self, text: &str, severity: Severity) {
        log!(severity.level(), "{text}");
        self.notifier.append_log(text, severity).await;
    }

    async fn say_and_log(&self, text: &str, severity: Severity) {
        self.log(text, severity).await;
        self.voice.speak(text).await;
    }
}
