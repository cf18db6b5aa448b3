use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    audio::ToneGenerator,
    classroom::{Classroom, Effects},
    config::AppConfig,
    models::BatchSeed,
    refusal::Refusal,
    registry::Direction,
    settings::SettingsStore,
    snapshot::ClassroomSnapshot,
};

use super::ToneKind;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCompletedEvent {
    pub group_id: String,
    pub name: String,
    pub recorded_duration: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum ClassroomEvent {
    StateChanged(ClassroomSnapshot),
    Tone(ToneKind),
    GroupCompleted(GroupCompletedEvent),
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Ticker {
    fn is_alive(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.handle.is_finished()
    }

    fn stop(self) {
        self.cancel_token.cancel();
        self.handle.abort();
    }
}

/// Everything behind the single lock: the core and its tick source.
struct ControllerState {
    classroom: Classroom,
    ticker: Option<Ticker>,
}

/// Where effects go once the core has produced them.
#[derive(Clone)]
struct Outputs {
    settings: Arc<SettingsStore>,
    tones: Arc<dyn ToneGenerator>,
    events: broadcast::Sender<ClassroomEvent>,
}

impl Outputs {
    fn publish(&self, effects: Effects) {
        for tone in effects.tones {
            self.tones.emit(tone);
            let _ = self.events.send(ClassroomEvent::Tone(tone));
        }

        if let Some(group) = effects.completed {
            let payload = GroupCompletedEvent {
                recorded_duration: group.recorded_duration.unwrap_or_default(),
                completed_at: group.completed_at.unwrap_or_else(Utc::now),
                group_id: group.id,
                name: group.name,
            };
            let _ = self.events.send(ClassroomEvent::GroupCompleted(payload));
        }
    }

    fn state_changed(&self, classroom: &Classroom) -> ClassroomSnapshot {
        let snapshot = self.capture(classroom);
        let _ = self.events.send(ClassroomEvent::StateChanged(snapshot.clone()));
        snapshot
    }

    fn capture(&self, classroom: &Classroom) -> ClassroomSnapshot {
        ClassroomSnapshot::capture(classroom, self.settings.form_link().as_deref())
    }
}

#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<ControllerState>>,
    outputs: Outputs,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(
        config: &AppConfig,
        seeds: Vec<BatchSeed>,
        settings: Arc<SettingsStore>,
        tones: Arc<dyn ToneGenerator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(ControllerState {
                classroom: Classroom::new(seeds),
                ticker: None,
            })),
            outputs: Outputs {
                settings,
                tones,
                events,
            },
            tick_interval: config.tick_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClassroomEvent> {
        self.outputs.events.subscribe()
    }

    pub async fn get_snapshot(&self) -> ClassroomSnapshot {
        let guard = self.state.lock().await;
        self.outputs.capture(&guard.classroom)
    }

    pub async fn select_group(&self, id: &str) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("select", |room| room.select_group(id).map(|_| Effects::default()))
            .await
    }

    pub async fn start(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("start", |room| room.start().map(|_| Effects::default()))
            .await
    }

    pub async fn pause(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("pause", |room| room.pause().map(|_| Effects::default()))
            .await
    }

    pub async fn toggle(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("toggle", |room| room.toggle().map(|_| Effects::default()))
            .await
    }

    pub async fn reset(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("reset", |room| room.reset().map(|_| Effects::default()))
            .await
    }

    pub async fn skip_to_next_phase(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("skip", Classroom::skip_to_next_phase).await
    }

    pub async fn reorder(
        &self,
        index: usize,
        direction: Direction,
    ) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("reorder", |room| {
            room.reorder(index, direction).map(|_| Effects::default())
        })
        .await
    }

    pub async fn shuffle(&self) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("shuffle", |room| {
            room.shuffle(&mut rand::thread_rng())
                .map(|_| Effects::default())
        })
        .await
    }

    pub async fn rename(&self, id: &str, new_name: &str) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("rename", |room| {
            room.rename(id, new_name).map(|_| Effects::default())
        })
        .await
    }

    pub async fn switch_batch(&self, index: usize) -> Result<ClassroomSnapshot, Refusal> {
        self.execute("switch-batch", |room| {
            room.switch_batch(index).map(|_| Effects::default())
        })
        .await
    }

    /// The link never influences timer state; it only changes what is displayed.
    pub async fn set_form_link(&self, link: Option<&str>) -> anyhow::Result<ClassroomSnapshot> {
        self.outputs.settings.set_form_link(link)?;
        let guard = self.state.lock().await;
        Ok(self.outputs.state_changed(&guard.classroom))
    }

    pub async fn shutdown(&self) {
        let mut guard = self.state.lock().await;
        if let Some(ticker) = guard.ticker.take() {
            ticker.stop();
        }
    }

    async fn execute<F>(&self, command: &str, apply: F) -> Result<ClassroomSnapshot, Refusal>
    where
        F: FnOnce(&mut Classroom) -> Result<Effects, Refusal>,
    {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let effects = apply(&mut state.classroom).map_err(|refusal| {
            debug!("{} ignored: {}", command, refusal);
            refusal
        })?;

        self.sync_ticker(state);
        self.outputs.publish(effects);
        Ok(self.outputs.state_changed(&state.classroom))
    }

    /// Keeps exactly one ticker alive while the bound session runs, none otherwise.
    /// Runs under the state lock, so a cancelled ticker can never tick again.
    fn sync_ticker(&self, state: &mut ControllerState) {
        if state.classroom.is_running() {
            if !state.ticker.as_ref().is_some_and(Ticker::is_alive) {
                if let Some(stale) = state.ticker.take() {
                    stale.stop();
                }
                state.ticker = Some(self.spawn_ticker());
            }
        } else if let Some(ticker) = state.ticker.take() {
            ticker.stop();
        }
    }

    fn spawn_ticker(&self) -> Ticker {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            self.state.clone(),
            self.outputs.clone(),
            self.tick_interval,
            cancel_token.clone(),
        ));
        info!("Ticker started ({}ms period)", self.tick_interval.as_millis());
        Ticker {
            handle,
            cancel_token,
        }
    }
}

async fn tick_loop(
    state: Arc<Mutex<ControllerState>>,
    outputs: Outputs,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut guard = state.lock().await;
                if cancel_token.is_cancelled() || !guard.classroom.is_running() {
                    break;
                }

                let effects = guard.classroom.tick();
                let completed = effects.completed.clone();
                outputs.publish(effects);
                outputs.state_changed(&guard.classroom);

                if !guard.classroom.is_running() {
                    match completed {
                        Some(group) => log_info!("Group {} finished; ticker stopping", group.id),
                        None => log_error!("Session stopped without completing; ticker stopping"),
                    }
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingToneGenerator;
    use crate::models::{default_batches, GroupStatus};
    use crate::timer::{Phase, FINISH_SECS};

    fn controller() -> (TimerController, Arc<RecordingToneGenerator>) {
        let tones = Arc::new(RecordingToneGenerator::default());
        let controller = TimerController::new(
            &AppConfig::default(),
            default_batches(),
            Arc::new(SettingsStore::in_memory()),
            tones.clone(),
        );
        (controller, tones)
    }

    async fn sleep_ms(millis: u64) {
        time::sleep(Duration::from_millis(millis)).await;
    }

    fn status(snapshot: &ClassroomSnapshot, id: &str) -> GroupStatus {
        snapshot.groups.iter().find(|g| g.id == id).unwrap().status
    }

    #[tokio::test(start_paused = true)]
    async fn session_completes_without_operator_action() {
        let (controller, tones) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();

        sleep_ms(841_000).await;

        let snap = controller.get_snapshot().await;
        assert_eq!(status(&snap, "b1-g1"), GroupStatus::Completed);
        assert_eq!(snap.groups[0].recorded_duration, Some(840));
        assert_eq!(snap.phase, Phase::Finished);
        assert_eq!(snap.nominal_seconds, FINISH_SECS);
        assert!(!snap.running);
        assert_eq!(
            tones.tones(),
            vec![
                ToneKind::SingleWarning,
                ToneKind::DoubleWarning,
                ToneKind::PhaseBoundary,
                ToneKind::PhaseBoundary,
                ToneKind::Completion,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn selection_waits_for_explicit_start() {
        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        sleep_ms(5_000).await;
        assert_eq!(controller.get_snapshot().await.nominal_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_the_tick_source() {
        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();
        sleep_ms(10_500).await;
        controller.pause().await.unwrap();
        sleep_ms(100_000).await;

        let snap = controller.get_snapshot().await;
        assert_eq!(snap.nominal_seconds, 10);
        assert_eq!(snap.actual_elapsed_seconds, 10);

        controller.start().await.unwrap();
        sleep_ms(3_500).await;
        assert_eq!(controller.get_snapshot().await.actual_elapsed_seconds, 13);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_keeps_a_single_ticker() {
        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();
        assert_eq!(controller.start().await.unwrap_err(), Refusal::AlreadyRunning);
        controller.toggle().await.unwrap();
        controller.toggle().await.unwrap();
        sleep_ms(4_500).await;
        assert_eq!(controller.get_snapshot().await.nominal_seconds, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_groups_abandons_the_running_session() {
        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();
        sleep_ms(20_500).await;
        controller.pause().await.unwrap();
        sleep_ms(30_000).await;

        let snap = controller.select_group("b1-g2").await.unwrap();
        assert_eq!(status(&snap, "b1-g1"), GroupStatus::Pending);
        assert_eq!(snap.groups[0].recorded_duration, None);
        assert_eq!(snap.nominal_seconds, 0);
        assert_eq!(snap.actual_elapsed_seconds, 0);

        sleep_ms(5_000).await;
        assert_eq!(controller.get_snapshot().await.nominal_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_moves_only_the_nominal_clock() {
        let (controller, tones) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();
        sleep_ms(100_500).await;

        let snap = controller.skip_to_next_phase().await.unwrap();
        assert_eq!(snap.nominal_seconds, 480);
        assert_eq!(snap.actual_elapsed_seconds, 100);
        assert_eq!(snap.phase, Phase::QAndA);
        assert!(snap.running);

        sleep_ms(1_000).await;
        let snap = controller.get_snapshot().await;
        assert_eq!(snap.nominal_seconds, 481);
        assert_eq!(snap.actual_elapsed_seconds, 101);
        assert!(!tones.tones().contains(&ToneKind::Completion));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_is_broadcast() {
        let (controller, _) = controller();
        let mut events = controller.subscribe();
        controller.select_group("b1-g3").await.unwrap();
        controller.start().await.unwrap();
        sleep_ms(7_500).await;
        controller.skip_to_next_phase().await.unwrap();
        controller.skip_to_next_phase().await.unwrap();
        controller.skip_to_next_phase().await.unwrap();

        let mut completed = None;
        while let Ok(event) = events.try_recv() {
            if let ClassroomEvent::GroupCompleted(payload) = event {
                completed = Some(payload);
            }
        }
        let completed = completed.expect("completion event");
        assert_eq!(completed.group_id, "b1-g3");
        assert_eq!(completed.recorded_duration, 7);

        sleep_ms(10_000).await;
        assert!(!controller.get_snapshot().await.running);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_switch_stops_the_clock() {
        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        controller.start().await.unwrap();
        sleep_ms(3_500).await;

        let snap = controller.switch_batch(1).await.unwrap();
        assert!(!snap.running);
        assert!(snap.displayed.is_none());
        assert_eq!(snap.groups[0].id, "b2-g1");
    }

    #[tokio::test(start_paused = true)]
    async fn form_link_surfaces_only_in_assessment() {
        use crate::snapshot::AssessmentPrompt;

        let (controller, _) = controller();
        controller.select_group("b1-g1").await.unwrap();
        let snap = controller
            .set_form_link(Some("https://forms.gle/peer"))
            .await
            .unwrap();
        assert_eq!(snap.assessment, AssessmentPrompt::Hidden);

        controller.skip_to_next_phase().await.unwrap();
        let snap = controller.skip_to_next_phase().await.unwrap();
        assert_eq!(
            snap.assessment,
            AssessmentPrompt::Open {
                link: "https://forms.gle/peer".into()
            }
        );
        assert_eq!(snap.nominal_seconds, 720);
    }
}
