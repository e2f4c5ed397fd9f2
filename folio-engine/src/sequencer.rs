// sequencer.rs - Intro/background hand-off state machine
//
// Pure: every transition is (phase, event) -> (phase, effects). The browser
// runtime executes the effects and feeds timer/frame/load results back in
// as events. Any (phase, event) pair not listed below is a no-op, which is
// what makes redundant exit triggers harmless.
//
//   Idle -> CheckingFlag -> SkipToBackground -----------------> BackgroundRunning
//                       \-> PlayingIntro -> IntroEnding -------/
//
// Teardown moves any phase to TornDown.

use crate::config::IntroConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timings {
    pub flight_ms: f64,
    pub safety_timeout_ms: u32,
    pub cleanup_grace_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&IntroConfig::default())
    }
}

impl From<&IntroConfig> for Timings {
    fn from(config: &IntroConfig) -> Self {
        Self {
            // A zero duration would divide by zero; treat it as "instant".
            flight_ms: config.flight_ms.max(1.0),
            safety_timeout_ms: config.safety_timeout_ms,
            cleanup_grace_ms: config.cleanup_grace_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stage {
    /// Waiting for the backend import and intro scene construction.
    Loading,
    Flying { started_at: f64, frame: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    CheckingFlag,
    SkipToBackground,
    PlayingIntro(Stage),
    /// Overlay is fading; `built` records whether intro resources exist.
    IntroEnding { built: bool },
    BackgroundRunning,
    TornDown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Start,
    FlagRead(bool),
    /// Backend loaded and intro scene constructed. `now` is in ms on the
    /// same clock as frame timestamps.
    IntroReady { now: f64 },
    /// Backend import or intro scene construction failed.
    BackendFailed,
    Frame { now: f64 },
    Skip,
    SafetyTimeout,
    CleanupDue,
    BackgroundStarted,
    Teardown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    ReadFlag,
    LockPage,
    UnlockPage,
    LoadBackend,
    ArmSafetyTimer(u32),
    CancelSafetyTimer,
    RequestFrame,
    CancelFrame,
    RenderIntro { progress: f32, rebuild_trail: bool },
    MarkPlayed,
    HideOverlay,
    RemoveOverlay,
    StartBackground,
    ScheduleCleanup(u32),
    CancelCleanup,
    DisposeIntro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    Completed,
    Skipped,
    TimedOut,
    BackendFailed,
}

#[derive(Clone, Debug)]
pub struct Sequencer {
    phase: Phase,
    timings: Timings,
    exit: Option<ExitReason>,
}

impl Sequencer {
    pub fn new(timings: Timings) -> Self {
        Self {
            phase: Phase::Idle,
            timings,
            exit: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Why the intro ended, once it has.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn step(&mut self, event: Event) -> Vec<Effect> {
        use Effect::*;

        match (self.phase, event) {
            (_, Event::Teardown) => self.teardown(),

            (Phase::Idle, Event::Start) => {
                self.phase = Phase::CheckingFlag;
                vec![ReadFlag]
            }

            (Phase::CheckingFlag, Event::FlagRead(true)) => {
                self.phase = Phase::SkipToBackground;
                vec![HideOverlay, RemoveOverlay, StartBackground]
            }
            (Phase::CheckingFlag, Event::FlagRead(false)) => {
                self.phase = Phase::PlayingIntro(Stage::Loading);
                vec![
                    LockPage,
                    ArmSafetyTimer(self.timings.safety_timeout_ms),
                    LoadBackend,
                ]
            }

            (Phase::SkipToBackground, Event::BackgroundStarted) => {
                self.phase = Phase::BackgroundRunning;
                Vec::new()
            }

            (Phase::PlayingIntro(Stage::Loading), Event::IntroReady { now }) => {
                self.phase = Phase::PlayingIntro(Stage::Flying {
                    started_at: now,
                    frame: 0,
                });
                vec![RequestFrame]
            }
            // Scene finished building after the intro already ended
            (_, Event::IntroReady { .. }) => vec![DisposeIntro],

            (Phase::PlayingIntro(Stage::Loading), Event::BackendFailed) => {
                self.exit = Some(ExitReason::BackendFailed);
                self.phase = Phase::BackgroundRunning;
                vec![
                    CancelSafetyTimer,
                    MarkPlayed,
                    HideOverlay,
                    RemoveOverlay,
                    UnlockPage,
                    StartBackground,
                ]
            }

            (Phase::PlayingIntro(Stage::Flying { started_at, frame }), Event::Frame { now }) => {
                let ratio = (now - started_at) / self.timings.flight_ms;
                let mut effects = vec![RenderIntro {
                    progress: ratio.clamp(0.0, 1.0) as f32,
                    rebuild_trail: frame % 2 == 0,
                }];
                if ratio < 1.0 {
                    self.phase = Phase::PlayingIntro(Stage::Flying {
                        started_at,
                        frame: frame + 1,
                    });
                    effects.push(RequestFrame);
                } else {
                    effects.extend(self.end_intro(ExitReason::Completed));
                }
                effects
            }

            (Phase::PlayingIntro(_), Event::Skip) => self.end_intro(ExitReason::Skipped),
            (Phase::PlayingIntro(_), Event::SafetyTimeout) => self.end_intro(ExitReason::TimedOut),

            (Phase::IntroEnding { built }, Event::CleanupDue) => {
                self.phase = Phase::BackgroundRunning;
                let mut effects = Vec::with_capacity(2);
                if built {
                    effects.push(DisposeIntro);
                }
                effects.push(RemoveOverlay);
                effects
            }

            _ => Vec::new(),
        }
    }

    fn end_intro(&mut self, reason: ExitReason) -> Vec<Effect> {
        use Effect::*;

        let Phase::PlayingIntro(stage) = self.phase else {
            return Vec::new();
        };
        let built = matches!(stage, Stage::Flying { .. });
        self.exit = Some(reason);
        self.phase = Phase::IntroEnding { built };

        let mut effects = Vec::with_capacity(8);
        if reason != ExitReason::TimedOut {
            effects.push(CancelSafetyTimer);
        }
        // Completion arrives from the frame callback itself; nothing is pending.
        if built && reason != ExitReason::Completed {
            effects.push(CancelFrame);
        }
        effects.extend([
            MarkPlayed,
            HideOverlay,
            UnlockPage,
            StartBackground,
            ScheduleCleanup(self.timings.cleanup_grace_ms),
        ]);
        effects
    }

    fn teardown(&mut self) -> Vec<Effect> {
        use Effect::*;

        // The page may come back from the back/forward cache, so teardown
        // never leaves it locked or covered.
        let effects = match self.phase {
            Phase::PlayingIntro(Stage::Loading) => {
                vec![CancelSafetyTimer, UnlockPage, HideOverlay, RemoveOverlay]
            }
            Phase::PlayingIntro(Stage::Flying { .. }) => vec![
                CancelSafetyTimer,
                CancelFrame,
                DisposeIntro,
                UnlockPage,
                HideOverlay,
                RemoveOverlay,
            ],
            Phase::IntroEnding { built: true } => vec![CancelCleanup, DisposeIntro, RemoveOverlay],
            Phase::IntroEnding { built: false } => vec![CancelCleanup, RemoveOverlay],
            _ => Vec::new(),
        };
        self.phase = Phase::TornDown;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> Sequencer {
        let mut seq = Sequencer::new(Timings::default());
        seq.step(Event::Start);
        seq.step(Event::FlagRead(false));
        seq
    }

    fn flying(at: f64) -> Sequencer {
        let mut seq = playing();
        seq.step(Event::IntroReady { now: at });
        seq
    }

    #[test]
    fn start_reads_the_flag() {
        let mut seq = Sequencer::new(Timings::default());
        assert_eq!(seq.step(Event::Start), vec![Effect::ReadFlag]);
        assert_eq!(seq.phase(), Phase::CheckingFlag);
        // A second start is ignored
        assert!(seq.step(Event::Start).is_empty());
    }

    #[test]
    fn played_flag_skips_straight_to_background() {
        let mut seq = Sequencer::new(Timings::default());
        seq.step(Event::Start);
        let effects = seq.step(Event::FlagRead(true));
        assert_eq!(
            effects,
            vec![Effect::HideOverlay, Effect::RemoveOverlay, Effect::StartBackground]
        );
        assert_eq!(seq.phase(), Phase::SkipToBackground);
        seq.step(Event::BackgroundStarted);
        assert_eq!(seq.phase(), Phase::BackgroundRunning);
    }

    #[test]
    fn unplayed_flag_locks_page_and_loads() {
        let mut seq = Sequencer::new(Timings::default());
        seq.step(Event::Start);
        let effects = seq.step(Event::FlagRead(false));
        assert_eq!(
            effects,
            vec![Effect::LockPage, Effect::ArmSafetyTimer(4200), Effect::LoadBackend]
        );
        assert_eq!(seq.phase(), Phase::PlayingIntro(Stage::Loading));
    }

    #[test]
    fn frames_alternate_trail_rebuilds() {
        let mut seq = flying(1000.0);
        let mut rebuilds = Vec::new();
        for i in 0..4 {
            let effects = seq.step(Event::Frame { now: 1000.0 + i as f64 * 16.0 });
            let Effect::RenderIntro { rebuild_trail, .. } = effects[0] else {
                panic!("expected render, got {effects:?}");
            };
            rebuilds.push(rebuild_trail);
            assert_eq!(effects[1], Effect::RequestFrame);
        }
        assert_eq!(rebuilds, vec![true, false, true, false]);
    }

    #[test]
    fn progress_is_normalized_and_clamped() {
        let mut seq = flying(0.0);
        let effects = seq.step(Event::Frame { now: 1700.0 });
        assert_eq!(
            effects[0],
            Effect::RenderIntro { progress: 0.5, rebuild_trail: true }
        );
        let mut seq = flying(500.0);
        let effects = seq.step(Event::Frame { now: 100.0 });
        assert_eq!(
            effects[0],
            Effect::RenderIntro { progress: 0.0, rebuild_trail: true }
        );
    }

    #[test]
    fn final_frame_ends_the_intro() {
        let mut seq = flying(0.0);
        let effects = seq.step(Event::Frame { now: 3400.0 });
        assert_eq!(
            effects,
            vec![
                Effect::RenderIntro { progress: 1.0, rebuild_trail: true },
                Effect::CancelSafetyTimer,
                Effect::MarkPlayed,
                Effect::HideOverlay,
                Effect::UnlockPage,
                Effect::StartBackground,
                Effect::ScheduleCleanup(700),
            ]
        );
        assert_eq!(seq.phase(), Phase::IntroEnding { built: true });
        assert_eq!(seq.exit_reason(), Some(ExitReason::Completed));
    }

    #[test]
    fn skip_cancels_pending_frame() {
        let mut seq = flying(0.0);
        let effects = seq.step(Event::Skip);
        assert!(effects.contains(&Effect::CancelFrame));
        assert!(effects.contains(&Effect::CancelSafetyTimer));
        assert_eq!(seq.exit_reason(), Some(ExitReason::Skipped));
    }

    #[test]
    fn timeout_does_not_cancel_itself() {
        let mut seq = flying(0.0);
        let effects = seq.step(Event::SafetyTimeout);
        assert!(!effects.contains(&Effect::CancelSafetyTimer));
        assert!(effects.contains(&Effect::MarkPlayed));
        assert_eq!(seq.exit_reason(), Some(ExitReason::TimedOut));
    }

    #[test]
    fn cleanup_disposes_built_scene_and_removes_overlay() {
        let mut seq = flying(0.0);
        seq.step(Event::Skip);
        assert_eq!(
            seq.step(Event::CleanupDue),
            vec![Effect::DisposeIntro, Effect::RemoveOverlay]
        );
        assert_eq!(seq.phase(), Phase::BackgroundRunning);
    }

    #[test]
    fn timeout_during_load_has_nothing_to_dispose() {
        let mut seq = playing();
        let effects = seq.step(Event::SafetyTimeout);
        assert!(!effects.contains(&Effect::CancelFrame));
        assert_eq!(seq.phase(), Phase::IntroEnding { built: false });
        assert_eq!(seq.step(Event::CleanupDue), vec![Effect::RemoveOverlay]);
    }

    #[test]
    fn late_scene_is_disposed_immediately() {
        let mut seq = playing();
        seq.step(Event::SafetyTimeout);
        assert_eq!(
            seq.step(Event::IntroReady { now: 5000.0 }),
            vec![Effect::DisposeIntro]
        );
        assert_eq!(seq.phase(), Phase::IntroEnding { built: false });
    }

    #[test]
    fn backend_failure_degrades_to_background() {
        let mut seq = playing();
        let effects = seq.step(Event::BackendFailed);
        assert_eq!(
            effects,
            vec![
                Effect::CancelSafetyTimer,
                Effect::MarkPlayed,
                Effect::HideOverlay,
                Effect::RemoveOverlay,
                Effect::UnlockPage,
                Effect::StartBackground,
            ]
        );
        assert_eq!(seq.phase(), Phase::BackgroundRunning);
        assert_eq!(seq.exit_reason(), Some(ExitReason::BackendFailed));
        assert!(seq.step(Event::SafetyTimeout).is_empty());
    }

    #[test]
    fn teardown_cancels_pending_cleanup() {
        let mut seq = flying(0.0);
        seq.step(Event::Skip);
        assert_eq!(
            seq.step(Event::Teardown),
            vec![Effect::CancelCleanup, Effect::DisposeIntro, Effect::RemoveOverlay]
        );
        assert_eq!(seq.phase(), Phase::TornDown);
        assert!(seq.step(Event::CleanupDue).is_empty());
    }

    #[test]
    fn teardown_mid_flight_releases_everything() {
        let mut seq = flying(0.0);
        assert_eq!(
            seq.step(Event::Teardown),
            vec![
                Effect::CancelSafetyTimer,
                Effect::CancelFrame,
                Effect::DisposeIntro,
                Effect::UnlockPage,
                Effect::HideOverlay,
                Effect::RemoveOverlay,
            ]
        );
    }

    #[test]
    fn teardown_while_loading_unlocks_the_page() {
        let mut seq = playing();
        assert_eq!(
            seq.step(Event::Teardown),
            vec![
                Effect::CancelSafetyTimer,
                Effect::UnlockPage,
                Effect::HideOverlay,
                Effect::RemoveOverlay,
            ]
        );
        // A scene that finishes loading afterwards is still released
        assert_eq!(seq.step(Event::IntroReady { now: 0.0 }), vec![Effect::DisposeIntro]);
    }

    #[test]
    fn zero_flight_duration_completes_on_first_frame() {
        let timings = Timings::from(&IntroConfig {
            flight_ms: 0.0,
            ..IntroConfig::default()
        });
        let mut seq = Sequencer::new(timings);
        seq.step(Event::Start);
        seq.step(Event::FlagRead(false));
        seq.step(Event::IntroReady { now: 0.0 });
        let effects = seq.step(Event::Frame { now: 16.0 });
        assert!(effects.contains(&Effect::MarkPlayed));
    }
}
