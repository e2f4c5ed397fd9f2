// Exit-trigger ordering properties for the intro sequencer.

use folio_engine::sequencer::{Effect, Event, Phase, Sequencer, Timings};

const END_FRAME: Event = Event::Frame { now: 10_000.0 };

fn permutations(items: &[Event]) -> Vec<Vec<Event>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

fn count(effects: &[Effect], wanted: Effect) -> usize {
    effects.iter().filter(|e| **e == wanted).count()
}

fn run(prefix: &[Event], events: &[Event]) -> (Sequencer, Vec<Effect>) {
    let mut seq = Sequencer::new(Timings::default());
    let mut effects = Vec::new();
    for event in prefix.iter().chain(events) {
        effects.extend(seq.step(*event));
    }
    // The deferred cleanup always fires eventually
    effects.extend(seq.step(Event::CleanupDue));
    (seq, effects)
}

#[test]
fn any_trigger_order_disposes_and_marks_once() {
    let prefix = [Event::Start, Event::FlagRead(false), Event::IntroReady { now: 0.0 }];
    let triggers = [END_FRAME, Event::Skip, Event::SafetyTimeout, Event::CleanupDue];
    for order in permutations(&triggers) {
        let (seq, effects) = run(&prefix, &order);
        assert_eq!(count(&effects, Effect::MarkPlayed), 1, "{order:?}");
        assert_eq!(count(&effects, Effect::DisposeIntro), 1, "{order:?}");
        assert_eq!(count(&effects, Effect::StartBackground), 1, "{order:?}");
        assert_eq!(count(&effects, Effect::UnlockPage), 1, "{order:?}");
        assert_eq!(seq.phase(), Phase::BackgroundRunning, "{order:?}");
    }
}

#[test]
fn duplicated_triggers_are_ignored() {
    let prefix = [Event::Start, Event::FlagRead(false), Event::IntroReady { now: 0.0 }];
    let triggers = [Event::Skip, Event::Skip, Event::SafetyTimeout, END_FRAME, Event::SafetyTimeout];
    let (_, effects) = run(&prefix, &triggers);
    assert_eq!(count(&effects, Effect::MarkPlayed), 1);
    assert_eq!(count(&effects, Effect::DisposeIntro), 1);
    assert_eq!(count(&effects, Effect::ScheduleCleanup(700)), 1);
}

#[test]
fn late_load_in_any_order_is_released_once() {
    let prefix = [Event::Start, Event::FlagRead(false)];
    let events = [
        Event::IntroReady { now: 0.0 },
        Event::Skip,
        Event::SafetyTimeout,
        Event::CleanupDue,
    ];
    for order in permutations(&events) {
        let (_, effects) = run(&prefix, &order);
        assert_eq!(count(&effects, Effect::MarkPlayed), 1, "{order:?}");
        assert_eq!(count(&effects, Effect::DisposeIntro), 1, "{order:?}");
    }
}

#[test]
fn played_flag_never_requests_frames() {
    let prefix = [Event::Start, Event::FlagRead(true)];
    let events = [
        Event::IntroReady { now: 0.0 },
        Event::Frame { now: 16.0 },
        Event::Skip,
        Event::SafetyTimeout,
        Event::BackgroundStarted,
    ];
    for order in permutations(&events) {
        let (seq, effects) = run(&prefix, &order);
        assert_eq!(count(&effects, Effect::RequestFrame), 0, "{order:?}");
        assert_eq!(count(&effects, Effect::MarkPlayed), 0, "{order:?}");
        assert_eq!(count(&effects, Effect::StartBackground), 1, "{order:?}");
        assert_eq!(seq.phase(), Phase::BackgroundRunning, "{order:?}");
    }
}

#[test]
fn backend_failure_marks_played_and_starts_background() {
    let (seq, effects) = run(
        &[Event::Start, Event::FlagRead(false)],
        &[Event::BackendFailed, Event::SafetyTimeout, Event::Skip],
    );
    assert_eq!(count(&effects, Effect::MarkPlayed), 1);
    assert_eq!(count(&effects, Effect::StartBackground), 1);
    assert_eq!(count(&effects, Effect::RequestFrame), 0);
    assert_eq!(count(&effects, Effect::DisposeIntro), 0);
    assert_eq!(seq.phase(), Phase::BackgroundRunning);
}

#[test]
fn teardown_mid_flight_unlocks_and_uncovers_the_page() {
    let events = [
        Event::Start,
        Event::FlagRead(false),
        Event::IntroReady { now: 0.0 },
        Event::Frame { now: 16.0 },
        Event::Teardown,
        Event::SafetyTimeout,
        Event::Skip,
        Event::Frame { now: 5000.0 },
        Event::CleanupDue,
    ];
    let mut seq = Sequencer::new(Timings::default());
    let effects: Vec<Effect> = events.iter().flat_map(|e| seq.step(*e)).collect();

    assert_eq!(count(&effects, Effect::UnlockPage), 1);
    assert_eq!(count(&effects, Effect::RemoveOverlay), 1);
    assert_eq!(count(&effects, Effect::DisposeIntro), 1);
    assert_eq!(count(&effects, Effect::MarkPlayed), 0);
    assert_eq!(seq.phase(), Phase::TornDown);
}

#[test]
fn teardown_at_any_point_never_leaves_the_page_locked() {
    let script = [
        Event::Start,
        Event::FlagRead(false),
        Event::IntroReady { now: 0.0 },
        Event::Frame { now: 16.0 },
        Event::Skip,
        Event::CleanupDue,
    ];
    for cut in 0..=script.len() {
        let mut seq = Sequencer::new(Timings::default());
        let mut effects: Vec<Effect> = script[..cut].iter().flat_map(|e| seq.step(*e)).collect();
        effects.extend(seq.step(Event::Teardown));

        let locks = count(&effects, Effect::LockPage);
        assert_eq!(count(&effects, Effect::UnlockPage), locks, "cut at {cut}");
        if locks > 0 {
            assert_eq!(count(&effects, Effect::RemoveOverlay), 1, "cut at {cut}");
        }
        assert!(
            count(&effects, Effect::DisposeIntro) <= 1,
            "cut at {cut}: {effects:?}"
        );
    }
}
