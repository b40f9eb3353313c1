//! End-to-end recording scenarios through the public API.

use cprlog::config::RecorderConfig;
use cprlog::export::{self, ExportFormat};
use cprlog::session::COMPRESSION_TICK_MS;
use cprlog::{Action, EventCategory, ManualClock, Outcome, Recorder, Storage};

const T0: i64 = 1_714_558_830_000;

fn open(path: &std::path::Path, clock: &ManualClock) -> Recorder<Storage, ManualClock> {
    Recorder::open(
        Storage::open(path).unwrap(),
        clock.clone(),
        &RecorderConfig::default(),
    )
}

#[test]
fn full_arrest_is_logged_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_millis(T0);
    let mut recorder = open(&dir.path().join("cpr.db"), &clock);

    let script = [
        (0, "start"),
        (0, "cpr"),
        (15_000, "rhythm VF/VT"),
        (5_000, "shock 200"),
        (60_000, "epi"),
        (60_000, "drug AMIO"),
        (60_000, "check"),
        (1_000, "ett"),
        (60_000, "rosc"),
        (0, "cpr"),
    ];
    for (advance, line) in script {
        clock.advance_ms(advance);
        recorder.tick();
        recorder.apply(line.parse::<Action>().unwrap()).unwrap();
    }

    let session = recorder.session();
    let labels: Vec<_> = session.events.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "Compressions START",
            "VF/VT",
            "Shock 200 J",
            "Epinephrine 1 mg",
            "Amiodarone 300 mg IV/IO",
            "Rhythm check",
            "ETT placed",
            "ROSC",
            "ROSC announced",
            "Compressions STOP",
        ]
    );

    let offsets: Vec<_> = session.events.iter().map(|e| e.relative_offset_ms).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(offsets[2], 20_000);

    let elapsed = 261_000;
    assert_eq!(session.elapsed_arrest_ms(clock_now(&clock)), elapsed);
    assert!((session.compression_total_ms() - elapsed).abs() <= COMPRESSION_TICK_MS);
    assert_eq!(session.epinephrine_count(), 1);
    assert_eq!(session.shock_count(), 1);
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
    use cprlog::Clock;
    clock.now()
}

#[test]
fn session_survives_restart_and_catches_up() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cpr.db");
    let clock = ManualClock::at_millis(T0);

    {
        let mut recorder = open(&db, &clock);
        recorder.apply(Action::Start).unwrap();
        recorder.apply(Action::ToggleCompressions).unwrap();
        recorder.apply(Action::Epinephrine).unwrap();
    }

    clock.advance_ms(45_300);
    let recorder = open(&db, &clock);
    let session = recorder.session();
    assert!(session.is_running());
    assert!(session.compression_timer.is_running);
    assert_eq!(session.compression_total_ms(), 45_000);
    assert_eq!(
        session.time_since_last_epinephrine_ms(clock_now(&clock)),
        Some(45_300)
    );
}

#[test]
fn pause_and_resume_restarts_arrest_clock() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_millis(T0);
    let mut recorder = open(&dir.path().join("cpr.db"), &clock);

    recorder.apply(Action::Start).unwrap();
    clock.advance_ms(30_000);
    assert_eq!(recorder.apply(Action::Pause).unwrap(), Outcome::Paused);
    assert_eq!(recorder.summary().elapsed_arrest_ms, 0);

    clock.advance_ms(10_000);
    assert_eq!(recorder.apply(Action::Start).unwrap(), Outcome::Started);
    clock.advance_ms(5_000);
    let Outcome::Recorded(event) = recorder.apply(Action::PulseCheck).unwrap() else {
        panic!("expected a recorded pulse check");
    };
    assert_eq!(event.relative_offset_ms, 5_000);
    assert_eq!(event.category, EventCategory::Assessment);
}

#[test]
fn reset_clears_session_but_not_patient() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cpr.db");
    let clock = ManualClock::at_millis(T0);

    {
        let mut recorder = open(&db, &clock);
        recorder
            .apply("patient id MRN-1234".parse().unwrap())
            .unwrap();
        recorder.apply(Action::Start).unwrap();
        recorder.apply(Action::Shock(Some(360.0))).unwrap();
        recorder.apply(Action::Reset).unwrap();
    }

    let recorder = open(&db, &clock);
    assert!(recorder.session().events.is_empty());
    assert!(!recorder.session().is_running());
    assert!(recorder.session().time_since_last_shock_ms(clock_now(&clock)).is_none());
    assert_eq!(recorder.meta().patient_id, "MRN-1234");
}

#[test]
fn exports_reflect_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::at_millis(T0);
    let mut recorder = open(&dir.path().join("cpr.db"), &clock);
    recorder.apply(Action::Start).unwrap();
    clock.advance_ms(2_000);
    recorder
        .apply(Action::Note("wife says \"no DNR\"".to_string()))
        .unwrap();

    let csv = recorder.render_export(ExportFormat::Csv).unwrap();
    assert!(csv.starts_with("\"Clock\",\"T+ (mm:ss)\""));
    assert!(csv.contains("\"0:02\",\"Note\",\"wife says \"\"no DNR\"\"\""));

    let out = dir.path().join("exports");
    let path = recorder.export_to(ExportFormat::Json, &out).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        export::file_name(ExportFormat::Json, clock_now(&clock))
    );
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["session"]["events"][0]["category"], "Note");
    assert_eq!(value["meta"]["location"], "ED");
}
