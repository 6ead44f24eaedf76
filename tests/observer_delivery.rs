//! Integration tests for the observer lifecycle and delivery semantics.
//!
//! ## Covered behaviors
//!
//! - Construction and `observe()` never invoke the callback synchronously
//! - One delivery turn batches everything that arrived since the last
//!   turn, in arrival order
//! - The `types` filter restricts collection; an empty filter accepts all
//! - `take_records()` drains the pending queue and starves the callback
//! - `disconnect()` stops delivery, drops pending records, and is
//!   idempotent
//! - `observe()` is idempotent and an observer can re-observe after
//!   disconnecting
//! - Observers do not interfere with each other
//! - Callbacks can drive their own observer through the delivered handle
//! - Reports queued during a turn are delivered on the next turn

use std::sync::{Arc, Mutex};

use reporting::{
    Report, ReportList, ReportingHost, ReportingObserver, ReportingObserverOptions,
};

/// Records every delivered batch as a list of report type strings.
#[derive(Clone, Default)]
struct Recorder {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Recorder {
    fn callback(&self) -> impl Fn(ReportList, &ReportingObserver) + Send + Sync + 'static {
        let batches = Arc::clone(&self.batches);
        move |reports: ReportList, _: &ReportingObserver| {
            let batch = reports
                .iter()
                .map(|report| report.report_type().to_owned())
                .collect();
            batches.lock().unwrap().push(batch);
        }
    }

    fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    fn is_empty(&self) -> bool {
        self.batches.lock().unwrap().is_empty()
    }
}

fn types_of(records: &ReportList) -> Vec<String> {
    records
        .iter()
        .map(|report| report.report_type().to_owned())
        .collect()
}

#[test]
fn construction_and_observe_never_invoke_the_callback() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();

    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    assert!(recorder.is_empty());

    observer.observe();
    host.generate_report("deprecation", None);
    // Still nothing: callbacks only run on a delivery turn.
    assert!(recorder.is_empty());
    assert!(host.has_pending_deliveries());

    host.deliver_pending_reports();
    assert_eq!(recorder.batches(), [["deprecation"]]);
}

#[test]
fn one_turn_batches_in_arrival_order() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    observer.observe();

    host.generate_report("deprecation", None);
    host.generate_report("intervention", None);
    host.generate_report("crash", None);

    assert_eq!(host.deliver_pending_reports(), 3);
    assert_eq!(
        recorder.batches(),
        [["deprecation", "intervention", "crash"]]
    );

    // A second turn with nothing new does not invoke the callback again.
    assert_eq!(host.deliver_pending_reports(), 0);
    assert_eq!(recorder.batches().len(), 1);
}

#[test]
fn type_filter_restricts_collection() {
    let host = ReportingHost::new();
    let filtered = Recorder::default();
    let unfiltered = Recorder::default();

    let observer = host.observer(
        filtered.callback(),
        ReportingObserverOptions::new().with_type("deprecation"),
    );
    observer.observe();
    let all = host.observer(unfiltered.callback(), ReportingObserverOptions::new());
    all.observe();

    host.generate_report("deprecation", None);
    host.generate_report("intervention", None);
    host.deliver_pending_reports();

    assert_eq!(filtered.batches(), [["deprecation"]]);
    assert_eq!(unfiltered.batches(), [["deprecation", "intervention"]]);
}

#[test]
fn take_records_drains_and_starves_the_callback() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    observer.observe();

    host.generate_report("deprecation", None);
    host.generate_report("crash", None);

    let records = observer.take_records();
    assert_eq!(types_of(&records), ["deprecation", "crash"]);

    // Twice in a row with nothing new: the second drain is empty.
    assert!(observer.take_records().is_empty());

    // The observer was scheduled, but its queue is gone; the turn skips it.
    assert_eq!(host.deliver_pending_reports(), 0);
    assert!(recorder.is_empty());
}

#[test]
fn disconnect_stops_delivery_and_drops_pending_records() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    observer.observe();

    host.generate_report("deprecation", None);
    observer.disconnect();

    // The scheduled delivery was cancelled and the pending queue dropped.
    assert_eq!(host.deliver_pending_reports(), 0);
    assert!(recorder.is_empty());
    assert!(observer.take_records().is_empty());

    // New reports no longer reach the observer at all.
    host.generate_report("deprecation", None);
    host.deliver_pending_reports();
    assert!(recorder.is_empty());
    assert!(observer.take_records().is_empty());

    // Idempotent.
    observer.disconnect();
}

#[test]
fn observe_is_idempotent() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    observer.observe();
    observer.observe();

    host.generate_report("deprecation", None);
    host.deliver_pending_reports();

    // One registration, one copy.
    assert_eq!(recorder.batches(), [["deprecation"]]);
}

#[test]
fn reobserve_after_disconnect_collects_again() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());

    observer.observe();
    host.generate_report("deprecation", None);
    observer.disconnect();

    observer.observe();
    host.generate_report("intervention", None);
    host.deliver_pending_reports();

    // Only the report generated after re-observing survives.
    assert_eq!(recorder.batches(), [["intervention"]]);
}

#[test]
fn observers_do_not_interfere() {
    let host = ReportingHost::new();
    let first = Recorder::default();
    let second = Recorder::default();

    let a = host.observer(first.callback(), ReportingObserverOptions::new());
    let b = host.observer(second.callback(), ReportingObserverOptions::new());
    a.observe();
    b.observe();

    host.generate_report("deprecation", None);

    // Draining one observer does not touch the other.
    assert_eq!(types_of(&a.take_records()), ["deprecation"]);
    host.deliver_pending_reports();
    assert!(first.is_empty());
    assert_eq!(second.batches(), [["deprecation"]]);
}

#[test]
fn clones_control_the_same_subscription() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    let clone = observer.clone();
    assert!(observer.ptr_eq(&clone));

    clone.observe();
    host.generate_report("deprecation", None);
    clone.disconnect();

    host.deliver_pending_reports();
    assert!(recorder.is_empty());
    assert!(observer.take_records().is_empty());
}

#[test]
fn callback_can_disconnect_its_own_observer() {
    let host = ReportingHost::new();
    let batches = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&batches);
    let observer = host.observer(
        move |reports: ReportList, observer: &ReportingObserver| {
            sink.lock().unwrap().push(reports.len());
            observer.disconnect();
        },
        ReportingObserverOptions::new(),
    );
    observer.observe();

    host.generate_report("deprecation", None);
    host.deliver_pending_reports();

    host.generate_report("deprecation", None);
    host.deliver_pending_reports();

    // The first turn delivered one report; the self-disconnect stuck.
    assert_eq!(*batches.lock().unwrap(), [1usize]);
}

#[test]
fn reports_queued_during_a_turn_deliver_on_the_next_turn() {
    let host = ReportingHost::new();
    let batches = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&batches);
    let producer = host.clone();
    let observer = host.observer(
        move |reports: ReportList, _: &ReportingObserver| {
            let mut batches = sink.lock().unwrap();
            let first_turn = batches.is_empty();
            batches.push(types_of(&reports));
            if first_turn {
                producer.generate_report("crash", None);
            }
        },
        ReportingObserverOptions::new(),
    );
    observer.observe();

    host.generate_report("deprecation", None);

    // Turn one delivers the original report; the report generated inside
    // the callback waits for turn two.
    assert_eq!(host.deliver_pending_reports(), 1);
    assert!(host.has_pending_deliveries());
    assert_eq!(host.deliver_pending_reports(), 1);

    assert_eq!(
        *batches.lock().unwrap(),
        [vec!["deprecation".to_owned()], vec!["crash".to_owned()]]
    );
}

#[test]
fn queue_report_accepts_prebuilt_reports() {
    let host = ReportingHost::new();
    let recorder = Recorder::default();
    let observer = host.observer(recorder.callback(), ReportingObserverOptions::new());
    observer.observe();

    host.queue_report(Report::new("crash", "https://other.example/worker.js"));
    host.deliver_pending_reports();

    assert_eq!(recorder.batches(), [["crash"]]);
}
