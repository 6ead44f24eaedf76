//! The host environment: report generation, observer fan-out, and
//! cooperative delivery turns.
//!
//! A [`ReportingHost`] plays the role the embedding environment plays for
//! the web API: it is the single place where reports are generated, the
//! registry of active observers, and the scheduler that decides when
//! callbacks run. Generating a report never runs a callback; it only
//! appends to observer queues and marks those observers as having a
//! pending delivery. The embedder drains pending deliveries on its own
//! event-processing turns with
//! [`deliver_pending_reports`](ReportingHost::deliver_pending_reports),
//! which batches everything that arrived since the previous turn into one
//! callback invocation per observer.
//!
//! Embedders that sleep between turns can register a [`DeliveryWaker`] to
//! be kicked when a delivery first becomes pending, in the manner of an
//! event-loop waker: producers call `wake()`, the embedder wakes up and
//! drains on its next turn.

use alloc::{boxed::Box, collections::VecDeque, string::String, vec::Vec};

use hashbrown::HashMap;
use log::{debug, trace, warn};
use rustc_hash::FxBuildHasher;
use triomphe::Arc;

use crate::{
    body::{Body, TestReportBody},
    observer::{
        ObserverInner, ReportingObserver, ReportingObserverCallback, ReportingObserverOptions,
    },
    params::GenerateTestReportParameters,
    report::Report,
    report_list::ReportList,
    sync::Lock,
};

/// How many reports of each type the host buffers for observers created
/// later with the `buffered` option, unless overridden on the
/// [builder](ReportingHostBuilder::buffer_limit_per_type).
pub const DEFAULT_BUFFER_LIMIT_PER_TYPE: usize = 100;

const DEFAULT_URL: &str = "about:blank";

/// Notified when a delivery first becomes pending.
///
/// Implemented for any `Fn() + Send + Sync + 'static` closure. The waker
/// is invoked at most once per idle-to-pending transition: queueing ten
/// reports between two delivery turns wakes the embedder once.
pub trait DeliveryWaker: Send + Sync + 'static {
    /// Kicks the embedder awake so it can run a delivery turn.
    fn wake(&self);
}

impl<F> DeliveryWaker for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn wake(&self) {
        self();
    }
}

pub(crate) struct HostInner {
    url: String,
    buffer_limit_per_type: usize,
    waker: Option<Box<dyn DeliveryWaker>>,
    state: Lock<HostState>,
}

struct HostState {
    observers: Vec<Arc<ObserverInner>>,
    buffer: VecDeque<Report>,
    buffered_counts: HashMap<String, usize, FxBuildHasher>,
    scheduled: Vec<Arc<ObserverInner>>,
}

/// Marks an observer as having a pending delivery. Returns `true` when the
/// scheduled set went from idle to non-empty, i.e. when the waker is owed
/// a kick.
fn schedule(scheduled: &mut Vec<Arc<ObserverInner>>, inner: &Arc<ObserverInner>) -> bool {
    if scheduled.iter().any(|o| Arc::ptr_eq(o, inner)) {
        return false;
    }
    let was_idle = scheduled.is_empty();
    scheduled.push(Arc::clone(inner));
    was_idle
}

impl HostInner {
    fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker.wake();
        }
    }

    pub(crate) fn register(&self, inner: &Arc<ObserverInner>) {
        let mut wake = false;
        {
            let mut host = self.state.lock();
            {
                let mut state = inner.state.lock();
                if state.active {
                    return;
                }
                state.active = true;
                if state.buffered_pending {
                    // Replayed at most once per observer, on its first
                    // observe() call.
                    state.buffered_pending = false;
                    for report in &host.buffer {
                        if inner.options.accepts(report.report_type()) {
                            state.queue.push(report.clone());
                        }
                    }
                }
                if !state.queue.is_empty() {
                    wake = schedule(&mut host.scheduled, inner);
                }
            }
            host.observers.push(Arc::clone(inner));
            debug!(
                "registered reporting observer ({} active)",
                host.observers.len()
            );
        }
        if wake {
            self.wake();
        }
    }

    pub(crate) fn unregister(&self, inner: &Arc<ObserverInner>) {
        {
            let mut host = self.state.lock();
            host.observers.retain(|o| !Arc::ptr_eq(o, inner));
            host.scheduled.retain(|o| !Arc::ptr_eq(o, inner));
        }
        let mut state = inner.state.lock();
        if state.active {
            state.active = false;
            let dropped = state.queue.len();
            state.queue.clear();
            debug!("disconnected reporting observer, dropped {dropped} pending reports");
        }
    }

    pub(crate) fn queue_report(&self, report: Report) {
        debug!(
            "queueing {} report for {}",
            report.report_type(),
            report.url()
        );
        let mut wake = false;
        {
            let mut host = self.state.lock();
            self.push_buffered(&mut host, report.clone());

            let HostState {
                observers,
                scheduled,
                ..
            } = &mut *host;
            let mut matched = 0usize;
            for obs in observers.iter() {
                if !obs.options.accepts(report.report_type()) {
                    continue;
                }
                obs.state.lock().queue.push(report.clone());
                matched += 1;
                if schedule(scheduled, obs) {
                    wake = true;
                }
            }
            trace!(
                "fanned {} report out to {matched} observers",
                report.report_type()
            );
        }
        if wake {
            self.wake();
        }
    }

    fn push_buffered(&self, state: &mut HostState, report: Report) {
        if self.buffer_limit_per_type == 0 {
            return;
        }
        let report_type = report.report_type();
        let count = match state.buffered_counts.get_mut(report_type) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                state.buffered_counts.insert(String::from(report_type), 1);
                1
            }
        };
        if count > self.buffer_limit_per_type {
            if let Some(pos) = state
                .buffer
                .iter()
                .position(|r| r.report_type() == report_type)
            {
                state.buffer.remove(pos);
                if let Some(count) = state.buffered_counts.get_mut(report_type) {
                    *count -= 1;
                }
                warn!("buffer for {report_type} reports is full, dropping the oldest");
            }
        }
        state.buffer.push_back(report);
    }
}

/// The environment that generates reports and drives observers.
///
/// The handle is cheaply cloneable; every clone controls the same host.
/// Hosts are configured through [`builder`](Self::builder) and never
/// invoke observer callbacks synchronously from report generation — see
/// the [module docs](self) for the turn model.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use reporting::{ReportList, ReportingHost, ReportingObserver, ReportingObserverOptions};
///
/// let host = ReportingHost::builder().url("https://app.example/main.js").build();
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let observer = host.observer(
///     move |reports: ReportList, _: &ReportingObserver| {
///         let mut seen = sink.lock().unwrap();
///         seen.extend(reports.iter().map(|r| r.report_type().to_owned()));
///     },
///     ReportingObserverOptions::new().with_type("deprecation"),
/// );
/// observer.observe();
///
/// host.generate_report("deprecation", None);
/// host.generate_report("intervention", None); // filtered out
///
/// assert!(host.has_pending_deliveries());
/// let delivered = host.deliver_pending_reports();
/// assert_eq!(delivered, 1);
/// assert_eq!(seen.lock().unwrap().as_slice(), ["deprecation"]);
/// ```
#[derive(Clone)]
pub struct ReportingHost {
    inner: Arc<HostInner>,
}

impl ReportingHost {
    /// Creates a host with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for configuring a host.
    #[must_use]
    pub fn builder() -> ReportingHostBuilder {
        ReportingHostBuilder::default()
    }

    /// The URL stamped on reports generated by this host.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Constructs an observer bound to this host.
    ///
    /// The callback is never invoked from inside this method, and the
    /// observer collects nothing until
    /// [`observe`](ReportingObserver::observe) is called.
    #[must_use]
    pub fn observer<C>(&self, callback: C, options: ReportingObserverOptions) -> ReportingObserver
    where
        C: ReportingObserverCallback,
    {
        let inner = Arc::new(ObserverInner::new(Box::new(callback), options));
        ReportingObserver::from_parts(Arc::clone(&self.inner), inner)
    }

    /// Queues a pre-built report.
    ///
    /// The report is appended to the host's bounded buffer and to the
    /// pending queue of every active observer whose filter accepts its
    /// type. Callbacks are not invoked; they run on the next
    /// [delivery turn](Self::deliver_pending_reports).
    pub fn queue_report(&self, report: Report) {
        self.inner.queue_report(report);
    }

    /// Builds a report stamped with the host URL and queues it.
    ///
    /// Returns the generated report.
    pub fn generate_report(&self, report_type: impl Into<String>, body: Option<Body>) -> Report {
        let report = Report::from_parts(report_type.into(), self.inner.url.clone(), body);
        self.queue_report(report.clone());
        report
    }

    /// Builds a synthetic `"test"` report and queues it.
    ///
    /// The report's body is a [`TestReportBody`] carrying the parameters'
    /// message. The endpoint group only matters to delivery layers outside
    /// this crate; it is logged and otherwise unused here.
    ///
    /// Returns the generated report.
    pub fn generate_test_report(&self, params: GenerateTestReportParameters) -> Report {
        debug!(
            "generating test report for endpoint group {}",
            params.group()
        );
        let body = TestReportBody::new(params.into_message());
        self.generate_report("test", Some(Body::new(body)))
    }

    /// Runs one delivery turn.
    ///
    /// Every observer scheduled since the previous turn has its callback
    /// invoked exactly once, with the batch of reports that arrived in the
    /// meantime (in arrival order) and a handle to itself. Observers whose
    /// pending queue was already drained by
    /// [`take_records`](ReportingObserver::take_records), or that
    /// disconnected after being scheduled, are skipped. Reports queued
    /// *during* the turn (for example from inside a callback) are left for
    /// the next turn.
    ///
    /// Returns the number of reports delivered.
    pub fn deliver_pending_reports(&self) -> usize {
        let scheduled = {
            let mut host = self.inner.state.lock();
            core::mem::take(&mut host.scheduled)
        };
        if scheduled.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        for obs in scheduled {
            // No lock is held while the callback runs, so callbacks may
            // freely observe, disconnect, drain, or queue new reports.
            let batch = {
                let mut state = obs.state.lock();
                if state.active {
                    core::mem::take(&mut state.queue)
                } else {
                    Vec::new()
                }
            };
            if batch.is_empty() {
                continue;
            }
            delivered += batch.len();
            let observer = ReportingObserver::from_parts(Arc::clone(&self.inner), Arc::clone(&obs));
            obs.callback.deliver(ReportList::from(batch), &observer);
        }
        debug!("delivery turn complete, {delivered} reports delivered");
        delivered
    }

    /// Whether a [delivery turn](Self::deliver_pending_reports) would
    /// currently do work.
    #[must_use]
    pub fn has_pending_deliveries(&self) -> bool {
        !self.inner.state.lock().scheduled.is_empty()
    }

    /// A snapshot of the host's buffered reports, oldest first.
    ///
    /// These are the reports a `buffered` observer would have replayed
    /// into its first delivery if it called
    /// [`observe`](ReportingObserver::observe) right now.
    #[must_use]
    pub fn buffered_reports(&self) -> ReportList {
        self.inner.state.lock().buffer.iter().cloned().collect()
    }
}

impl Default for ReportingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ReportingHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ReportingHost")
            .field("url", &self.inner.url)
            .field("observers", &state.observers.len())
            .field("buffered", &state.buffer.len())
            .field("scheduled", &state.scheduled.len())
            .finish()
    }
}

/// Builder for a [`ReportingHost`].
pub struct ReportingHostBuilder {
    url: String,
    buffer_limit_per_type: usize,
    waker: Option<Box<dyn DeliveryWaker>>,
}

impl Default for ReportingHostBuilder {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_URL),
            buffer_limit_per_type: DEFAULT_BUFFER_LIMIT_PER_TYPE,
            waker: None,
        }
    }
}

impl ReportingHostBuilder {
    /// Sets the URL stamped on generated reports.
    ///
    /// Defaults to `"about:blank"`.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Caps how many reports of each type the host keeps for buffered
    /// replay.
    ///
    /// When the cap is exceeded the oldest report of that type is dropped.
    /// `0` disables buffering entirely. Defaults to
    /// [`DEFAULT_BUFFER_LIMIT_PER_TYPE`].
    #[must_use]
    pub fn buffer_limit_per_type(mut self, limit: usize) -> Self {
        self.buffer_limit_per_type = limit;
        self
    }

    /// Registers a waker kicked when a delivery first becomes pending.
    #[must_use]
    pub fn waker<W: DeliveryWaker>(mut self, waker: W) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }

    /// Builds the host.
    #[must_use]
    pub fn build(self) -> ReportingHost {
        ReportingHost {
            inner: Arc::new(HostInner {
                url: self.url,
                buffer_limit_per_type: self.buffer_limit_per_type,
                waker: self.waker,
                state: Lock::new(HostState {
                    observers: Vec::new(),
                    buffer: VecDeque::new(),
                    buffered_counts: HashMap::default(),
                    scheduled: Vec::new(),
                }),
            }),
        }
    }
}

impl core::fmt::Debug for ReportingHostBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReportingHostBuilder")
            .field("url", &self.url)
            .field("buffer_limit_per_type", &self.buffer_limit_per_type)
            .field("waker", &self.waker.is_some())
            .finish()
    }
}
