//! Observers: subscription handles that collect and deliver reports.
//!
//! A [`ReportingObserver`] is constructed by a
//! [`ReportingHost`](crate::ReportingHost) from a callback and a set of
//! [`ReportingObserverOptions`]. Once [`observe`](ReportingObserver::observe)
//! has been called, the host appends every matching [`Report`] to the
//! observer's pending queue and schedules the callback to run on a later
//! delivery turn. The pending queue can also be drained synchronously with
//! [`take_records`](ReportingObserver::take_records), and
//! [`disconnect`](ReportingObserver::disconnect) severs the subscription.

use alloc::{boxed::Box, string::String, vec::Vec};

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use triomphe::Arc;

use crate::{host::HostInner, report::Report, report_list::ReportList, sync::Lock};

/// Configuration for a [`ReportingObserver`].
///
/// `types` restricts which report type strings the observer collects; an
/// empty set accepts every type. The set preserves insertion order and
/// ignores duplicates. `buffered` requests that reports generated before
/// the observer existed be included in its first delivery.
///
/// # Examples
///
/// ```
/// use reporting::ReportingObserverOptions;
///
/// let options = ReportingObserverOptions::new()
///     .with_type("deprecation")
///     .with_type("intervention")
///     .with_type("deprecation") // duplicate, ignored
///     .buffered(true);
///
/// assert_eq!(
///     options.types().collect::<Vec<_>>(),
///     ["deprecation", "intervention"]
/// );
/// assert!(options.is_buffered());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReportingObserverOptions {
    types: IndexSet<String, FxBuildHasher>,
    buffered: bool,
}

impl ReportingObserverOptions {
    /// Creates options that accept every report type, without buffered
    /// replay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a report type to the filter set.
    #[must_use]
    pub fn with_type(mut self, report_type: impl Into<String>) -> Self {
        self.types.insert(report_type.into());
        self
    }

    /// Adds several report types to the filter set.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Requests (or cancels) buffered replay of pre-existing reports.
    #[must_use]
    pub fn buffered(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }

    /// The configured type filter, in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Whether buffered replay was requested.
    #[must_use]
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// Whether a report of the given type passes the filter.
    pub(crate) fn accepts(&self, report_type: &str) -> bool {
        self.types.is_empty() || self.types.contains(report_type)
    }
}

/// The handler invoked when new reports are delivered to an observer.
///
/// Implemented for any `Fn(ReportList, &ReportingObserver)` closure that is
/// `Send + Sync + 'static`, so most callers never implement this trait by
/// hand:
///
/// ```
/// use reporting::{ReportList, ReportingHost, ReportingObserver};
///
/// let host = ReportingHost::new();
/// let observer = host.observer(
///     |reports: ReportList, _observer: &ReportingObserver| {
///         for report in &reports {
///             // handle the report
///             let _ = report.report_type();
///         }
///     },
///     Default::default(),
/// );
/// ```
pub trait ReportingObserverCallback: Send + Sync + 'static {
    /// Called with a batch of newly arrived reports, in arrival order, and
    /// a handle to the observer they were delivered to.
    fn deliver(&self, reports: ReportList, observer: &ReportingObserver);
}

impl<F> ReportingObserverCallback for F
where
    F: Fn(ReportList, &ReportingObserver) + Send + Sync + 'static,
{
    fn deliver(&self, reports: ReportList, observer: &ReportingObserver) {
        self(reports, observer);
    }
}

pub(crate) struct ObserverInner {
    pub(crate) callback: Box<dyn ReportingObserverCallback>,
    pub(crate) options: ReportingObserverOptions,
    pub(crate) state: Lock<ObserverState>,
}

pub(crate) struct ObserverState {
    pub(crate) active: bool,
    /// Consumed by the first `observe()`; see the host module for the
    /// replay rules.
    pub(crate) buffered_pending: bool,
    pub(crate) queue: Vec<Report>,
}

impl ObserverInner {
    pub(crate) fn new(
        callback: Box<dyn ReportingObserverCallback>,
        options: ReportingObserverOptions,
    ) -> Self {
        let buffered_pending = options.is_buffered();
        Self {
            callback,
            options,
            state: Lock::new(ObserverState {
                active: false,
                buffered_pending,
                queue: Vec::new(),
            }),
        }
    }
}

/// A subscription handle that collects and delivers [`Report`]s matching a
/// filter.
///
/// Observers are created with
/// [`ReportingHost::observer`](crate::ReportingHost::observer); the
/// constructor never invokes the callback. The handle is cheaply cloneable,
/// and every clone controls the same subscription.
///
/// # Lifecycle
///
/// - [`observe`](Self::observe) starts collection (idempotent).
/// - [`take_records`](Self::take_records) drains the not-yet-delivered
///   queue without waiting for a delivery turn.
/// - [`disconnect`](Self::disconnect) stops collection and discards
///   anything still pending (idempotent).
///
/// All three always succeed; there are no error conditions at this level.
///
/// # Examples
///
/// ```
/// use reporting::{ReportList, ReportingHost, ReportingObserver, ReportingObserverOptions};
///
/// let host = ReportingHost::builder().url("https://app.example/").build();
/// let observer = host.observer(
///     |_: ReportList, _: &ReportingObserver| {},
///     ReportingObserverOptions::new().with_type("deprecation"),
/// );
///
/// observer.observe();
/// host.generate_report("deprecation", None);
///
/// // Drain synchronously instead of waiting for a delivery turn.
/// let records = observer.take_records();
/// assert_eq!(records.len(), 1);
/// assert!(observer.take_records().is_empty());
///
/// observer.disconnect();
/// ```
#[derive(Clone)]
pub struct ReportingObserver {
    host: Arc<HostInner>,
    inner: Arc<ObserverInner>,
}

impl ReportingObserver {
    pub(crate) fn from_parts(host: Arc<HostInner>, inner: Arc<ObserverInner>) -> Self {
        Self { host, inner }
    }

    /// Begins active collection.
    ///
    /// Calling this again while already observing has no additional
    /// effect. If the observer was configured with
    /// [`buffered`](ReportingObserverOptions::buffered), the host's
    /// buffered reports that match the filter are moved into the pending
    /// queue the first time this is called, and show up in the first
    /// delivered batch (or the next
    /// [`take_records`](Self::take_records) call).
    ///
    /// The callback is never invoked from inside this method.
    pub fn observe(&self) {
        self.host.register(&self.inner);
    }

    /// Stops collection and discards any pending, undelivered reports.
    ///
    /// After this call the callback will not be invoked again — even for
    /// deliveries that were already scheduled — and a subsequent
    /// [`take_records`](Self::take_records) returns an empty list.
    /// Calling this while not observing has no effect.
    pub fn disconnect(&self) {
        self.host.unregister(&self.inner);
    }

    /// Drains and returns the not-yet-delivered reports, in arrival order.
    ///
    /// The returned list may be empty. Records taken here are removed from
    /// the pending queue, so they will not also be handed to the callback.
    #[must_use]
    pub fn take_records(&self) -> ReportList {
        let mut state = self.inner.state.lock();
        ReportList::from(core::mem::take(&mut state.queue))
    }

    /// The options this observer was constructed with.
    #[must_use]
    pub fn options(&self) -> &ReportingObserverOptions {
        &self.inner.options
    }

    /// Whether the two handles control the same subscription.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl core::fmt::Debug for ReportingObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ReportingObserver")
            .field("active", &state.active)
            .field("pending", &state.queue.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
