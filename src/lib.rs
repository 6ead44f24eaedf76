#![cfg_attr(not(doc), no_std)]
#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! An in-memory model of the Reporting API: reports, report bodies, and
//! reporting observers.
//!
//! ## Overview
//!
//! This crate models the object surface a platform exposes for
//! reporting: immutable [`Report`] snapshots (a type string, a source URL,
//! and an optional type-specific [`Body`]), and [`ReportingObserver`]
//! subscriptions that accumulate matching reports and deliver them to a
//! callback in batches.
//!
//! Report generation, network delivery, endpoint configuration, and
//! throttling belong to the embedding environment and are out of scope.
//! What the embedder needs from this crate is the seam those features plug
//! into: a [`ReportingHost`] that generates reports, fans them out to the
//! observers whose filters accept them, and runs callbacks on explicit,
//! cooperative delivery turns.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use reporting::prelude::*;
//!
//! let host = ReportingHost::builder().url("https://app.example/main.js").build();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let observer = host.observer(
//!     move |reports: ReportList, _: &ReportingObserver| {
//!         sink.lock().unwrap().extend(
//!             reports.iter().map(|report| report.report_type().to_owned()),
//!         );
//!     },
//!     ReportingObserverOptions::new().with_type("deprecation"),
//! );
//! observer.observe();
//!
//! host.generate_report("deprecation", None);
//! host.deliver_pending_reports();
//!
//! assert_eq!(seen.lock().unwrap().as_slice(), ["deprecation"]);
//! ```
//!
//! ## Core Concepts
//!
//! On a mechanical level there are three kinds of object:
//!
//! - A [`Report`] is a passive, immutable record of one reportable event.
//!   Its [`Body`] is an open payload: this crate knows a few body types
//!   ([`TestReportBody`], [`DeprecationReportBody`],
//!   [`InterventionReportBody`]) and any other subsystem can define more
//!   by implementing [`ReportBody`].
//! - A [`ReportingObserver`] is a subscription handle with a tiny
//!   lifecycle: [`observe`](ReportingObserver::observe) starts collection,
//!   [`take_records`](ReportingObserver::take_records) drains whatever has
//!   accumulated, [`disconnect`](ReportingObserver::disconnect) severs the
//!   subscription and discards anything pending.
//! - A [`ReportingHost`] stands in for the embedding environment: it owns
//!   the observer registry, keeps a bounded buffer of past reports for
//!   observers that opt into
//!   [`buffered`](ReportingObserverOptions::buffered) replay, and decides
//!   when callbacks run.
//!
//! ## Delivery Model
//!
//! Callbacks never run inside the call that produced a report. Generating
//! a report only appends it to the pending queue of each matching observer
//! and marks those observers as scheduled; the embedder then drains the
//! scheduled set with
//! [`deliver_pending_reports`](ReportingHost::deliver_pending_reports) on
//! its own event-processing turns. Everything that arrived for one
//! observer since the previous turn is batched into a single callback
//! invocation, in arrival order. There is no ordering guarantee *across*
//! observers. Embedders that sleep between turns can register a
//! [`DeliveryWaker`] to be kicked when work first appears.
//!
//! ## Feature Flags
//!
//! - `std` — use `std::sync` locks instead of spinlocks. The crate is
//!   `no_std` + `alloc` by default; the feature changes no API.

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod macros;

pub mod prelude;

mod body;
mod host;
mod observer;
mod params;
mod report;
mod report_list;
mod sync;

pub use self::{
    body::{
        Body, BodyKind, DeprecationReportBody, InterventionReportBody, ReportBody, TestReportBody,
    },
    host::{
        DEFAULT_BUFFER_LIMIT_PER_TYPE, DeliveryWaker, ReportingHost, ReportingHostBuilder,
    },
    observer::{ReportingObserver, ReportingObserverCallback, ReportingObserverOptions},
    params::{
        DEFAULT_GROUP, GenerateTestReportParameters, GenerateTestReportParametersBuilder,
        ParameterError,
    },
    report::Report,
    report_list::{ReportList, ReportListIntoIter, ReportListIter},
};
