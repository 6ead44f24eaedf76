//! Commonly used items for convenient importing.
//!
//! ```
//! use reporting::prelude::*;
//!
//! let host = ReportingHost::new();
//! let observer = host.observer(
//!     |reports: ReportList, _: &ReportingObserver| drop(reports),
//!     ReportingObserverOptions::new().with_type("test"),
//! );
//! observer.observe();
//! ```

pub use crate::{
    Body, BodyKind, GenerateTestReportParameters, Report, ReportBody, ReportList, ReportingHost,
    ReportingObserver, ReportingObserverCallback, ReportingObserverOptions, report,
};
