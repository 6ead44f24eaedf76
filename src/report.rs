//! The immutable report snapshot.

use alloc::string::String;

use triomphe::Arc;

use crate::body::Body;

/// An immutable snapshot of one observed reportable event.
///
/// A report records three things: the report **type** (a string such as
/// `"deprecation"` or `"test"` that observers filter on), the **url** of the
/// context the event occurred in, and an optional type-specific
/// [`Body`].
///
/// Reports are plain values with no back-references: the payload lives
/// behind a shared pointer, so cloning is cheap and clones are
/// indistinguishable from the original. Two independently constructed
/// reports are distinct snapshots even if their fields happen to match;
/// [`ptr_eq`](Self::ptr_eq) tests whether two values are clones of the same
/// snapshot.
///
/// # Examples
///
/// ```
/// use reporting::{DeprecationReportBody, Report};
///
/// let report = Report::with_body(
///     "deprecation",
///     "https://app.example/main.js",
///     DeprecationReportBody::new("websql", "Web SQL is deprecated"),
/// );
///
/// assert_eq!(report.report_type(), "deprecation");
/// assert_eq!(report.url(), "https://app.example/main.js");
/// assert!(report.body().is_some());
/// ```
#[derive(Clone)]
pub struct Report {
    data: Arc<ReportData>,
}

struct ReportData {
    report_type: String,
    url: String,
    body: Option<Body>,
}

impl Report {
    /// Creates a report with no body.
    #[must_use]
    pub fn new(report_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self::from_parts(report_type.into(), url.into(), None)
    }

    /// Creates a report carrying the given body.
    #[must_use]
    pub fn with_body(
        report_type: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Body>,
    ) -> Self {
        Self::from_parts(report_type.into(), url.into(), Some(body.into()))
    }

    pub(crate) fn from_parts(report_type: String, url: String, body: Option<Body>) -> Self {
        Self {
            data: Arc::new(ReportData {
                report_type,
                url,
                body,
            }),
        }
    }

    /// The type string observers filter on.
    #[must_use]
    pub fn report_type(&self) -> &str {
        &self.data.report_type
    }

    /// The URL of the context the event occurred in.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.data.url
    }

    /// The type-specific payload, if the report has one.
    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.data.body.as_ref()
    }

    /// Returns `true` if `self` and `other` are clones of the same
    /// snapshot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl core::fmt::Display for Report {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} report for {}", self.report_type(), self.url())
    }
}

impl core::fmt::Debug for Report {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Report")
            .field("type", &self.data.report_type)
            .field("url", &self.data.url)
            .field("body", &self.data.body)
            .finish()
    }
}
