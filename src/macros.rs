/// Constructs a [`Report`](crate::Report).
///
/// This is shorthand for [`Report::new`](crate::Report::new) (two
/// arguments) or [`Report::with_body`](crate::Report::with_body) (three
/// arguments). The body argument accepts anything convertible into a
/// [`Body`](crate::Body), including every concrete
/// [`ReportBody`](crate::ReportBody) type.
///
/// # Examples
///
/// ```
/// use reporting::{report, BodyKind, DeprecationReportBody};
///
/// let plain = report!("crash", "https://app.example/");
/// assert!(plain.body().is_none());
///
/// let with_body = report!(
///     "deprecation",
///     "https://app.example/main.js",
///     DeprecationReportBody::new("websql", "Web SQL is deprecated"),
/// );
/// assert_eq!(with_body.body().unwrap().kind(), BodyKind::Deprecation);
/// ```
#[macro_export]
macro_rules! report {
    ($report_type:expr, $url:expr $(,)?) => {
        $crate::Report::new($report_type, $url)
    };
    ($report_type:expr, $url:expr, $body:expr $(,)?) => {
        $crate::Report::with_body($report_type, $url, $body)
    };
}
