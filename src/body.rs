//! Type-specific report payloads.
//!
//! A [`Report`](crate::Report) optionally carries a **body**: the payload
//! that gives the report its type-specific meaning. The base contract
//! declares no required fields — it is a capability marker, not a schema —
//! and concrete body types are defined by whichever subsystem generates the
//! report. This module provides:
//!
//! - [`ReportBody`]: the open trait every body type implements.
//! - [`BodyKind`]: a variant tag for the body types known to this crate.
//! - [`Body`]: a cheaply cloneable, type-erased handle that stores any
//!   [`ReportBody`] and can be downcast back to the concrete type.
//! - The known body types: [`TestReportBody`], [`DeprecationReportBody`]
//!   and [`InterventionReportBody`].
//!
//! # Examples
//!
//! Foreign body types only need a [`Debug`](core::fmt::Debug)
//! implementation:
//!
//! ```
//! use reporting::{Body, BodyKind, ReportBody};
//!
//! #[derive(Debug)]
//! struct PermissionsPolicyViolationBody {
//!     feature: &'static str,
//! }
//!
//! impl ReportBody for PermissionsPolicyViolationBody {}
//!
//! let body = Body::new(PermissionsPolicyViolationBody { feature: "camera" });
//! assert_eq!(body.kind(), BodyKind::Other);
//! assert_eq!(
//!     body.downcast_ref::<PermissionsPolicyViolationBody>()
//!         .unwrap()
//!         .feature,
//!     "camera"
//! );
//! ```

use alloc::string::String;
use core::any::Any;

use triomphe::Arc;
use unsize::CoerceUnsize;

/// The payload of a [`Report`](crate::Report).
///
/// This is an open contract: the base declares no required fields, and the
/// set of body types is extended by the subsystems that generate reports.
/// Implementors get type-erased storage in a [`Body`] and downcasting back
/// to the concrete type for free.
///
/// The only provided method is [`kind`](Self::kind), a variant tag that
/// lets consumers dispatch on the body types known to this crate without
/// downcasting. The default implementation returns [`BodyKind::Other`], so
/// a foreign body type needs zero required items.
pub trait ReportBody: Any + core::fmt::Debug + Send + Sync {
    /// The variant tag of this body type.
    fn kind(&self) -> BodyKind {
        BodyKind::Other
    }
}

/// Variant tag for the body types known to this crate.
///
/// The set of body types is open: specifications other than the one a body
/// originated from can define new ones. Bodies this crate does not know
/// about report [`BodyKind::Other`] and remain fully usable through
/// [`Body::downcast_ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BodyKind {
    /// A synthetic body produced by
    /// [`generate_test_report`](crate::ReportingHost::generate_test_report).
    Test,
    /// A deprecated-feature-was-used body.
    Deprecation,
    /// A browser-intervention body.
    Intervention,
    /// A body type defined outside this crate.
    Other,
}

/// A cheaply cloneable, type-erased [`ReportBody`] handle.
///
/// `Body` stores any [`ReportBody`] behind a shared pointer, so cloning a
/// body (or a report containing one) never copies the payload. The concrete
/// type can be recovered with [`downcast_ref`](Self::downcast_ref).
///
/// # Examples
///
/// ```
/// use reporting::{Body, BodyKind, TestReportBody};
///
/// let body = Body::new(TestReportBody::new("it works"));
/// let copy = body.clone();
///
/// assert_eq!(copy.kind(), BodyKind::Test);
/// assert_eq!(
///     copy.downcast_ref::<TestReportBody>().unwrap().message(),
///     "it works"
/// );
/// assert!(copy.downcast_ref::<reporting::DeprecationReportBody>().is_none());
/// ```
#[derive(Clone)]
pub struct Body {
    inner: Arc<dyn ReportBody>,
}

impl Body {
    /// Wraps a concrete body in a type-erased handle.
    #[must_use]
    pub fn new<B: ReportBody>(body: B) -> Self {
        Self {
            inner: Arc::new(body).unsize(unsize::Coercion!(to dyn ReportBody)),
        }
    }

    /// The variant tag of the stored body.
    #[must_use]
    pub fn kind(&self) -> BodyKind {
        self.inner.kind()
    }

    /// Returns `true` if the stored body is a `B`.
    #[must_use]
    pub fn is<B: ReportBody>(&self) -> bool {
        self.downcast_ref::<B>().is_some()
    }

    /// Returns a reference to the stored body if it is a `B`.
    #[must_use]
    pub fn downcast_ref<B: ReportBody>(&self) -> Option<&B> {
        let any: &dyn Any = &*self.inner;
        any.downcast_ref::<B>()
    }
}

impl core::fmt::Debug for Body {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.inner, f)
    }
}

// Mirrors the anyhow-style conversion: sound because `Body` itself never
// implements `ReportBody`.
impl<B: ReportBody> From<B> for Body {
    fn from(body: B) -> Self {
        Self::new(body)
    }
}

/// The body of a synthetic `"test"` report.
///
/// Produced by
/// [`generate_test_report`](crate::ReportingHost::generate_test_report)
/// from the `message` of a
/// [`GenerateTestReportParameters`](crate::GenerateTestReportParameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReportBody {
    message: String,
}

impl TestReportBody {
    /// Creates a test body with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message carried by the test report.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ReportBody for TestReportBody {
    fn kind(&self) -> BodyKind {
        BodyKind::Test
    }
}

/// The body of a `"deprecation"` report: a deprecated platform feature was
/// used.
///
/// # Examples
///
/// ```
/// use reporting::DeprecationReportBody;
///
/// let body = DeprecationReportBody::new(
///     "websql",
///     "Web SQL is deprecated; use IndexedDB instead",
/// )
/// .with_source("https://app.example/db.js", 42, 7);
///
/// assert_eq!(body.id(), "websql");
/// assert_eq!(body.line_number(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationReportBody {
    id: String,
    message: String,
    source_file: Option<String>,
    line_number: Option<u32>,
    column_number: Option<u32>,
}

impl DeprecationReportBody {
    /// Creates a deprecation body for the feature identified by `id`.
    #[must_use]
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            source_file: None,
            line_number: None,
            column_number: None,
        }
    }

    /// Records where in the source the deprecated feature was used.
    #[must_use]
    pub fn with_source(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.source_file = Some(file.into());
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    /// Identifier of the deprecated feature.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable description of the deprecation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source file in which the deprecated feature was used, if known.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// 1-based line of the use site, if known.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    /// 1-based column of the use site, if known.
    #[must_use]
    pub fn column_number(&self) -> Option<u32> {
        self.column_number
    }
}

impl ReportBody for DeprecationReportBody {
    fn kind(&self) -> BodyKind {
        BodyKind::Deprecation
    }
}

/// The body of an `"intervention"` report: the host changed page behavior
/// on its own initiative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionReportBody {
    id: String,
    message: String,
    source_file: Option<String>,
}

impl InterventionReportBody {
    /// Creates an intervention body for the intervention identified by `id`.
    #[must_use]
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            source_file: None,
        }
    }

    /// Records the source file the intervention applies to.
    #[must_use]
    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    /// Identifier of the intervention.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable description of the intervention.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source file the intervention applies to, if known.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }
}

impl ReportBody for InterventionReportBody {
    fn kind(&self) -> BodyKind {
        BodyKind::Intervention
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[derive(Debug)]
    struct OpaqueBody;
    impl ReportBody for OpaqueBody {}

    #[test]
    fn test_body_auto_traits() {
        static_assertions::assert_impl_all!(Body: Send, Sync, Clone);
        static_assertions::assert_not_impl_any!(Body: Copy);
    }

    #[test]
    fn test_downcast_recovers_concrete_type() {
        let body = Body::new(TestReportBody::new("hello"));
        assert!(body.is::<TestReportBody>());
        assert!(!body.is::<DeprecationReportBody>());
        assert_eq!(
            body.downcast_ref::<TestReportBody>().unwrap().message(),
            "hello"
        );
    }

    #[test]
    fn test_kind_dispatch() {
        assert_eq!(Body::new(TestReportBody::new("m")).kind(), BodyKind::Test);
        assert_eq!(
            Body::new(DeprecationReportBody::new("id", "m")).kind(),
            BodyKind::Deprecation
        );
        assert_eq!(
            Body::new(InterventionReportBody::new("id", "m")).kind(),
            BodyKind::Intervention
        );
        assert_eq!(Body::new(OpaqueBody).kind(), BodyKind::Other);
    }

    #[test]
    fn test_debug_delegates_to_payload() {
        let body = Body::new(TestReportBody::new("m"));
        assert_eq!(
            format!("{body:?}"),
            format!("{:?}", TestReportBody::new("m"))
        );
    }

    #[test]
    fn test_clone_shares_payload() {
        let body = Body::new(DeprecationReportBody::new("websql", "gone"));
        let copy = body.clone();
        let a: *const DeprecationReportBody = body.downcast_ref().unwrap();
        let b: *const DeprecationReportBody = copy.downcast_ref().unwrap();
        assert_eq!(a, b);
    }
}
