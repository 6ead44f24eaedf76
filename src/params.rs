//! Parameters for triggering synthetic test reports.

use alloc::string::String;

/// The endpoint group used when none is specified.
pub const DEFAULT_GROUP: &str = "default";

/// Parameters for
/// [`generate_test_report`](crate::ReportingHost::generate_test_report).
///
/// `message` is required and has no default; `group` always resolves to a
/// concrete string, `"default"` when unset. The group names the endpoint
/// group a delivery layer would route the synthetic report to; this crate
/// carries it but performs no network delivery.
///
/// # Examples
///
/// ```
/// use reporting::GenerateTestReportParameters;
///
/// let params = GenerateTestReportParameters::new("ping");
/// assert_eq!(params.message(), "ping");
/// assert_eq!(params.group(), "default");
///
/// let params = GenerateTestReportParameters::new("ping").with_group("qa");
/// assert_eq!(params.group(), "qa");
/// ```
///
/// When the message comes from an optional source, use the
/// [builder](Self::builder), which rejects construction without one:
///
/// ```
/// use reporting::{GenerateTestReportParameters, ParameterError};
///
/// let err = GenerateTestReportParameters::builder()
///     .group("qa")
///     .build()
///     .unwrap_err();
/// assert_eq!(err, ParameterError::MissingMessage);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateTestReportParameters {
    message: String,
    group: String,
}

impl GenerateTestReportParameters {
    /// Creates parameters with the given message and the `"default"`
    /// group.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            group: String::from(DEFAULT_GROUP),
        }
    }

    /// Replaces the endpoint group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Returns a builder for assembling parameters from optional inputs.
    #[must_use]
    pub fn builder() -> GenerateTestReportParametersBuilder {
        GenerateTestReportParametersBuilder::default()
    }

    /// The message the synthetic report's body will carry.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The endpoint group, `"default"` unless overridden.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    pub(crate) fn into_message(self) -> String {
        self.message
    }
}

/// Builder for [`GenerateTestReportParameters`].
///
/// Unlike [`GenerateTestReportParameters::new`], the builder accepts its
/// fields in any order and from optional sources, and surfaces the one
/// validation rule of the type: a missing `message` is rejected at
/// [`build`](Self::build) time.
#[derive(Clone, Debug, Default)]
pub struct GenerateTestReportParametersBuilder {
    message: Option<String>,
    group: Option<String>,
}

impl GenerateTestReportParametersBuilder {
    /// Sets the required message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the endpoint group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Validates the inputs and builds the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::MissingMessage`] if no message was
    /// supplied.
    pub fn build(self) -> Result<GenerateTestReportParameters, ParameterError> {
        let message = self.message.ok_or(ParameterError::MissingMessage)?;
        Ok(GenerateTestReportParameters {
            message,
            group: self.group.unwrap_or_else(|| String::from(DEFAULT_GROUP)),
        })
    }
}

/// Validation errors for parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParameterError {
    /// The required `message` field was not supplied.
    #[error("missing required field `message`")]
    MissingMessage,
}
