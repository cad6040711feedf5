//! Diagnostic sink port.

/// Severity-tagged message sink supplied by the host.
///
/// Fire-and-forget: implementations must not fail or block the caller.
#[cfg_attr(test, mockall::automock)]
pub trait LogPort: Send + Sync {
    fn severe(&self, message: &str);
}
