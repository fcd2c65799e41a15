//! Sensitive data marker for automatic redaction
//!
//! Catalogs mark some parameters as sensitive (passwords, keys). The raw value
//! is held in a `Sensitive<T>` between parsing and fingerprinting so it can
//! never reach a log line or a rendered diff by accident.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use catdiff_core_types::Sensitive;
///
/// let password = Sensitive::new("secret123");
/// println!("{:?}", password); // Prints: ***REDACTED***
/// println!("{}", password);   // Prints: ***REDACTED***
///
/// assert_eq!(password.expose(), &"secret123");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only the fingerprinting step should need this.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
