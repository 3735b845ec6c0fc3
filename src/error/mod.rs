//! Error values that accumulate a diagnostic trail as they cross call
//! boundaries, while keeping the originating message stable.
//!
//! A [`TrailError`] carries two strings: the `message` set once at the point
//! of origin, and the `trail` that grows by one delimiter-joined fragment per
//! wrap, most recent fragment first. Absence is modelled as `Option`: wrapping
//! or reading `None` is always a safe no-op.

use std::fmt;

mod join;

pub use join::{join, join_errors};

/// Default delimiter between trail fragments.
pub const SEPARATOR: &str = " ---> ";

/// An error value with a stable origin message and an accumulated trail.
///
/// Both fields are immutable after construction; every wrap produces a new
/// value. `Display` and [`std::error::Error`] render the short `message`,
/// never the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailError {
    message: String,
    trail: String,
}

/// Capability interface for error types that carry a diagnostic trail.
///
/// Checked by interface satisfaction, not runtime type inspection, so any
/// error implementation can opt in.
pub trait HasTrail {
    fn trail(&self) -> &str;
}

impl TrailError {
    /// Constructs an error whose trail equals its message. Never fails.
    pub fn new(text: impl Into<String>) -> Self {
        let message = text.into();
        let trail = message.clone();
        Self { message, trail }
    }

    /// Formatted-message form of [`TrailError::new`].
    pub fn new_fmt(args: fmt::Arguments<'_>) -> Self {
        Self::new(args.to_string())
    }

    /// Degrades a foreign error into a trail-carrying one: both `message` and
    /// `trail` become the error's own textual description.
    pub fn from_error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::new(err.to_string())
    }

    pub(crate) fn from_parts(message: String, trail: String) -> Self {
        Self { message, trail }
    }

    /// The original, unadorned description. Stable under any number of wraps.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepends one context fragment to the trail using the default
    /// [`SEPARATOR`]. An empty fragment leaves the trail unchanged.
    pub fn context(self, fragment: impl fmt::Display) -> Self {
        self.context_sep(SEPARATOR, fragment)
    }

    /// Like [`TrailError::context`] with an explicit delimiter.
    pub fn context_sep(mut self, sep: &str, fragment: impl fmt::Display) -> Self {
        let prefix = fragment.to_string();
        if prefix.is_empty() {
            return self;
        }
        let mut trail = String::with_capacity(prefix.len() + sep.len() + self.trail.len());
        trail.push_str(&prefix);
        trail.push_str(sep);
        trail.push_str(&self.trail);
        self.trail = trail;
        self
    }
}

impl HasTrail for TrailError {
    fn trail(&self) -> &str {
        &self.trail
    }
}

impl fmt::Display for TrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TrailError {}

/// Wraps `err` with context fragments, skipping absent ones.
///
/// `None` propagates to `None` for any fragments. Fragments are joined with
/// the default [`SEPARATOR`] in argument order and prepended to the trail;
/// repeated wraps therefore accumulate outer-to-inner, most recent wrap
/// first. The origin message is carried over unchanged. A call whose joined
/// prefix is empty returns the error untouched.
pub fn wrap<I, S>(err: Option<TrailError>, fragments: I) -> Option<TrailError>
where
    I: IntoIterator<Item = Option<S>>,
    S: fmt::Display,
{
    let err = err?;
    let prefix = join(SEPARATOR, fragments);
    Some(err.context(prefix))
}

/// Formats a single fragment and delegates to [`wrap`]. Same `None`
/// propagation rule.
///
/// ```
/// use errtrail::{TrailError, unwrap_trail, wrap_fmt};
///
/// let err = wrap_fmt(
///     Some(TrailError::new("timeout")),
///     format_args!("fetching user {}", 7),
/// );
/// assert_eq!(unwrap_trail(err.as_ref()), "fetching user 7 ---> timeout");
/// ```
pub fn wrap_fmt(err: Option<TrailError>, args: fmt::Arguments<'_>) -> Option<TrailError> {
    Some(err?.context(args))
}

/// Returns the full diagnostic trail, or `""` when `err` is absent.
///
/// Absent errors degrade to the empty string rather than failing; this is the
/// one documented behavior, chosen once for the whole crate. Reading the
/// trail never mutates the value.
pub fn unwrap_trail(err: Option<&TrailError>) -> &str {
    err.map_or("", TrailError::trail)
}

/// Materializes the current trail as a fresh top-level error.
///
/// The new value's message *and* trail both equal the old trail, so further
/// wraps start from the flattened history. Returns `None` when `err` is
/// absent or its trail is empty.
pub fn unwrap_as_error(err: Option<&TrailError>) -> Option<TrailError> {
    let err = err?;
    if err.trail().is_empty() {
        return None;
    }
    Some(TrailError::new(err.trail()))
}
