use uuid::Uuid;

/// A borrowed view of a field value that can be compared by a [`RuleCondition`].
///
/// [`RuleCondition`]: crate::RuleCondition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Val<'a> {
    /// A boolean value.
    Bool(bool),
    /// A string value.
    String(&'a str),
    /// A UUID.
    Uuid(Uuid),
}

impl<'a> Val<'a> {
    /// Returns the string if this value is a string, otherwise `None`.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Val<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<'a> From<&'a str> for Val<'a> {
    fn from(value: &'a str) -> Self {
        Self::String(value)
    }
}

impl From<Uuid> for Val<'_> {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// A type that supports field access by paths.
///
/// This is the runtime version of field lookups used by rule conditions. Paths are dot-separated
/// and prefixed by the kind of payload, for instance `trace.environment`.
///
/// # Example
///
/// ```
/// use ds_protocol::{Getter, Val};
///
/// struct Env(&'static str);
///
/// impl Getter for Env {
///     fn get_value(&self, path: &str) -> Option<Val<'_>> {
///         (path == "trace.environment").then(|| self.0.into())
///     }
/// }
///
/// assert_eq!(Env("dev").get_value("trace.environment"), Some(Val::String("dev")));
/// assert_eq!(Env("dev").get_value("trace.release"), None);
/// ```
pub trait Getter {
    /// Returns the value of a field pointed to by a `path`.
    fn get_value(&self, path: &str) -> Option<Val<'_>>;
}
