//! Resource trait for node payloads
//!
//! A Resource is a pure description of something that should exist in the
//! target system. It carries no behavior for creating itself; that is the
//! job of an [`ApplyEngine`](crate::ApplyEngine).

use std::fmt;

/// Core trait for declarative resources
///
/// # Example
///
/// ```ignore
/// use declarative::Resource;
///
/// #[derive(Debug)]
/// struct Bucket {
///     name: String,
/// }
///
/// impl Resource for Bucket {
///     fn resource_type(&self) -> &'static str {
///         "bucket"
///     }
///
///     fn description(&self) -> String {
///         format!("Storage bucket {}", self.name)
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Resource type category
    ///
    /// Used for grouping, display and by engines to dispatch on.
    fn resource_type(&self) -> &'static str;

    /// Human-readable description of what this resource is
    fn description(&self) -> String;
}
