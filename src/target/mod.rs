//! Request templates: everything the engine needs to build one request per permit.
mod template;
mod targeter;


use std::collections::BTreeMap;

use crate::args::HttpMethod;
use crate::error::TargetError;

pub use targeter::{StaticTargeter, TemplateTargeter, build_targeter};
pub use template::{RequestTemplate, has_placeholders, render_template};

/// Placeholder names filled per call by `TemplateTargeter`; user vars may not use them.
pub const BUILTIN_VARS: [&str; 4] = ["uuid", "seq", "timestamp_ms", "timestamp_s"];

/// A fully rendered request, moved into a worker for exactly one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    /// Header name to its values, in insertion order per name.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
}

impl RequestSpec {
    /// Body length as reported in `bytes_out`.
    #[must_use]
    pub fn body_len(&self) -> u64 {
        u64::try_from(self.body.len()).unwrap_or(u64::MAX)
    }
}

/// Produces the next request to send.
///
/// Called once per permit from the engine's dispatcher task, so implementations
/// may keep per-call state (sequence numbers, fresh identifiers).
pub trait Targeter: Send {
    /// Returns the next request.
    ///
    /// # Errors
    ///
    /// `TargetError::Exhausted` ends the attack cleanly; any other error stops it
    /// and is reported as a fault.
    fn next(&mut self) -> Result<RequestSpec, TargetError>;
}

impl<T: Targeter + ?Sized> Targeter for Box<T> {
    fn next(&mut self) -> Result<RequestSpec, TargetError> {
        (**self).next()
    }
}

pub(crate) fn group_headers(headers: &[(String, String)]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        grouped.entry(name.clone()).or_default().push(value.clone());
    }
    grouped
}
