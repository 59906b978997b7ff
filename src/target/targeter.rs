use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::TargetError;

use super::template::{RequestTemplate, render_template};
use super::{RequestSpec, Targeter, group_headers};

/// Milliseconds per second.
const MS_PER_SEC: i64 = 1_000;

/// Hands out clones of one prepared request.
#[derive(Debug, Clone)]
pub struct StaticTargeter {
    spec: RequestSpec,
    remaining: Option<u64>,
}

impl StaticTargeter {
    #[must_use]
    pub const fn new(spec: RequestSpec) -> Self {
        Self {
            spec,
            remaining: None,
        }
    }

    /// Stops after `limit` requests with `TargetError::Exhausted`.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.remaining = Some(limit);
        self
    }
}

impl Targeter for StaticTargeter {
    fn next(&mut self) -> Result<RequestSpec, TargetError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(TargetError::Exhausted);
            }
            *remaining = remaining.saturating_sub(1);
        }
        Ok(self.spec.clone())
    }
}

/// Renders the template on every call with a fresh `uuid`, the call's `seq`
/// and the current `timestamp_ms` / `timestamp_s`.
#[derive(Debug)]
pub struct TemplateTargeter {
    template: RequestTemplate,
    seq: u64,
    remaining: Option<u64>,
}

impl TemplateTargeter {
    #[must_use]
    pub const fn new(template: RequestTemplate) -> Self {
        Self {
            template,
            seq: 0,
            remaining: None,
        }
    }

    /// Stops after `limit` requests with `TargetError::Exhausted`.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.remaining = Some(limit);
        self
    }

    fn vars_for_call(&self) -> BTreeMap<String, String> {
        let mut vars = self.template.vars.clone();
        let now_ms = Utc::now().timestamp_millis();
        vars.insert("uuid".to_owned(), Uuid::new_v4().to_string());
        vars.insert("seq".to_owned(), self.seq.to_string());
        vars.insert("timestamp_ms".to_owned(), now_ms.to_string());
        vars.insert(
            "timestamp_s".to_owned(),
            now_ms.checked_div(MS_PER_SEC).unwrap_or(0).to_string(),
        );
        vars
    }
}

impl Targeter for TemplateTargeter {
    fn next(&mut self) -> Result<RequestSpec, TargetError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(TargetError::Exhausted);
            }
            *remaining = remaining.saturating_sub(1);
        }

        let vars = self.vars_for_call();
        let url = render_template(&self.template.url, &vars);
        if let Err(err) = Url::parse(&url) {
            return Err(TargetError::Fatal {
                message: format!("rendered URL '{}' is invalid: {}", url, err),
            });
        }
        let headers: Vec<(String, String)> = self
            .template
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), render_template(value, &vars)))
            .collect();
        let body = render_template(&self.template.body, &vars).into_bytes();

        self.seq = self.seq.saturating_add(1);
        Ok(RequestSpec {
            method: self.template.method,
            url,
            headers: group_headers(&headers),
            body,
        })
    }
}

/// Picks the cheapest targeter able to serve `template`.
#[must_use]
pub fn build_targeter(template: RequestTemplate) -> Box<dyn Targeter> {
    if template.is_dynamic() {
        debug!("Request template has placeholders; rendering per request");
        return Box::new(TemplateTargeter::new(template));
    }
    let spec = RequestSpec {
        method: template.method,
        headers: group_headers(&template.headers),
        body: template.body.into_bytes(),
        url: template.url,
    };
    Box::new(StaticTargeter::new(spec))
}
