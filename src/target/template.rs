use std::collections::BTreeMap;

use crate::args::HttpMethod;

/// Unrendered request parts plus the user-supplied template variables.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub vars: BTreeMap<String, String>,
}

impl RequestTemplate {
    /// True when any part must be rendered per request.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        has_placeholders(&self.url)
            || has_placeholders(&self.body)
            || self
                .headers
                .iter()
                .any(|(_, value)| has_placeholders(value))
    }
}

#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    input
        .find("{{")
        .is_some_and(|start| input.get(start..).is_some_and(|rest| rest.contains("}}")))
}

/// Replaces `{{name}}` with the matching variable. Unknown names stay verbatim.
#[must_use]
pub fn render_template(input: &str, vars: &BTreeMap<String, String>) -> String {
    let mut rest = input;
    let mut output = String::with_capacity(input.len());

    while let Some(start) = rest.find("{{") {
        let (before, after_start) = rest.split_at(start);
        output.push_str(before);
        let after = after_start.get(2..).unwrap_or_default();
        let Some(end) = after.find("}}") else {
            output.push_str(after_start);
            return output;
        };
        let (key_part, after_end) = after.split_at(end);
        match vars.get(key_part.trim()) {
            Some(value) => output.push_str(value),
            None => {
                output.push_str("{{");
                output.push_str(key_part);
                output.push_str("}}");
            }
        }
        rest = after_end.get(2..).unwrap_or_default();
    }

    output.push_str(rest);
    output
}
