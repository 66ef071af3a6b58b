//! Response templates: `${req.<path>}`, `${seed.<path>}` and `${state.<path>}`
//! placeholders inside JSON strings.
//!
//! Placeholders are replaced by the string representation of the referenced
//! value. A string holding exactly one placeholder that points at an array or
//! object takes the structured value instead, so repeated and message fields
//! can be copied whole.

use serde_json::Value;

use crate::domain::predicate::FieldPath;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("unterminated placeholder in {0:?}")]
    Unterminated(String),
    #[error("unsupported placeholder ${{{0}}}")]
    UnknownRoot(String),
    #[error("invalid field path in ${{{0}}}")]
    InvalidPath(String),
    #[error("placeholder ${{{0}}} is not present in the call context")]
    Unresolved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Req,
    Seed,
    State,
}

#[derive(Debug, Clone)]
struct Placeholder {
    expr: String,
    root: Root,
    path: FieldPath,
}

impl Placeholder {
    fn parse(expr: &str) -> Result<Self, RenderError> {
        let expr = expr.trim();
        let (root, path) = match expr.split_once('.') {
            Some((root, path)) => (
                root,
                FieldPath::parse(path).ok_or_else(|| RenderError::InvalidPath(expr.to_owned()))?,
            ),
            None => (expr, FieldPath::root()),
        };
        let root = match root {
            "req" => Root::Req,
            "seed" => Root::Seed,
            "state" => Root::State,
            _ => return Err(RenderError::UnknownRoot(expr.to_owned())),
        };
        Ok(Self {
            expr: expr.to_owned(),
            root,
            path,
        })
    }
}

enum Segment<'t> {
    Text(&'t str),
    Placeholder(Placeholder),
}

fn segments(input: &str) -> Result<Vec<Segment<'_>>, RenderError> {
    let mut out = Vec::new();
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        if start > 0 {
            out.push(Segment::Text(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| RenderError::Unterminated(input.to_owned()))?;
        out.push(Segment::Placeholder(Placeholder::parse(&after[..end])?));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    Ok(out)
}

/// Values a template may read during one call.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub req: &'a Value,
    pub seed: Option<&'a Value>,
    pub state: Option<&'a Value>,
}

impl<'a> TemplateContext<'a> {
    #[cfg(test)]
    pub(crate) fn new(req: &'a Value) -> Self {
        Self {
            req,
            seed: None,
            state: None,
        }
    }

    fn resolve(&self, placeholder: &Placeholder) -> Result<&'a Value, RenderError> {
        let source = match placeholder.root {
            Root::Req => Some(self.req),
            Root::Seed => self.seed,
            Root::State => self.state,
        };
        source
            .and_then(|value| placeholder.path.lookup(value))
            .ok_or_else(|| RenderError::Unresolved(placeholder.expr.clone()))
    }
}

fn push_text(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

fn render_str(input: &str, ctx: &TemplateContext<'_>) -> Result<Value, RenderError> {
    let parts = segments(input)?;
    if let [Segment::Placeholder(placeholder)] = parts.as_slice() {
        let value = ctx.resolve(placeholder)?;
        if value.is_array() || value.is_object() {
            return Ok(value.clone());
        }
    }
    let mut out = String::with_capacity(input.len());
    for part in &parts {
        match part {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(placeholder) => push_text(&mut out, ctx.resolve(placeholder)?),
        }
    }
    Ok(Value::String(out))
}

/// Expand every placeholder in `template`. Object keys are left as written.
pub fn render(template: &Value, ctx: &TemplateContext<'_>) -> Result<Value, RenderError> {
    Ok(match template {
        Value::String(s) => render_str(s, ctx)?,
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render(item, ctx))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| Ok((key.clone(), render(value, ctx)?)))
                .collect::<Result<_, RenderError>>()?,
        ),
        other => other.clone(),
    })
}

/// Check placeholder syntax without a call context.
pub fn validate(template: &Value) -> Result<(), RenderError> {
    match template {
        Value::String(s) => segments(s).map(|_| ()),
        Value::Array(items) => items.iter().try_for_each(validate),
        Value::Object(map) => map.values().try_for_each(validate),
        _ => Ok(()),
    }
}
