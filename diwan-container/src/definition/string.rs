//! String templates built from other entries.

use std::fmt;

use crate::error::{DiError, Result};

/// A string with `{entry}` placeholders, e.g. `"{app.root}/cache"`.
#[derive(Debug, Clone)]
pub struct StringDefinition {
    pub(crate) name: String,
    pub template: String,
}

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    Entry(String),
}

impl StringDefinition {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            template: template.into(),
        }
    }

    /// Splits the template into literal text and entry placeholders.
    ///
    /// An unclosed `{` is an error; `{}` is kept as literal text.
    pub fn parts(&self) -> Result<Vec<TemplatePart>> {
        let mut parts = Vec::new();
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                return Err(DiError::invalid(
                    self.name.clone(),
                    format!("unclosed placeholder in string template '{}'", self.template),
                ));
            };
            let entry = &rest[open + 1..close];
            if entry.is_empty() {
                push_text(&mut parts, &rest[..close + 1]);
            } else {
                push_text(&mut parts, &rest[..open]);
                parts.push(TemplatePart::Entry(entry.to_string()));
            }
            rest = &rest[close + 1..];
        }
        push_text(&mut parts, rest);

        Ok(parts)
    }
}

fn push_text(parts: &mut Vec<TemplatePart>, text: &str) {
    if text.is_empty() {
        return;
    }
    match parts.last_mut() {
        Some(TemplatePart::Text(previous)) => previous.push_str(text),
        _ => parts.push(TemplatePart::Text(text.to_string())),
    }
}

impl fmt::Display for StringDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "string({:?})", self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_placeholders() {
        let parts = StringDefinition::new("{root}/cache/{env}.log").parts().unwrap();
        assert_eq!(
            parts,
            vec![
                TemplatePart::Entry("root".into()),
                TemplatePart::Text("/cache/".into()),
                TemplatePart::Entry("env".into()),
                TemplatePart::Text(".log".into()),
            ]
        );
    }

    #[test]
    fn empty_braces_stay_literal() {
        let parts = StringDefinition::new("a{}b").parts().unwrap();
        assert_eq!(parts, vec![TemplatePart::Text("a{}b".into())]);
    }

    #[test]
    fn unclosed_placeholder_is_invalid() {
        assert!(StringDefinition::new("{root").parts().is_err());
    }
}
