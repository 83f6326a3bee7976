//! Minimal frontmatter parsing, one `key: value` per line. The plugin
//! files only ever use flat scalars and inline arrays, so a full YAML
//! parser is not needed here.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\n(.*?)\n---").unwrap_or_else(|e| panic!("{e}"))
});
static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\n.*?\n---\n(.*)").unwrap_or_else(|e| panic!("{e}"))
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// Empty scalars count as absent; lists are always present.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => !s.is_empty(),
            FieldValue::List(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    fields: BTreeMap<String, FieldValue>,
}

impl Frontmatter {
    /// Parses the frontmatter block at the top of `content`. Returns
    /// None when no `---` delimited block is found.
    pub fn parse(content: &str) -> Option<Self> {
        let cap = FRONTMATTER.captures(content)?;
        let yaml = cap.get(1).map_or("", |m| m.as_str());

        let mut fields = BTreeMap::new();
        for line in yaml.lines() {
            let Some(colon) = line.find(':') else {
                continue;
            };
            let key = line[..colon].trim().to_string();
            let raw = line[colon + 1..].trim();

            let value = if raw.starts_with('[') && raw.ends_with(']') {
                let items = raw[1..raw.len() - 1]
                    .split(',')
                    .map(|s| s.trim().replace(['\'', '"'], ""))
                    .collect();
                FieldValue::List(items)
            } else if raw.starts_with('"') || raw.starts_with('\'') {
                // Drop the surrounding quote pair.
                let chars: Vec<char> = raw.chars().collect();
                let inner: String = if chars.len() >= 2 {
                    chars[1..chars.len() - 1].iter().collect()
                } else {
                    String::new()
                };
                FieldValue::Scalar(inner)
            } else {
                FieldValue::Scalar(raw.to_string())
            };
            fields.insert(key, value);
        }
        Some(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(FieldValue::is_present)
    }
}

/// Body text after the frontmatter block, if both are present.
pub fn body_of(content: &str) -> Option<&str> {
    BODY.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\nname: reviewer\ndescription: \"Reviews code for style issues\"\ntools: [Read, Grep]\nmaxTurns: 30\n---\n# Reviewer\n\nbody text\n";

    #[test]
    fn parses_scalars_quotes_and_lists() {
        let fm = Frontmatter::parse(SAMPLE).unwrap();
        assert_eq!(fm.get_str("name"), Some("reviewer"));
        assert_eq!(fm.get_str("description"), Some("Reviews code for style issues"));
        assert_eq!(
            fm.get("tools"),
            Some(&FieldValue::List(vec!["Read".to_string(), "Grep".to_string()]))
        );
        assert!(fm.has("tools"));
        assert!(!fm.has("skills"));
    }

    #[test]
    fn no_frontmatter_is_none() {
        assert!(Frontmatter::parse("# Just a heading\n").is_none());
        assert!(Frontmatter::parse("---\nunterminated\n").is_none());
    }

    #[test]
    fn empty_scalar_counts_as_absent() {
        let fm = Frontmatter::parse("---\nname:\ndescription: x\n---\n").unwrap();
        assert!(!fm.has("name"));
        assert!(fm.has("description"));
    }

    #[test]
    fn body_extraction() {
        assert_eq!(body_of(SAMPLE), Some("# Reviewer\n\nbody text\n"));
        assert!(body_of("---\nname: x\n---").is_none());
    }
}
