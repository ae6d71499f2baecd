//! Multi-locale string catalog.
//!
//! Keys are dotted paths into a locale's JSON document, e.g.
//! `orders.status.pending`. Lookups fall back to English and finally to the
//! key itself, so a missing translation never fails a request.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{catalog_error, Error};

pub const DEFAULT_LOCALE: &str = "en";

pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("es", "Español")];

const BUNDLED: &[(&str, &str)] = &[
    ("en", include_str!("translations/en.json")),
    ("es", include_str!("translations/es.json")),
];

#[derive(Clone, Debug)]
pub struct Catalog {
    locales: HashMap<String, Value>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, Error> {
        Self::from_documents(BUNDLED)
    }

    pub fn from_documents(documents: &[(&str, &str)]) -> Result<Self, Error> {
        let mut locales = HashMap::new();

        for (locale, document) in documents {
            let value: Value =
                serde_json::from_str(document).map_err(|err| catalog_error(locale, err))?;
            locales.insert(locale.to_string(), value);
        }

        Ok(Self { locales })
    }

    pub fn supports(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    pub fn supported_languages(&self) -> BTreeMap<String, String> {
        SUPPORTED_LANGUAGES
            .iter()
            .filter(|(code, _)| self.supports(code))
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect()
    }

    /// Resolves `key` for `locale`, substituting `{name}` placeholders from
    /// `options`. Unknown locales resolve as English.
    pub fn translate(&self, locale: &str, key: &str, options: &HashMap<String, String>) -> String {
        let found = self
            .lookup(locale, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key));

        match found {
            Some(template) => interpolate(template, options),
            None => key.to_string(),
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let mut node = self.locales.get(locale)?;

        for segment in key.split('.') {
            node = node.get(segment)?;
        }

        node.as_str().filter(|s| !s.is_empty())
    }
}

/// Single left-to-right pass; substituted values are never re-scanned.
fn interpolate(template: &str, options: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find(|c| c == '{' || c == '}') {
            Some(end) if after[end..].starts_with('}') => {
                let name = &after[..end];
                match options.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
