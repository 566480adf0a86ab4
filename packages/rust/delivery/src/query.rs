//! Entry query construction.

use serde_json::{Map, Value};

/// An entry query against one content type: equality filters plus an
/// optional locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    filters: Map<String, Value>,
    locale: Option<String>,
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Restrict results to `locale`.
    pub fn locale(mut self, locale: Option<impl Into<String>>) -> Self {
        self.locale = locale.map(Into::into);
        self
    }

    pub fn filters(&self) -> &Map<String, Value> {
        &self.filters
    }

    /// Query-string pairs for the entries endpoint.
    pub(crate) fn to_params(&self, environment: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("environment", environment.to_string())];
        if !self.filters.is_empty() {
            params.push(("query", Value::Object(self.filters.clone()).to_string()));
        }
        if let Some(locale) = &self.locale {
            params.push(("locale", locale.clone()));
        }
        params
    }
}
