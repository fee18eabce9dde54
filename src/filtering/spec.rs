use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use url::form_urlencoded;

/// Value supplied for one filter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterArg {
    /// Key present without a value (`?archive_status`). Presence alone matters.
    Flag,
    /// A single non-empty value.
    Scalar(String),
    /// One or more non-empty values (`?status[]=a&status[]=b` or a JSON array).
    List(Vec<String>),
}

impl FilterArg {
    /// The scalar value, if this argument carries exactly one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(values) if values.len() == 1 => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// All carried values; a scalar yields a single element, a flag none.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Flag => Vec::new(),
            Self::Scalar(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub const fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }

    /// Parse the scalar value as an integer id.
    #[must_use]
    pub fn as_id(&self) -> Option<i32> {
        self.as_str().and_then(|value| value.trim().parse().ok())
    }
}

/// The active, non-empty parameters of one list request, in arrival order.
///
/// Empty strings and empty arrays are dropped on insertion: they mean
/// "not filtering by this field". A key ending in `[]` accumulates into a
/// list under the bare name; a repeated plain key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    entries: Vec<(String, FilterArg)>,
}

impl FilterSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and internal callers.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, arg: FilterArg) -> Self {
        self.insert(key, arg);
        self
    }

    /// Insert or replace the argument for `key`, dropping empty values.
    pub fn insert(&mut self, key: impl Into<String>, arg: FilterArg) {
        let key = key.into();
        let Some(arg) = normalize(arg) else {
            tracing::debug!(key = %key, "dropping empty filter value");
            self.remove(&key);
            return;
        };
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = arg,
            None => self.entries.push((key, arg)),
        }
    }

    fn push_list_value(&mut self, key: &str, value: String) {
        if value.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, FilterArg::List(values))) => values.push(value),
            Some((_, slot)) => *slot = FilterArg::List(vec![value]),
            None => self.entries.push((key.to_string(), FilterArg::List(vec![value]))),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterArg> {
        let position = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(position).1)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterArg> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, arg)| arg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterArg)> {
        self.entries.iter().map(|(key, arg)| (key.as_str(), arg))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a raw (undecoded) URL query string.
    ///
    /// `a=1` is a scalar, `a` without `=` is a flag, `a=` is dropped and
    /// `a[]=1&a[]=2` is a list.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut spec = Self::new();
        for segment in query.split('&').filter(|segment| !segment.is_empty()) {
            let has_value = segment.contains('=');
            let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() else {
                continue;
            };
            let key = key.trim();
            if let Some(list_key) = key.strip_suffix("[]") {
                spec.push_list_value(list_key, value.into_owned());
            } else if has_value {
                spec.insert(key, FilterArg::Scalar(value.into_owned()));
            } else {
                spec.insert(key, FilterArg::Flag);
            }
        }
        spec
    }

    /// Build from a JSON object. Strings, numbers and booleans become
    /// scalars, arrays become lists, `null` becomes a flag. Nested objects
    /// are ignored. Anything but an object yields an empty spec.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut spec = Self::new();
        let Value::Object(map) = value else {
            return spec;
        };
        for (key, value) in map {
            let arg = match value {
                Value::Null => FilterArg::Flag,
                Value::Array(items) => FilterArg::List(items.iter().filter_map(scalar_text).collect()),
                Value::Object(_) => continue,
                other => match scalar_text(other) {
                    Some(text) => FilterArg::Scalar(text),
                    None => continue,
                },
            };
            spec.insert(key.as_str(), arg);
        }
        spec
    }

    /// Build from a JSON-encoded `filter` parameter. Invalid JSON is
    /// logged and treated as no filter at all.
    #[must_use]
    pub fn from_filter_json(filter: Option<&str>) -> Self {
        let Some(raw) = filter else {
            return Self::new();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_json(&value),
            Err(e) => {
                tracing::debug!(error = %e, "invalid JSON in filter parameter");
                Self::new()
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn normalize(arg: FilterArg) -> Option<FilterArg> {
    match arg {
        FilterArg::Flag => Some(FilterArg::Flag),
        FilterArg::Scalar(value) if value.is_empty() => None,
        FilterArg::Scalar(value) => Some(FilterArg::Scalar(value)),
        FilterArg::List(values) => {
            let values: Vec<String> = values.into_iter().filter(|value| !value.is_empty()).collect();
            (!values.is_empty()).then_some(FilterArg::List(values))
        }
    }
}

/// Extracts the filter spec from the request's query string.
impl<S> FromRequestParts<S> for FilterSpec
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(Self::from_query).unwrap_or_default())
    }
}
