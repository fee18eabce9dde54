//! # Response envelope
//!
//! Every endpoint answers with the same four slots:
//!
//! ```json
//! {
//!   "status": true,
//!   "entity": { "id": 1, "title": "Broken lamp" },
//!   "message": { "default": "Issue created" },
//!   "metadata": { "pagination": { "page": 1, "last_page": 3 } }
//! }
//! ```
//!
//! `message` and `metadata` are tag maps. Values added without a tag land
//! under `"default"`. Adding a second value under an existing tag turns the
//! slot into an array holding every value in insertion order.
//!
//! Handlers take a fresh envelope through the extractor, fill it and return
//! it:
//!
//! ```rust,ignore
//! async fn show(mut envelope: ResponseEnvelope) -> ResponseEnvelope {
//!     envelope.set_status(true).add_message("Loaded", None);
//!     envelope
//! }
//! ```

use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// Tag used when a message or metadata value is added without one.
pub const DEFAULT_TAG: &str = "default";

#[derive(Debug, Clone, PartialEq)]
enum TagEntry {
    Single(Value),
    Many(Vec<Value>),
}

impl TagEntry {
    fn push(&mut self, value: Value) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Single(value) => value.clone(),
            Self::Many(values) => Value::Array(values.clone()),
        }
    }
}

/// Ordered tag -> value map with array promotion on repeated tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap {
    entries: Vec<(String, TagEntry)>,
}

impl TagMap {
    pub fn add(&mut self, value: Value, tag: Option<&str>) {
        let tag = tag.unwrap_or(DEFAULT_TAG);
        match self.entries.iter_mut().find(|(existing, _)| existing == tag) {
            Some((_, entry)) => entry.push(value),
            None => self.entries.push((tag.to_string(), TagEntry::Single(value))),
        }
    }

    /// The stored value for `tag`; promoted slots come back as an array.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == tag)
            .map(|(_, entry)| entry.to_value())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(tag, entry)| (tag.clone(), entry.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for TagMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, entry) in &self.entries {
            match entry {
                TagEntry::Single(value) => map.serialize_entry(tag, value)?,
                TagEntry::Many(values) => map.serialize_entry(tag, values)?,
            }
        }
        map.end()
    }
}

/// Per-request response accumulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    status: bool,
    entity: Option<Value>,
    message: TagMap,
    metadata: TagMap,
    #[serde(skip)]
    status_code: Option<StatusCode>,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the primary payload.
    pub fn add_entity(&mut self, entity: impl Into<Value>) -> &mut Self {
        self.entity = Some(entity.into());
        self
    }

    /// Serialize `entity` and store it as the primary payload.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if `entity` cannot be represented as JSON.
    pub fn try_add_entity<T: Serialize>(&mut self, entity: &T) -> Result<&mut Self, serde_json::Error> {
        self.entity = Some(serde_json::to_value(entity)?);
        Ok(self)
    }

    pub fn add_message(&mut self, message: impl Into<Value>, tag: Option<&str>) -> &mut Self {
        self.message.add(message.into(), tag);
        self
    }

    pub fn add_metadata(&mut self, metadata: impl Into<Value>, tag: Option<&str>) -> &mut Self {
        self.metadata.add(metadata.into(), tag);
        self
    }

    pub fn set_status(&mut self, status: bool) -> &mut Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn status(&self) -> bool {
        self.status
    }

    #[must_use]
    pub const fn entity(&self) -> Option<&Value> {
        self.entity.as_ref()
    }

    #[must_use]
    pub const fn messages(&self) -> &TagMap {
        &self.message
    }

    #[must_use]
    pub const fn metadata(&self) -> &TagMap {
        &self.metadata
    }

    /// HTTP status used when the envelope is turned into a response.
    #[must_use]
    pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Reset to the initial state.
    pub fn clean(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// `{status, entity, message, metadata}` in that order. Does not
    /// consume or alter the envelope.
    #[must_use]
    pub fn get_response(&self) -> Value {
        let mut response = Map::new();
        response.insert("status".into(), Value::Bool(self.status));
        response.insert("entity".into(), self.entity.clone().unwrap_or(Value::Null));
        response.insert("message".into(), self.message.to_value());
        response.insert("metadata".into(), self.metadata.to_value());
        Value::Object(response)
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status_code = self.status_code.unwrap_or(StatusCode::OK);
        (status_code, Json(self.get_response())).into_response()
    }
}

/// A fresh envelope for every request.
impl<S> FromRequestParts<S> for ResponseEnvelope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_state() {
        let envelope = ResponseEnvelope::new();
        assert!(!envelope.status());
        assert_eq!(
            envelope.get_response(),
            json!({"status": false, "entity": null, "message": {}, "metadata": {}})
        );
    }

    #[test]
    fn test_slot_order() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_metadata(1, None).add_entity("x").set_status(true);
        let response = envelope.get_response();
        let keys: Vec<&str> = response.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["status", "entity", "message", "metadata"]);
    }

    #[test]
    fn test_get_response_is_idempotent() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_entity(json!({"id": 1})).add_message("ok", None);
        assert_eq!(envelope.get_response(), envelope.get_response());
    }

    #[test]
    fn test_untagged_values_use_default_tag() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_message("Saved", None);
        assert_eq!(envelope.get_response()["message"], json!({"default": "Saved"}));
    }

    #[test]
    fn test_repeated_tag_promotes_to_array() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_message("a", Some("errors")).add_message("b", Some("errors"));
        assert_eq!(envelope.get_response()["message"]["errors"], json!(["a", "b"]));

        envelope.add_message("c", Some("errors"));
        assert_eq!(envelope.get_response()["message"]["errors"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_array_value_is_wrapped_on_promotion() {
        let mut envelope = ResponseEnvelope::new();
        envelope
            .add_metadata(json!([1, 2]), Some("ids"))
            .add_metadata(json!(3), Some("ids"));
        assert_eq!(envelope.metadata().get("ids"), Some(json!([[1, 2], 3])));
    }

    #[test]
    fn test_entity_is_overwritten() {
        let mut envelope = ResponseEnvelope::new();
        envelope.add_entity(1).add_entity(2);
        assert_eq!(envelope.entity(), Some(&json!(2)));
    }

    #[test]
    fn test_try_add_entity_serializes() {
        #[derive(Serialize)]
        struct Office {
            id: i32,
            name: &'static str,
        }
        let mut envelope = ResponseEnvelope::new();
        envelope.try_add_entity(&Office { id: 3, name: "HQ" }).unwrap();
        assert_eq!(envelope.get_response()["entity"], json!({"id": 3, "name": "HQ"}));
    }

    #[test]
    fn test_clean_resets_everything() {
        let mut envelope = ResponseEnvelope::new();
        envelope
            .set_status(true)
            .add_entity("x")
            .add_message("m", None)
            .add_metadata("d", Some("tag"));
        envelope.clean();
        assert!(!envelope.status());
        assert_eq!(envelope, ResponseEnvelope::new());
    }

    #[test]
    fn test_serialize_matches_get_response() {
        let mut envelope = ResponseEnvelope::new();
        envelope.set_status(true).add_message("a", None).add_message("b", None);
        assert_eq!(serde_json::to_value(&envelope).unwrap(), envelope.get_response());
    }

    #[test]
    fn test_into_response_status_code() {
        let response = ResponseEnvelope::new().into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = ResponseEnvelope::new()
            .with_status_code(StatusCode::CREATED)
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
