//! HTTP values exchanged between the gateway and its transport.
//!
//! # Design
//! Requests and responses are plain data. The gateway builds a
//! `RequestDescriptor` and hands it to a `Transport`, which answers with a
//! `TransportResponse`; neither type knows how the bytes travel. Fields are
//! owned (`String`, `Vec`) so a descriptor can be moved into a hook, a
//! blocking worker or a test capture without lifetime juggling.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// HTTP method carried by a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header name/value pairs.
///
/// Names are compared exactly: `content-type` and `Content-Type` are two
/// different entries. Inserting an existing name replaces its value in
/// place, so the set keeps the position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `name` to `value`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Lookup that ignores ASCII case, for reading response headers.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(existing, _)| existing == name)?;
        Some(self.0.remove(index).1)
    }

    /// Write every entry of `other` over `self`, in `other`'s order.
    pub fn overlay(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderSet::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for HeaderSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for HeaderSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for HeaderSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderSetVisitor;

        impl<'de> Visitor<'de> for HeaderSetVisitor {
            type Value = HeaderSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<HeaderSet, A::Error> {
                let mut headers = HeaderSet::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.insert(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeaderSetVisitor)
    }
}

/// An outbound request described as plain data.
///
/// `body` is `None` for requests without a payload; the gateway never sends
/// an empty or `null` body in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

/// A response as returned by a `Transport`.
///
/// The status code is carried for logging and for hooks the caller builds
/// around a transport; the gateway itself never branches on it. The body is
/// kept as raw bytes so that bad encodings surface when decoding, not in the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderSet,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decode the body as JSON.
    pub fn decode_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_ignore_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_value_in_place() {
        let mut headers = HeaderSet::from([("accept", "text/plain"), ("x-trace", "1")]);
        let previous = headers.insert("accept", "application/json");
        assert_eq!(previous.as_deref(), Some("text/plain"));
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("accept", "application/json"), ("x-trace", "1")]);
    }

    #[test]
    fn names_differing_in_case_are_distinct() {
        let mut headers = HeaderSet::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("content-type", "text/plain");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get_ignore_case("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn deserializes_from_object_preserving_order() {
        let headers: HeaderSet =
            serde_json::from_str(r#"{"z-last":"1","a-first":"2","m-middle":"3"}"#).unwrap();
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z-last", "a-first", "m-middle"]);
        assert_eq!(
            serde_json::to_string(&headers).unwrap(),
            r#"{"z-last":"1","a-first":"2","m-middle":"3"}"#
        );
    }

    #[test]
    fn rejects_non_string_header_values() {
        let result: Result<HeaderSet, _> = serde_json::from_str(r#"{"x-count":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn remove_drops_entry() {
        let mut headers = HeaderSet::from([("a", "1"), ("b", "2")]);
        assert_eq!(headers.remove("a").as_deref(), Some("1"));
        assert!(headers.remove("a").is_none());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn decode_json_reports_malformed_body() {
        let response = TransportResponse {
            status: 200,
            headers: HeaderSet::new(),
            body: b"<html>".to_vec(),
        };
        assert!(response.decode_json().is_err());
    }

    #[test]
    fn decode_json_rejects_invalid_utf8() {
        let response = TransportResponse {
            status: 200,
            headers: HeaderSet::new(),
            body: vec![b'{', 0xff, 0xfe, b'}'],
        };
        assert!(response.decode_json().is_err());
    }
}
