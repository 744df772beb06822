//! Raw, caller-supplied pagination options.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Pagination options as supplied by the caller.
///
/// Every field is optional; [`PageRequest::resolve`] fills in defaults and
/// validates the result. The `page` field is lenient when deserialized: it
/// accepts numbers and numeric strings, and anything else is treated as absent
/// (which later resolves to the first page).
///
/// [`PageRequest::resolve`]: super::PageRequest::resolve
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageOptions {
    /// Requested page number (1-based).
    #[serde(default, deserialize_with = "deserialize_page")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "schema", schemars(with = "Option<i64>"))]
    pub page: Option<i64>,
    /// Requested number of items per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    /// Known total number of entries.
    ///
    /// When present, no count query is issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_entries: Option<i64>,
}

impl PageOptions {
    /// Creates empty options.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested page.
    #[inline]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the requested page from raw text, e.g. a query-string parameter.
    ///
    /// Non-numeric input leaves the page unset.
    #[inline]
    pub fn with_page_str(mut self, page: &str) -> Self {
        self.page = parse_page(page);
        self
    }

    /// Sets the number of items per page.
    #[inline]
    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Sets the known total number of entries.
    #[inline]
    pub fn with_total_entries(mut self, total_entries: i64) -> Self {
        self.total_entries = Some(total_entries);
        self
    }
}

/// Parses a page number from raw text.
fn parse_page(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Deserializes a page number from an integer, a float with no fractional
/// part, or a numeric string.
fn deserialize_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PageVisitor;

    impl<'de> Visitor<'de> for PageVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a page number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(i64::try_from(value).ok())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if value.is_finite() && value.fract() == 0.0 {
                Ok(Some(value as i64))
            } else {
                Ok(None)
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(parse_page(value))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_option(PageVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> PageOptions {
        serde_json::from_str(json).expect("options should deserialize")
    }

    #[test]
    fn options_builder() {
        let options = PageOptions::new()
            .with_page(3)
            .with_per_page(20)
            .with_total_entries(100);

        assert_eq!(options.page, Some(3));
        assert_eq!(options.per_page, Some(20));
        assert_eq!(options.total_entries, Some(100));
    }

    #[test]
    fn page_from_str() {
        assert_eq!(PageOptions::new().with_page_str("4").page, Some(4));
        assert_eq!(PageOptions::new().with_page_str(" 2 ").page, Some(2));
        assert_eq!(PageOptions::new().with_page_str("-1").page, Some(-1));
        assert_eq!(PageOptions::new().with_page_str("next").page, None);
        assert_eq!(PageOptions::new().with_page_str("").page, None);
    }

    #[test]
    fn deserialize_lenient_page() {
        assert_eq!(from_json(r#"{"page": 2}"#).page, Some(2));
        assert_eq!(from_json(r#"{"page": "7"}"#).page, Some(7));
        assert_eq!(from_json(r#"{"page": 3.0}"#).page, Some(3));
        assert_eq!(from_json(r#"{"page": 2.5}"#).page, None);
        assert_eq!(from_json(r#"{"page": "abc"}"#).page, None);
        assert_eq!(from_json(r#"{"page": null}"#).page, None);
        assert_eq!(from_json(r#"{"page": true}"#).page, None);
        assert_eq!(from_json(r#"{}"#).page, None);
    }

    #[test]
    fn deserialize_full_options() {
        let options = from_json(r#"{"page": "2", "per_page": 10, "total_entries": 42}"#);
        assert_eq!(options, PageOptions::new().with_page(2).with_per_page(10).with_total_entries(42));
    }

    #[test]
    fn serialize_skips_unset_fields() {
        let json = serde_json::to_string(&PageOptions::new().with_page(1))
            .expect("options should serialize");
        assert_eq!(json, r#"{"page":1}"#);
    }
}
