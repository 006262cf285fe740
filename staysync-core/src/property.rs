//! Properties and the external feed links configured on them.

use serde::{Deserialize, Deserializer, Serialize};

/// Source label used when a stored link doesn't name its platform.
const DEFAULT_FEED_SOURCE: &str = "ical";

/// A rental property as returned by the backend.
///
/// Only the fields the sync cares about are modelled; everything else in the
/// backend record is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Stored by the backend as a JSON-encoded string; some deployments
    /// return the decoded array instead. Read through [`Property::feeds`].
    #[serde(rename = "iCalLinks", default)]
    pub ical_links: Option<serde_json::Value>,
}

/// One external calendar feed for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLink {
    pub url: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    DEFAULT_FEED_SOURCE.to_string()
}

impl Property {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Property {
            id: id.into(),
            name: name.map(str::to_string),
            ical_links: None,
        }
    }

    /// Attach feed links, stored the way the backend stores them.
    pub fn with_feeds(mut self, feeds: &[FeedLink]) -> Self {
        self.ical_links = serde_json::to_string(feeds).ok().map(serde_json::Value::String);
        self
    }

    /// Decode the configured feed links.
    ///
    /// Anything that isn't a JSON array of `{url, source}` objects counts as
    /// "no feeds". Individual entries without a usable url are skipped.
    pub fn feeds(&self) -> Vec<FeedLink> {
        let value = match &self.ical_links {
            Some(serde_json::Value::String(s)) => match serde_json::from_str(s) {
                Ok(v) => v,
                Err(_) => return Vec::new(),
            },
            Some(v) => v.clone(),
            None => return Vec::new(),
        };

        let serde_json::Value::Array(items) = value else {
            return Vec::new();
        };

        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<FeedLink>(item).ok())
            .filter(|link| !link.url.trim().is_empty())
            .collect()
    }

    /// A property takes part in sync only when it has at least one feed.
    pub fn has_feeds(&self) -> bool {
        !self.feeds().is_empty()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Backend ids show up both as numbers and as strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// Same as [`string_or_number`] for nullable id columns.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(links: serde_json::Value) -> Property {
        serde_json::from_value(json!({ "id": 7, "name": "Sea View", "iCalLinks": links })).unwrap()
    }

    #[test]
    fn decodes_stringified_array() {
        let p = property(json!(
            r#"[{"url":"https://www.airbnb.com/calendar/ical/1.ics","source":"Airbnb"},{"url":"https://admin.booking.com/x.ics","source":"booking"}]"#
        ));

        assert_eq!(p.id, "7");
        let feeds = p.feeds();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].source, "Airbnb");
        assert_eq!(feeds[1].url, "https://admin.booking.com/x.ics");
        assert!(p.has_feeds());
    }

    #[test]
    fn decodes_plain_array() {
        let p = property(json!([{ "url": "https://x/cal.ics" }]));
        assert_eq!(
            p.feeds(),
            vec![FeedLink {
                url: "https://x/cal.ics".into(),
                source: "ical".into()
            }]
        );
    }

    #[test]
    fn malformed_links_mean_no_feeds() {
        assert!(property(json!("not json")).feeds().is_empty());
        assert!(property(json!(r#"{"url":"https://x"}"#)).feeds().is_empty());
        assert!(property(json!(null)).feeds().is_empty());
        assert!(property(json!("[]")).feeds().is_empty());
        assert!(!property(json!("[]")).has_feeds());
    }

    #[test]
    fn entries_without_url_are_skipped() {
        let p = property(json!(r#"[{"source":"Airbnb"},{"url":"","source":"vrbo"},{"url":"https://ok","source":"vrbo"}]"#));
        let feeds = p.feeds();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].url, "https://ok");
    }

    #[test]
    fn with_feeds_roundtrips_through_storage_shape() {
        let links = vec![FeedLink {
            url: "https://x/cal.ics".into(),
            source: "booking".into(),
        }];
        let p = Property::new("p1", Some("Loft")).with_feeds(&links);
        assert!(matches!(p.ical_links, Some(serde_json::Value::String(_))));
        assert_eq!(p.feeds(), links);
    }
}
