// ============================================
// Accessor Layer (字段读取层)
// ============================================
//
// Tolerant readers that turn heterogeneous upstream records into the
// canonical `FeedItem`. Nothing here fails: missing or malformed fields fall
// back to their defaults (empty string, 0, false, None, empty list).
//
// Accepted shapes:
// - camelCase or snake_case keys
// - `name` as an alias for `title`
// - event types as an array, a single string or a comma separated string
// - numbers or numeric strings for counters
// - RFC 3339 / naive / date-only strings or epoch millis for timestamps

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::FeedItem;
use crate::utils::{from_epoch_millis, parse_timestamp};

const ID_KEYS: &[&str] = &["id", "_id"];
const TITLE_KEYS: &[&str] = &["title", "name"];
const EVENT_TYPE_KEYS: &[&str] = &[
    "eventTypes",
    "event_types",
    "eventType",
    "event_type",
];
const STARTS_AT_KEYS: &[&str] = &["startsAt", "starts_at", "startDate", "start_date"];
const ENDS_AT_KEYS: &[&str] = &["endsAt", "ends_at", "endDate", "end_date"];
const CITY_KEYS: &[&str] = &["city"];
const VENUE_KEYS: &[&str] = &["venue"];
const LOCATION_KEYS: &[&str] = &["location"];
/// Ordered fallback chain, first non-empty wins
const IMAGE_KEYS: &[&str] = &[
    "heroImageUrl",
    "hero_image_url",
    "coverImageUrl",
    "cover_image_url",
    "imageUrl",
    "image_url",
];
const RSVP_COUNT_KEYS: &[&str] = &["rsvpCount", "rsvp_count"];
const VIEW_COUNT_KEYS: &[&str] = &["viewCount", "view_count"];
const RSVP_CHANGE_KEYS: &[&str] = &["rsvpChange24h", "rsvp_change_24h"];
const SPONSORED_KEYS: &[&str] = &["isSponsored", "is_sponsored"];
const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at"];

/// Result of reading an upstream payload
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub items: Vec<FeedItem>,
    /// Array entries that were not objects
    pub skipped: usize,
}

/// Read every record of an upstream payload.
///
/// Anything other than an array (including `null`) is an empty batch.
pub fn read_items(payload: &Value) -> RecordBatch {
    let Some(records) = payload.as_array() else {
        debug!("Payload is not an array, treating as empty");
        return RecordBatch::default();
    };

    let mut batch = RecordBatch {
        items: Vec::with_capacity(records.len()),
        skipped: 0,
    };

    for record in records {
        match read_item(record) {
            Some(item) => batch.items.push(item),
            None => batch.skipped += 1,
        }
    }

    if batch.skipped > 0 {
        debug!(skipped = batch.skipped, "Skipped non-object records");
    }

    batch
}

/// Read a single record. Returns `None` only when the record is not an object.
pub fn read_item(record: &Value) -> Option<FeedItem> {
    let fields = FieldReader::new(record.as_object()?);

    let city = fields.text(CITY_KEYS);
    let venue = fields.text(VENUE_KEYS);
    let location = fields
        .text(LOCATION_KEYS)
        .or_else(|| combine_location(venue.as_deref(), city.as_deref()));

    Some(FeedItem {
        id: fields.text(ID_KEYS).unwrap_or_default(),
        title: fields.text(TITLE_KEYS).unwrap_or_default(),
        event_types: fields.tags(EVENT_TYPE_KEYS),
        starts_at: fields.timestamp(STARTS_AT_KEYS),
        ends_at: fields.timestamp(ENDS_AT_KEYS),
        city,
        venue,
        location,
        image_url: fields.text(IMAGE_KEYS),
        rsvp_count: fields.count(RSVP_COUNT_KEYS),
        view_count: fields.count(VIEW_COUNT_KEYS),
        rsvp_change_24h: fields.signed(RSVP_CHANGE_KEYS),
        is_sponsored: fields.flag(SPONSORED_KEYS),
        created_at: fields.timestamp(CREATED_AT_KEYS),
    })
}

fn combine_location(venue: Option<&str>, city: Option<&str>) -> Option<String> {
    match (venue, city) {
        (Some(venue), Some(city)) => Some(format!("{}, {}", venue, city)),
        (Some(single), None) | (None, Some(single)) => Some(single.to_string()),
        (None, None) => None,
    }
}

/// Key-alias aware view over one JSON object
struct FieldReader<'a> {
    record: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn new(record: &'a Map<String, Value>) -> Self {
        Self { record }
    }

    /// Values for the given aliases in priority order, nulls skipped
    fn candidates<'k>(&self, keys: &'k [&'k str]) -> impl Iterator<Item = &'a Value> + 'k
    where
        'a: 'k,
    {
        let record = self.record;
        keys.iter()
            .filter_map(move |key| record.get(*key))
            .filter(|value| !value.is_null())
    }

    /// First non-empty textual value
    fn text(&self, keys: &[&str]) -> Option<String> {
        self.candidates(keys).find_map(|value| match value {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    fn tags(&self, keys: &[&str]) -> Vec<String> {
        let Some(value) = self.candidates(keys).next() else {
            return Vec::new();
        };

        match value {
            Value::Array(entries) => entries.iter().filter_map(tag_text).collect(),
            Value::String(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn timestamp(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        self.candidates(keys).find_map(|value| match value {
            Value::String(s) => parse_timestamp(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .and_then(from_epoch_millis),
            _ => None,
        })
    }

    /// Non-negative counter, 0 when absent or malformed
    fn count(&self, keys: &[&str]) -> u64 {
        self.signed(keys).max(0) as u64
    }

    fn signed(&self, keys: &[&str]) -> i64 {
        self.candidates(keys)
            .find_map(|value| match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                    .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
                Value::String(s) => parse_number(s),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn flag(&self, keys: &[&str]) -> bool {
        self.candidates(keys)
            .find_map(|value| match value {
                Value::Bool(b) => Some(*b),
                Value::Number(n) => n.as_f64().map(|f| f != 0.0),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(true),
                    "false" | "0" | "no" | "" => Some(false),
                    _ => None,
                },
                _ => None,
            })
            .unwrap_or(false)
    }
}

fn tag_text(entry: &Value) -> Option<String> {
    let raw = match entry {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_array_payload_is_empty() {
        assert!(read_items(&Value::Null).items.is_empty());
        assert!(read_items(&json!({"id": "x"})).items.is_empty());
        assert!(read_items(&json!("nope")).items.is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let batch = read_items(&json!([{"id": "a"}, 42, null, "b", {"id": "c"}]));
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.skipped, 3);
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let item = read_item(&json!({})).unwrap();
        assert_eq!(item.title, "");
        assert!(item.event_types.is_empty());
        assert!(item.starts_at.is_none());
        assert_eq!(item.rsvp_count, 0);
        assert_eq!(item.view_count, 0);
        assert_eq!(item.rsvp_change_24h, 0);
        assert!(!item.is_sponsored);
        assert!(item.created_at.is_none());
    }

    #[test]
    fn test_name_aliases_title() {
        let item = read_item(&json!({"name": "Opening Party"})).unwrap();
        assert_eq!(item.title, "Opening Party");

        let item = read_item(&json!({"title": "Keynote", "name": "ignored"})).unwrap();
        assert_eq!(item.title, "Keynote");
    }

    #[test]
    fn test_image_fallback_chain() {
        let item = read_item(&json!({
            "heroImageUrl": "",
            "coverImageUrl": "https://cdn/cover.jpg",
            "imageUrl": "https://cdn/plain.jpg"
        }))
        .unwrap();
        assert_eq!(item.image_url.as_deref(), Some("https://cdn/cover.jpg"));

        let item = read_item(&json!({"image_url": "https://cdn/snake.jpg"})).unwrap();
        assert_eq!(item.image_url.as_deref(), Some("https://cdn/snake.jpg"));
    }

    #[test]
    fn test_event_type_shapes() {
        let item = read_item(&json!({"eventTypes": ["PARTY", "", 3, {"name": "Talk"}]})).unwrap();
        assert_eq!(item.event_types, vec!["PARTY", "Talk"]);

        let item = read_item(&json!({"event_type": "workshop, showroom"})).unwrap();
        assert_eq!(item.event_types, vec!["workshop", "showroom"]);

        let item = read_item(&json!({"eventTypes": null})).unwrap();
        assert!(item.event_types.is_empty());
    }

    #[test]
    fn test_record_kind_is_not_an_event_type() {
        let item = read_item(&json!({"title": "Opening Party", "type": "event"})).unwrap();
        assert!(item.event_types.is_empty());

        let item = read_item(&json!({"types": ["sub-event"], "eventType": "party"})).unwrap();
        assert_eq!(item.event_types, vec!["party"]);
    }

    #[test]
    fn test_timestamps_are_tolerant() {
        let item = read_item(&json!({
            "startsAt": "not a date",
            "endsAt": 1717264800000i64,
            "created_at": "2024-06-01"
        }))
        .unwrap();
        assert!(item.starts_at.is_none());
        assert_eq!(item.ends_at.unwrap().timestamp(), 1_717_264_800);
        assert!(item.created_at.is_some());
    }

    #[test]
    fn test_counters_coerce() {
        let item = read_item(&json!({
            "rsvpCount": "42",
            "viewCount": -7,
            "rsvpChange24h": -3,
            "isSponsored": "true"
        }))
        .unwrap();
        assert_eq!(item.rsvp_count, 42);
        assert_eq!(item.view_count, 0);
        assert_eq!(item.rsvp_change_24h, -3);
        assert!(item.is_sponsored);

        let item = read_item(&json!({"rsvp_count": 12.9, "is_sponsored": 0})).unwrap();
        assert_eq!(item.rsvp_count, 12);
        assert!(!item.is_sponsored);
    }

    #[test]
    fn test_location_normalisation() {
        let item = read_item(&json!({"venue": "Hall 4", "city": "Milan"})).unwrap();
        assert_eq!(item.location.as_deref(), Some("Hall 4, Milan"));

        let item = read_item(&json!({"location": "Fiera", "city": "Milan"})).unwrap();
        assert_eq!(item.location.as_deref(), Some("Fiera"));

        let item = read_item(&json!({"city": "Milan"})).unwrap();
        assert_eq!(item.location.as_deref(), Some("Milan"));
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let item = read_item(&json!({"id": 17})).unwrap();
        assert_eq!(item.id, "17");
    }
}
