//! Payload extraction: find the marker element in a page and decode its JSON.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::domain::{FetchError, Record};

/// Identifies the element that carries the payload, e.g.
/// `<script id="wallpaper" type="application/json">{...}</script>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayloadMarker {
    pub element_id: String,
    pub content_type: String,
}

impl Default for PayloadMarker {
    fn default() -> Self {
        Self {
            element_id: "wallpaper".to_string(),
            content_type: "application/json".to_string(),
        }
    }
}

impl PayloadMarker {
    pub fn selector_text(&self) -> String {
        format!(
            r#"script[id="{}"][type="{}"]"#,
            self.element_id, self.content_type
        )
    }

    pub fn selector(&self) -> Result<Selector, String> {
        let text = self.selector_text();
        Selector::parse(&text).map_err(|e| format!("{text}: {e}"))
    }
}

/// Pull the payload record out of `html`.
///
/// The first matching element wins. Its text must be a JSON object with an
/// `id` field.
pub fn extract_payload(html: &str, marker: &PayloadMarker) -> Result<Record, FetchError> {
    let selector = marker.selector().map_err(|selector| FetchError::MarkerMissing { selector })?;
    let doc = Html::parse_document(html);

    let text = doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| FetchError::MarkerMissing {
            selector: marker.selector_text(),
        })?;

    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|e| FetchError::InvalidPayload(e.to_string()))?;
    let record = Record::try_from(value)
        .map_err(|other| FetchError::InvalidPayload(format!("expected object, got {other}")))?;

    if record.id().is_none() {
        return Err(FetchError::MissingId);
    }
    Ok(record)
}
