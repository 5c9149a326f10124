//! JSON shapes exchanged with the analytics stage and the renderer.

use serde::{Deserialize, Serialize};

use crate::model::Word;

/// One entry of the analytics payload: `{ "text": "rust", "size": 12 }`.
///
/// `size` is the frequency count; `weight` is accepted as an alias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpstreamWord {
    pub text: String,
    #[serde(alias = "weight")]
    pub size: f64,
}

impl From<UpstreamWord> for Word {
    fn from(w: UpstreamWord) -> Self {
        Word::new(w.text, w.size)
    }
}

/// A placement as the renderer consumes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub font_size: f32,
    pub rotation_deg: f32,
}

/// Everything the renderer needs for one cloud.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudPayload {
    pub width: i32,
    pub height: i32,
    pub font_family: String,
    pub font_weight: u16,
    pub words: Vec<LabelRecord>,
    pub dropped_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_size_field() {
        let w: UpstreamWord = serde_json::from_str(r#"{"text":"rust","size":12}"#).unwrap();
        assert_eq!(Word::from(w), Word::new("rust", 12.0));
    }

    #[test]
    fn test_upstream_weight_alias() {
        let w: UpstreamWord = serde_json::from_str(r#"{"text":"rust","weight":2.5}"#).unwrap();
        assert_eq!(w.size, 2.5);
    }

    #[test]
    fn test_payload_camel_case() {
        let payload = CloudPayload {
            width: 10,
            height: 10,
            font_family: "serif".into(),
            font_weight: 400,
            words: vec![LabelRecord {
                text: "a".into(),
                x: 5,
                y: 5,
                font_size: 12.0,
                rotation_deg: -90.0,
            }],
            dropped_count: 2,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"droppedCount\":2"));
        assert!(json.contains("\"fontSize\":12.0"));
        assert!(json.contains("\"rotationDeg\":-90.0"));
    }
}
