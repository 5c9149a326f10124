//! Boundary conversions: analytics JSON in, renderer payload out.

use thiserror::Error;
use wordcloud_core::{CloudPayload, LabelRecord, LayoutConfig, LayoutResult, UpstreamWord, Word};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("malformed word list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse `[{"text": .., "size": ..}, ..]` into engine words.
///
/// Shape errors fail the parse; semantic problems (blank text, zero weight)
/// pass through and are dropped by the engine as invalid words.
pub fn parse_words(json: &str) -> Result<Vec<Word>, BridgeError> {
    let upstream: Vec<UpstreamWord> = serde_json::from_str(json)?;
    log::debug!("Parsed {} upstream words", upstream.len());
    Ok(upstream.into_iter().map(Word::from).collect())
}

pub fn render_payload(result: &LayoutResult, config: &LayoutConfig) -> CloudPayload {
    CloudPayload {
        width: config.width,
        height: config.height,
        font_family: config.font_family.clone(),
        font_weight: config.font_weight,
        words: result
            .placements
            .iter()
            .map(|p| LabelRecord {
                text: p.text.clone(),
                x: p.x,
                y: p.y,
                font_size: p.font_size,
                rotation_deg: p.rotation_deg,
            })
            .collect(),
        dropped_count: result.dropped_count,
    }
}

/// User-facing message for a partial cloud, `None` when nothing was lost.
pub fn dropped_notice(result: &LayoutResult) -> Option<String> {
    match result.dropped_count {
        0 => None,
        1 => Some("1 word could not be displayed".to_string()),
        n => Some(format!("{n} words could not be displayed")),
    }
}
