//! SVG preview of a laid-out cloud.
//!
//! Each label is drawn centered on its placement with the same weight and
//! letter spacing the masks were built with.  Colors are cosmetic: a hue
//! per label from a seeded generator, at fixed saturation and lightness.

use std::fmt::Write;

use wordcloud_core::{CloudPayload, LayoutConfig, RandomSource, SeededRng};

const SATURATION: u8 = 70;
const LIGHTNESS: u8 = 60;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render(payload: &CloudPayload, config: &LayoutConfig) -> String {
    let mut rng = SeededRng::new(config.seed);
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = payload.width,
        h = payload.height,
    );
    let _ = writeln!(
        svg,
        r#"  <g font-family="{}" font-weight="{}" letter-spacing="{}" text-anchor="middle" dominant-baseline="central">"#,
        escape(&payload.font_family),
        payload.font_weight,
        config.letter_spacing,
    );

    for word in &payload.words {
        let hue = (rng.next_f64() * 360.0).floor();
        let _ = writeln!(
            svg,
            r#"    <text transform="translate({},{}) rotate({})" font-size="{}" fill="hsl({hue}, {SATURATION}%, {LIGHTNESS}%)">{}</text>"#,
            word.x,
            word.y,
            word.rotation_deg,
            word.font_size,
            escape(&word.text),
        );
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordcloud_core::LabelRecord;

    fn payload() -> CloudPayload {
        CloudPayload {
            width: 300,
            height: 200,
            font_family: "Montserrat".into(),
            font_weight: 600,
            words: vec![
                LabelRecord {
                    text: "R&D <lab>".into(),
                    x: 150,
                    y: 100,
                    font_size: 40.0,
                    rotation_deg: 0.0,
                },
                LabelRecord {
                    text: "up".into(),
                    x: 40,
                    y: 90,
                    font_size: 20.0,
                    rotation_deg: -90.0,
                },
            ],
            dropped_count: 0,
        }
    }

    #[test]
    fn test_render_structure() {
        let svg = render(&payload(), &LayoutConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 300 200""#));
        assert!(svg.contains(r#"font-weight="600""#));
        assert!(svg.contains(r#"letter-spacing="1""#));
        assert_eq!(svg.matches("<text").count(), 2);
        assert!(svg.contains("translate(40,90) rotate(-90)"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render(&payload(), &LayoutConfig::default());
        assert!(svg.contains("R&amp;D &lt;lab&gt;"));
        assert!(!svg.contains("<lab>"));
    }

    #[test]
    fn test_colors_follow_seed() {
        let config = LayoutConfig::default();
        assert_eq!(render(&payload(), &config), render(&payload(), &config));
        let other = LayoutConfig {
            seed: config.seed + 1,
            ..LayoutConfig::default()
        };
        assert_ne!(render(&payload(), &config), render(&payload(), &other));
    }

    #[test]
    fn test_empty_payload() {
        let svg = render(&CloudPayload::default(), &LayoutConfig::default());
        assert_eq!(svg.matches("<text").count(), 0);
    }
}
