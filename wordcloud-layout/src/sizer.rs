//! Word sizing: weight to font size, plus the per-word rotation draw.
//!
//! The lightest word gets exactly `font_scale` pixels; every other word
//! scales with `sqrt(weight² / min_weight²)`.

use wordcloud_core::{LayoutConfig, RandomSource, RotationOption, SizedWord, Word};

/// `1 / min(weight²)` over the valid words, or `1` when that minimum is zero
/// (or there are no valid words at all).
pub fn normalization_scale(words: &[Word]) -> f64 {
    let min_sq = words
        .iter()
        .filter(|w| w.is_valid())
        .map(|w| w.weight * w.weight)
        .fold(f64::INFINITY, f64::min);

    if min_sq.is_finite() && min_sq > 0.0 {
        1.0 / min_sq
    } else {
        1.0
    }
}

#[inline]
pub fn font_size(weight: f64, scale: f64, font_scale: f32) -> f32 {
    ((weight * weight * scale).sqrt() * f64::from(font_scale)) as f32
}

/// Draw one angle from the discrete distribution.
///
/// Falls back to the last option when rounding leaves the cumulative sum a
/// hair under the sample.
pub fn pick_rotation(options: &[RotationOption], rng: &mut dyn RandomSource) -> f32 {
    let sample = rng.next_f64();
    let mut cumulative = 0.0;
    for option in options {
        cumulative += option.probability;
        if sample < cumulative {
            return option.angle_deg;
        }
    }
    options.last().map_or(0.0, |o| o.angle_deg)
}

/// Size every valid word, in input order.  Invalid words are skipped and
/// consume no random draw; `input_index` keeps the original position.
pub fn size_words(
    words: &[Word],
    config: &LayoutConfig,
    rng: &mut dyn RandomSource,
) -> Vec<SizedWord> {
    let scale = normalization_scale(words);
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| w.is_valid())
        .map(|(input_index, word)| SizedWord {
            word: word.clone(),
            font_size: font_size(word.weight, scale, config.font_scale),
            rotation_deg: pick_rotation(&config.rotation_options, rng),
            input_index,
        })
        .collect()
}

/// Stable weight-descending order.  Equal weights keep input order.
pub fn sort_by_weight(words: &mut [SizedWord]) {
    words.sort_by(|a, b| b.word.weight.total_cmp(&a.word.weight));
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wordcloud_core::{SeededRng, SequenceSource};

    fn words(weights: &[f64]) -> Vec<Word> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Word::new(format!("w{i}"), w))
            .collect()
    }

    #[test]
    fn test_scale_uses_smallest_weight() {
        let scale = normalization_scale(&words(&[10.0, 2.0, 5.0]));
        assert!((scale - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_scale_empty_is_one() {
        assert_eq!(normalization_scale(&[]), 1.0);
    }

    #[test]
    fn test_scale_ignores_invalid_words() {
        let list = vec![Word::new("a", 4.0), Word::new("b", 0.0), Word::new("", 1.0)];
        assert!((normalization_scale(&list) - 1.0 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_underflow_guard() {
        // 1e-200² underflows to zero.
        let scale = normalization_scale(&words(&[1e-200]));
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_lightest_word_gets_font_scale() {
        let list = words(&[100.0, 50.0, 10.0]);
        let scale = normalization_scale(&list);
        assert!((font_size(10.0, scale, 20.0) - 20.0).abs() < 1e-4);
        assert!((font_size(50.0, scale, 20.0) - 100.0).abs() < 1e-3);
        assert!((font_size(100.0, scale, 20.0) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_font_size_monotonic() {
        let list = words(&[1.0, 3.0, 7.5, 7.6, 40.0, 1000.0]);
        let scale = normalization_scale(&list);
        let sizes: Vec<f32> = list
            .iter()
            .map(|w| font_size(w.weight, scale, 12.0))
            .collect();
        for pair in sizes.windows(2) {
            assert!(pair[1] >= pair[0], "{} should be >= {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_pick_rotation_follows_distribution_edges() {
        let options = [RotationOption::new(0.0, 0.75), RotationOption::new(-90.0, 0.25)];
        let mut src = SequenceSource::new(vec![0.0, 0.74, 0.75, 0.999]);
        assert_eq!(pick_rotation(&options, &mut src), 0.0);
        assert_eq!(pick_rotation(&options, &mut src), 0.0);
        assert_eq!(pick_rotation(&options, &mut src), -90.0);
        assert_eq!(pick_rotation(&options, &mut src), -90.0);
    }

    #[test]
    fn test_pick_rotation_skips_zero_probability() {
        let options = [RotationOption::new(45.0, 0.0), RotationOption::new(90.0, 1.0)];
        let mut src = SequenceSource::new(vec![0.0]);
        assert_eq!(pick_rotation(&options, &mut src), 90.0);
    }

    #[test]
    fn test_pick_rotation_rounding_fallback() {
        let options = [RotationOption::new(0.0, 0.5), RotationOption::new(30.0, 0.4999999)];
        let mut src = SequenceSource::new(vec![0.99999999]);
        assert_eq!(pick_rotation(&options, &mut src), 30.0);
    }

    #[test]
    fn test_rotation_frequencies_roughly_match() {
        let options = [RotationOption::new(0.0, 0.75), RotationOption::new(-90.0, 0.25)];
        let mut rng = SeededRng::new(1234);
        let vertical = (0..10_000)
            .filter(|_| pick_rotation(&options, &mut rng) == -90.0)
            .count();
        assert!((2200..2800).contains(&vertical), "got {vertical} vertical draws");
    }

    #[test]
    fn test_size_words_skips_invalid_and_keeps_index() {
        let list = vec![Word::new("a", 2.0), Word::new("", 5.0), Word::new("c", 4.0)];
        let config = LayoutConfig::default();
        let mut rng = SeededRng::new(1);
        let sized = size_words(&list, &config, &mut rng);
        assert_eq!(sized.len(), 2);
        assert_eq!(sized[0].input_index, 0);
        assert_eq!(sized[1].input_index, 2);
        assert!(sized.iter().all(|s| s.font_size > 0.0));
    }

    #[test]
    fn test_size_words_deterministic() {
        let list = words(&[5.0, 1.0, 3.0, 3.0, 9.0]);
        let config = LayoutConfig::default();
        let a = size_words(&list, &config, &mut SeededRng::new(77));
        let b = size_words(&list, &config, &mut SeededRng::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sort_is_stable_and_descending() {
        let list = vec![
            Word::new("first", 3.0),
            Word::new("big", 9.0),
            Word::new("second", 3.0),
            Word::new("small", 1.0),
        ];
        let config = LayoutConfig::default();
        let mut sized = size_words(&list, &config, &mut SeededRng::new(5));
        sort_by_weight(&mut sized);
        let order: Vec<&str> = sized.iter().map(|s| s.word.text.as_str()).collect();
        assert_eq!(order, vec!["big", "first", "second", "small"]);
    }
}
