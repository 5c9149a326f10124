//! Property-based invariants of the placement engine.
//!
//! For any word list, canvas and seed:
//!
//! 1. Placed plus dropped equals the input length.
//! 2. Every committed box lies inside the canvas.
//! 3. No two committed footprints share a cell.
//! 4. Font size never decreases with weight.
//! 5. Identical inputs serialize identically.
//! 6. The quadtree and the flat index produce the same layout.

use proptest::prelude::*;
use wordcloud_core::{Aabb, IndexBackend, LayoutConfig, Word};
use wordcloud_layout::{BlockRasterizer, CloudLayout};

// ── Helpers ─────────────────────────────────────────────────────────────

fn word_strategy() -> impl Strategy<Value = Word> {
    ("[a-zA-Z]{1,8}", 0.5f64..50.0).prop_map(|(text, weight)| Word::new(text, weight))
}

fn config_strategy() -> impl Strategy<Value = LayoutConfig> {
    (60i32..=320, 60i32..=240, 0u32..=4, 2.0f32..=8.0, any::<u64>()).prop_map(
        |(width, height, padding, font_scale, seed)| LayoutConfig {
            width,
            height,
            padding,
            font_scale,
            seed,
            ..Default::default()
        },
    )
}

fn engine(config: LayoutConfig) -> CloudLayout<BlockRasterizer> {
    CloudLayout::new(config, BlockRasterizer::new()).expect("generated configs are valid")
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Accounting, containment, no overlap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn placements_are_disjoint_and_inside(
        words in proptest::collection::vec(word_strategy(), 0..40),
        config in config_strategy(),
    ) {
        let canvas = Aabb::from_rect(0, 0, config.width, config.height);
        let layout = engine(config);
        let result = layout.run(&words);

        prop_assert_eq!(result.total(), words.len());

        let masks: Vec<_> = result
            .placements
            .iter()
            .map(|p| layout.footprint_of(p).unwrap())
            .collect();
        for (p, m) in result.placements.iter().zip(&masks) {
            prop_assert!(canvas.contains_box(&p.bounds));
            prop_assert_eq!(m.bounds_at(p.x, p.y), p.bounds);
        }
        for i in 0..masks.len() {
            for j in i + 1..masks.len() {
                let (a, b) = (&result.placements[i], &result.placements[j]);
                prop_assert!(!masks[i].overlaps((a.x, a.y), &masks[j], (b.x, b.y)));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Monotone sizing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn font_size_is_monotone(
        words in proptest::collection::vec(word_strategy(), 1..30),
        config in config_strategy(),
    ) {
        let result = engine(config).run(&words);
        for a in &result.placements {
            for b in &result.placements {
                if a.weight > b.weight {
                    prop_assert!(a.font_size >= b.font_size);
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5–6. Determinism and backend agreement
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn same_input_same_bytes(
        words in proptest::collection::vec(word_strategy(), 0..30),
        config in config_strategy(),
    ) {
        let layout = engine(config);
        let first = serde_json::to_string(&layout.run(&words)).unwrap();
        let second = serde_json::to_string(&layout.run(&words)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn quadtree_matches_flat_index(
        words in proptest::collection::vec(word_strategy(), 0..30),
        config in config_strategy(),
    ) {
        let flat = LayoutConfig { index: IndexBackend::Flat, ..config.clone() };
        prop_assert_eq!(engine(config).run(&words), engine(flat).run(&words));
    }
}
