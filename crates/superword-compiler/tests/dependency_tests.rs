use proptest::prelude::*;
use superword_compiler::{has_cyclic_dependency, DependencyAnalyzer};

// 閾値の前後を含むオフセット
const OFFSETS: &[i32] = &[
    0, 1, 2, 3, 4, 7, 8, 14, 15, 16, 18, 20, 31, 32, 63, 64, 65, 127, 128, 129,
];

const ELEMENT_SIZES: [u32; 4] = [1, 2, 4, 8];

fn widths() -> Vec<u32> {
    (1..=7).map(|p| 1u32 << p).collect()
}

fn element_size() -> impl Strategy<Value = u32> {
    prop::sample::select(ELEMENT_SIZES.to_vec())
}

fn vector_width() -> impl Strategy<Value = u32> {
    (1u32..=7).prop_map(|p| 1 << p)
}

proptest! {
    /// オフセットが0以下なら幅によらず循環依存はない
    #[test]
    fn non_positive_offsets_are_never_cyclic(
        size in element_size(),
        offset in -1024i32..=0,
        width in vector_width(),
    ) {
        prop_assert!(!has_cyclic_dependency(size, offset, width));
    }

    /// 正のオフセットはバイト距離が幅未満のときだけ循環依存
    #[test]
    fn positive_offsets_follow_threshold(
        size in element_size(),
        offset in 1i32..=1024,
        width in vector_width(),
    ) {
        let byte_offset = offset as u32 * size;
        prop_assert_eq!(has_cyclic_dependency(size, offset, width), byte_offset < width);
    }

    /// 幅を広げていくと判定はちょうど一度だけ切り替わる
    #[test]
    fn threshold_flips_at_most_once(size in element_size(), offset in -300i32..=300) {
        let results: Vec<bool> = widths()
            .into_iter()
            .map(|w| has_cyclic_dependency(size, offset, w))
            .collect();

        let flips = results.windows(2).filter(|pair| pair[0] != pair[1]).count();
        prop_assert!(flips <= 1);
        if flips == 1 {
            // 狭い幅では安全、広い幅で循環依存
            prop_assert!(!results[0]);
            prop_assert!(*results.last().unwrap());
        }
    }

    /// 縮小後の幅は常に循環依存を持たない
    #[test]
    fn widest_legal_width_is_legal(
        size in element_size(),
        offset in -300i32..=300,
        upper in vector_width(),
    ) {
        let analyzer = DependencyAnalyzer::new();
        if let Some(width) = analyzer.widest_legal_width(size, offset, upper) {
            prop_assert!(width <= upper);
            prop_assert!(width >= size * 2);
            prop_assert!(!analyzer.has_cyclic_dependency(size, offset, width));
            // 一段広い幅はupperを超えるか循環依存
            let wider = width * 2;
            prop_assert!(wider > upper || analyzer.has_cyclic_dependency(size, offset, wider));
        }
    }
}

#[test]
fn test_offset_table_against_formula() {
    for &size in &ELEMENT_SIZES {
        for &magnitude in OFFSETS {
            for width in widths() {
                let byte_offset = magnitude as u32 * size;
                assert_eq!(
                    has_cyclic_dependency(size, magnitude, width),
                    magnitude > 0 && byte_offset < width,
                    "size={} offset=+{} width={}",
                    size,
                    magnitude,
                    width
                );
                assert!(
                    !has_cyclic_dependency(size, -magnitude, width),
                    "size={} offset=-{} width={}",
                    size,
                    magnitude,
                    width
                );
            }
        }
    }
}

#[test]
fn test_literal_scenarios() {
    // int32, +2
    assert!(has_cyclic_dependency(4, 2, 16));
    assert!(!has_cyclic_dependency(4, 2, 8));
    // double, +4
    assert!(!has_cyclic_dependency(8, 4, 32));
    assert!(has_cyclic_dependency(8, 4, 64));
    // byte, 0
    for width in widths() {
        assert!(!has_cyclic_dependency(1, 0, width));
    }
}

#[test]
fn test_threshold_adjacent_offsets() {
    // short, +7 -> 14バイト: 8では安全、16では循環
    assert!(!has_cyclic_dependency(2, 7, 8));
    assert!(has_cyclic_dependency(2, 7, 16));
    // byte, +15 / +31
    assert!(has_cyclic_dependency(1, 15, 16));
    assert!(!has_cyclic_dependency(1, 16, 16));
    assert!(has_cyclic_dependency(1, 31, 32));
    assert!(!has_cyclic_dependency(1, 31, 16));
    // long, +15 -> 120バイト
    assert!(has_cyclic_dependency(8, 15, 128));
    assert!(!has_cyclic_dependency(8, 15, 64));
}
