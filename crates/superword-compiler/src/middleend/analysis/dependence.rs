//! # 依存距離解析
//!
//! `data[i + offset] = f(data[i])` 形式のループについて、
//! ベクトル幅 `width_bytes` でまとめたときに循環依存が生じるかを判定します。
//!
//! SIMD実行ではひとつのベクトルグループのロードがすべて
//! ストアより先に行われます。そのため
//!
//! - オフセットが0以下なら、どの幅でも循環依存は生じません。
//! - 正のオフセットでは、バイト距離がベクトル幅未満のときだけ
//!   同じグループ内で書き込み前の値を読んでしまいます。

use log::trace;

/// 依存距離の解析結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependenceKind {
    /// 依存なし（オフセット0）
    None,
    /// ストアがロードより後ろの要素を書く（後方依存）
    Backward,
    /// ストアがロードより前方の要素を書く（前方依存）
    Forward,
}

/// ストアとロードの依存距離
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependenceDistance {
    /// 要素単位の距離
    pub elements: i64,
    /// バイト単位の距離
    pub bytes: i64,
}

impl DependenceDistance {
    /// 要素サイズとオフセットから距離を計算
    pub fn new(element_byte_size: u32, offset_elements: i32) -> Self {
        let elements = i64::from(offset_elements);
        Self {
            elements,
            bytes: elements * i64::from(element_byte_size),
        }
    }

    /// 依存の向き
    pub fn kind(&self) -> DependenceKind {
        match self.bytes {
            0 => DependenceKind::None,
            b if b < 0 => DependenceKind::Backward,
            _ => DependenceKind::Forward,
        }
    }

    /// 指定幅でまとめたときに循環依存となるか
    pub fn is_cyclic_at(&self, width_bytes: u32) -> bool {
        self.kind() == DependenceKind::Forward && self.bytes < i64::from(width_bytes)
    }
}

/// 依存距離解析器
///
/// 状態を持たないため、複数スレッドから同時に使えます。
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyAnalyzer;

impl DependencyAnalyzer {
    /// 新しい解析器を作成
    pub fn new() -> Self {
        Self
    }

    /// 循環依存があるかどうかを判定
    pub fn has_cyclic_dependency(
        &self,
        element_byte_size: u32,
        offset_elements: i32,
        width_bytes: u32,
    ) -> bool {
        has_cyclic_dependency(element_byte_size, offset_elements, width_bytes)
    }

    /// 循環依存を生じない最大のベクトル幅（2のべき乗）
    ///
    /// 前方依存でない場合は `upper_bytes` をそのまま返します。
    /// 2要素以上を保てる幅がなければ `None`。
    pub fn widest_legal_width(
        &self,
        element_byte_size: u32,
        offset_elements: i32,
        upper_bytes: u32,
    ) -> Option<u32> {
        let min_width = element_byte_size * 2;
        let mut width = upper_bytes;
        while width >= min_width {
            if !has_cyclic_dependency(element_byte_size, offset_elements, width) {
                return Some(width);
            }
            width /= 2;
        }
        None
    }
}

/// 循環依存があるかどうかを判定
///
/// 要素サイズ0は呼び出し側の不変条件違反です。
pub fn has_cyclic_dependency(element_byte_size: u32, offset_elements: i32, width_bytes: u32) -> bool {
    assert!(element_byte_size > 0, "要素サイズは正である必要があります");

    let distance = DependenceDistance::new(element_byte_size, offset_elements);
    let cyclic = distance.is_cyclic_at(width_bytes);
    trace!(
        "依存距離: {} 要素 / {} バイト, 幅 {} バイト -> 循環依存 {}",
        distance.elements,
        distance.bytes,
        width_bytes,
        cyclic
    );
    cyclic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_offset_within_vector_is_cyclic() {
        // int32, +2 -> 8バイト
        assert!(has_cyclic_dependency(4, 2, 16));
        assert!(!has_cyclic_dependency(4, 2, 8));
    }

    #[test]
    fn test_backward_and_zero_offsets() {
        for width in [2, 4, 8, 16, 32, 64, 128] {
            assert!(!has_cyclic_dependency(4, -1, width));
            assert!(!has_cyclic_dependency(1, 0, width));
            assert!(!has_cyclic_dependency(8, -129, width));
        }
    }

    #[test]
    fn test_dependence_kind() {
        assert_eq!(DependenceDistance::new(2, 0).kind(), DependenceKind::None);
        assert_eq!(DependenceDistance::new(2, -7).kind(), DependenceKind::Backward);
        assert_eq!(DependenceDistance::new(2, 7).kind(), DependenceKind::Forward);
        assert_eq!(DependenceDistance::new(2, 7).bytes, 14);
    }

    #[test]
    fn test_only_forward_distances_are_cyclic() {
        // short, ±7 -> ±14バイト
        assert!(DependenceDistance::new(2, 7).is_cyclic_at(16));
        assert!(!DependenceDistance::new(2, 7).is_cyclic_at(8));
        assert!(!DependenceDistance::new(2, -7).is_cyclic_at(16));
        assert!(!DependenceDistance::new(2, 0).is_cyclic_at(16));
    }

    #[test]
    fn test_widest_legal_width() {
        let analyzer = DependencyAnalyzer::new();
        // double, +4 -> 32バイト
        assert_eq!(analyzer.widest_legal_width(8, 4, 64), Some(32));
        // int32, +3 -> 12バイト: 8バイトまで縮める
        assert_eq!(analyzer.widest_legal_width(4, 3, 64), Some(8));
        // int32, +1 -> 4バイト: 2要素を保てない
        assert_eq!(analyzer.widest_legal_width(4, 1, 64), None);
        assert_eq!(analyzer.widest_legal_width(4, -1, 64), Some(64));
    }

    #[test]
    #[should_panic]
    fn test_zero_element_size_panics() {
        has_cyclic_dependency(0, 1, 16);
    }
}
