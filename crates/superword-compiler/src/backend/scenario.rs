//! # シナリオ
//!
//! 機能プロファイルとベクトル幅上限（`max_vector_size`）の組に名前を付けたものです。
//! 網羅的な判定スイープでは、シナリオごとに独立した判定を行います。

use std::fmt;

use crate::backend::target::{FeatureProfile, TargetFeature, VectorWidthResolver};
use crate::error::{CompilerError, Result};
use crate::middleend::ir::ElementKind;

/// 名前付きのターゲット構成
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scenario {
    /// シナリオ名
    pub name: String,
    /// 有効なSIMD機能
    pub profile: FeatureProfile,
    /// ベクトル幅の上限（バイト）
    pub max_vector_size: u32,
}

impl Scenario {
    /// 新しいシナリオを作成
    pub fn new(name: impl Into<String>, profile: FeatureProfile, max_vector_size: u32) -> Self {
        Self {
            name: name.into(),
            profile,
            max_vector_size,
        }
    }

    /// 標準のシナリオ一覧
    pub fn catalog() -> Vec<Scenario> {
        use TargetFeature::*;

        let sse4 = || FeatureProfile::from_features([Sse4_1]);
        let avx1 = || FeatureProfile::from_features([Sse4_1, Avx]);
        let avx2 = || FeatureProfile::from_features([Sse4_1, Avx, Avx2]);
        let avx512 = || FeatureProfile::from_features([Sse4_1, Avx, Avx2, Avx512F]);
        let avx512bw = || FeatureProfile::from_features([Sse4_1, Avx, Avx2, Avx512F, Avx512Bw]);
        let asimd = || FeatureProfile::from_features([Asimd]);

        vec![
            Scenario::new("vanilla", FeatureProfile::new(), 64),
            Scenario::new("sse4-v004", sse4(), 4),
            Scenario::new("sse4-v008", sse4(), 8),
            Scenario::new("sse4-v016", sse4(), 16),
            Scenario::new("avx1-v016", avx1(), 16),
            Scenario::new("avx1-v032", avx1(), 32),
            Scenario::new("avx2-v016", avx2(), 16),
            Scenario::new("avx2-v032", avx2(), 32),
            Scenario::new("avx512-v064", avx512(), 64),
            Scenario::new("avx512bw-v064", avx512bw(), 64),
            Scenario::new("asimd-v008", asimd(), 8),
            Scenario::new("asimd-v016", asimd(), 16),
            Scenario::new("sve-v032", FeatureProfile::from_features([Asimd, Sve]), 32),
        ]
    }

    /// カタログから名前でシナリオを取得
    pub fn find(name: &str) -> Result<Scenario> {
        Self::catalog()
            .into_iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| CompilerError::UnknownScenario(name.to_string()))
    }

    /// このシナリオで要素型に使えるベクトル幅
    pub fn vector_width(&self, kind: ElementKind) -> u32 {
        VectorWidthResolver::new().resolve(kind, &self.profile, self.max_vector_size)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}; max {}B]", self.name, self.profile, self.max_vector_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = Scenario::catalog();
        let mut names: Vec<&str> = catalog.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_find() {
        let scenario = Scenario::find("avx2-v032").unwrap();
        assert_eq!(scenario.vector_width(ElementKind::Int32), 32);
        assert!(matches!(
            Scenario::find("altivec"),
            Err(CompilerError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_vanilla_is_scalar_only() {
        let vanilla = Scenario::find("vanilla").unwrap();
        for kind in ElementKind::ALL {
            assert_eq!(vanilla.vector_width(kind), 0);
        }
    }

    #[test]
    fn test_sse4_v004_excludes_wide_elements() {
        let scenario = Scenario::find("sse4-v004").unwrap();
        assert_eq!(scenario.vector_width(ElementKind::Int8), 4);
        assert_eq!(scenario.vector_width(ElementKind::Int16), 4);
        assert_eq!(scenario.vector_width(ElementKind::Int32), 0);
        assert_eq!(scenario.vector_width(ElementKind::Float64), 0);
    }
}
