//! # ターゲットモジュール
//!
//! ターゲットのSIMD機能プロファイルと、そこから導かれる
//! ベクトル幅の解決を扱うモジュールです。
//! CPU機能の検出そのものは行わず、有効な機能の集合を入力として受け取ります。

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::trace;
use serde::Deserialize;

use crate::error::{CompilerError, Result};
use crate::middleend::ir::ElementKind;

/// ターゲットのSIMD機能フラグ
///
/// 設定ファイルからは `FromStr` と同じ名前（別名を含む）で読み込みます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum TargetFeature {
    /// Intel SSE4.1
    Sse4_1,
    /// Intel AVX
    Avx,
    /// Intel AVX2
    Avx2,
    /// Intel AVX-512 Foundation
    Avx512F,
    /// Intel AVX-512 Byte/Word
    Avx512Bw,
    /// ARM Advanced SIMD (NEON)
    Asimd,
    /// ARM SVE（256ビット実装としてモデル化）
    Sve,
}

impl TargetFeature {
    /// すべての機能
    pub const ALL: [TargetFeature; 7] = [
        TargetFeature::Sse4_1,
        TargetFeature::Avx,
        TargetFeature::Avx2,
        TargetFeature::Avx512F,
        TargetFeature::Avx512Bw,
        TargetFeature::Asimd,
        TargetFeature::Sve,
    ];

    /// 命令セットのビット幅を取得
    pub fn bit_width(&self) -> u32 {
        match self {
            Self::Sse4_1 | Self::Asimd => 128,
            Self::Avx | Self::Avx2 | Self::Sve => 256,
            Self::Avx512F | Self::Avx512Bw => 512,
        }
    }

    /// ネイティブなベクトルレジスタ幅（バイト）
    pub fn register_width_bytes(&self) -> u32 {
        self.bit_width() / 8
    }

    /// 命令セットの優先度（高いほど新しく高性能）
    pub fn priority(&self) -> u32 {
        match self {
            Self::Sse4_1 => 50,
            Self::Asimd => 55,
            Self::Avx => 70,
            Self::Sve => 75,
            Self::Avx2 => 80,
            Self::Avx512F => 90,
            Self::Avx512Bw => 91,
        }
    }

    /// AVX-512系かどうか
    pub fn is_avx512(&self) -> bool {
        matches!(self, Self::Avx512F | Self::Avx512Bw)
    }

    /// 機能名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse4_1 => "sse4.1",
            Self::Avx => "avx",
            Self::Avx2 => "avx2",
            Self::Avx512F => "avx512",
            Self::Avx512Bw => "avx512bw",
            Self::Asimd => "asimd",
            Self::Sve => "sve",
        }
    }
}

impl FromStr for TargetFeature {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sse4.1" | "sse4_1" | "sse41" => Ok(Self::Sse4_1),
            "avx" | "avx1" => Ok(Self::Avx),
            "avx2" => Ok(Self::Avx2),
            "avx512" | "avx512f" => Ok(Self::Avx512F),
            "avx512bw" => Ok(Self::Avx512Bw),
            "asimd" | "neon" => Ok(Self::Asimd),
            "sve" => Ok(Self::Sve),
            _ => Err(CompilerError::UnknownFeature(s.to_string())),
        }
    }
}

impl TryFrom<String> for TargetFeature {
    type Error = CompilerError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl fmt::Display for TargetFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 有効なSIMD機能の集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct FeatureProfile {
    features: BTreeSet<TargetFeature>,
}

impl FeatureProfile {
    /// 空のプロファイル（スカラーのみ）
    pub fn new() -> Self {
        Self::default()
    }

    /// 機能の列からプロファイルを作成
    pub fn from_features<I: IntoIterator<Item = TargetFeature>>(features: I) -> Self {
        Self {
            features: features.into_iter().collect(),
        }
    }

    /// 機能名の列からプロファイルを作成
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let features = names
            .into_iter()
            .filter(|name| !name.as_ref().trim().is_empty())
            .map(|name| name.as_ref().parse::<TargetFeature>())
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { features })
    }

    /// 特定の機能が有効かどうかを確認
    pub fn has(&self, feature: TargetFeature) -> bool {
        self.features.contains(&feature)
    }

    /// 有効な機能がないかどうか
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// 有効な機能の一覧
    pub fn features(&self) -> impl Iterator<Item = TargetFeature> + '_ {
        self.features.iter().copied()
    }

    /// 優先度が最も高い機能
    pub fn highest(&self) -> Option<TargetFeature> {
        self.features.iter().copied().max_by_key(|f| f.priority())
    }
}

impl FromStr for FeatureProfile {
    type Err = CompilerError;

    /// カンマ区切りの機能名を解析
    fn from_str(s: &str) -> Result<Self> {
        Self::from_names(s.split(','))
    }
}

impl fmt::Display for FeatureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            return write!(f, "-");
        }
        let names: Vec<&str> = self.features.iter().map(|f| f.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// ベクトル幅の解決器
///
/// 機能プロファイルのネイティブ幅を要素型ごとの制約と設定上限で絞り込みます。
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorWidthResolver;

impl VectorWidthResolver {
    /// 新しい解決器を作成
    pub fn new() -> Self {
        Self
    }

    /// 要素型に使えるベクトル幅（バイト）を解決
    ///
    /// 2要素に満たない場合や有効な機能がない場合は0（スカラーのみ）を返します。
    pub fn resolve(&self, kind: ElementKind, profile: &FeatureProfile, max_configured_width: u32) -> u32 {
        let Some(top) = profile.highest() else {
            trace!("SIMD機能なし: {} はスカラーのみ", kind);
            return 0;
        };

        let mut width = top.register_width_bytes();

        // AVX1の256ビット演算は浮動小数点のみ
        if top == TargetFeature::Avx && !kind.is_floating_point() {
            width = 16;
        }

        // AVX-512BWなしではバイト/ワード演算は256ビットまで
        if top.is_avx512() && kind.byte_size() <= 2 && !profile.has(TargetFeature::Avx512Bw) {
            width = 32;
        }

        width = floor_power_of_two(width.min(max_configured_width));

        if width / kind.byte_size() < 2 {
            trace!("{} は幅 {} バイトで2要素に満たない", kind, width);
            return 0;
        }

        trace!("{} ({}) -> 幅 {} バイト", kind, profile, width);
        width
    }
}

/// `value` 以下の最大の2のべき乗（`value == 0` なら0）
fn floor_power_of_two(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        1 << (31 - value.leading_zeros())
    }
}
