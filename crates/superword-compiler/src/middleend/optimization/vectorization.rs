// 最適化パス - ベクトル化計画
//
// 自己参照オフセット配列ループのベクトル化計画を立てます。
// 主な役割：
// - ターゲットに応じたベクトル幅の決定
// - 依存距離によるベクトル化の安全性確認
// - ベクトル化するかスカラーに戻すかの判定

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::backend::scenario::Scenario;
use crate::backend::target::{FeatureProfile, VectorWidthResolver};
use crate::config::{validate_vector_width, VectorizationConfig};
use crate::diagnostics::{Diagnostic, DiagnosticEmitter, DiagnosticLevel};
use crate::error::Result;
use crate::middleend::analysis::DependencyAnalyzer;
use crate::middleend::ir::LoopDescriptor;

/// ベクトル化できない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// 2要素以上を扱えるベクトル幅がない
    NoSuitableVectorWidth,
    /// この幅では循環依存になる
    CyclicDependency {
        /// ストアとロードの距離（バイト）
        byte_offset: i64,
        /// 検討したベクトル幅（バイト）
        width_bytes: u32,
    },
    /// フロントエンドがループ範囲を検査していない
    UnverifiedBounds,
}

impl RejectReason {
    /// 診断コード
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::NoSuitableVectorWidth => "V0101",
            RejectReason::CyclicDependency { .. } => "V0102",
            RejectReason::UnverifiedBounds => "V0103",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoSuitableVectorWidth => write!(f, "適切なベクトル幅がありません"),
            RejectReason::CyclicDependency { byte_offset, width_bytes } => write!(
                f,
                "幅 {} バイトで循環依存があります (距離 {} バイト)",
                width_bytes, byte_offset
            ),
            RejectReason::UnverifiedBounds => write!(f, "ループ範囲が検査されていません"),
        }
    }
}

/// ベクトル化の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// ベクトル化する
    CanVectorize {
        /// ベクトル幅（バイト）
        width_bytes: u32,
        /// 1ベクトルあたりの要素数
        elements_per_vector: u32,
    },
    /// スカラーのまま実行する
    CannotVectorize(RejectReason),
}

impl Decision {
    /// ベクトル化する判定を作成
    ///
    /// 幅が要素サイズで割り切れない、または2要素未満の場合は
    /// 幅の解決側の不具合なのでパニックします。
    pub fn vectorize(width_bytes: u32, element_byte_size: u32) -> Self {
        assert!(
            element_byte_size > 0 && width_bytes % element_byte_size == 0,
            "ベクトル幅 {} が要素サイズ {} で割り切れません",
            width_bytes,
            element_byte_size
        );
        let elements_per_vector = width_bytes / element_byte_size;
        assert!(
            elements_per_vector >= 2,
            "ベクトルあたり {} 要素ではベクトル化できません",
            elements_per_vector
        );
        Decision::CanVectorize {
            width_bytes,
            elements_per_vector,
        }
    }

    /// ベクトル化するかどうか
    pub fn is_vectorized(&self) -> bool {
        matches!(self, Decision::CanVectorize { .. })
    }

    /// ベクトル幅（バイト）
    pub fn width_bytes(&self) -> Option<u32> {
        match self {
            Decision::CanVectorize { width_bytes, .. } => Some(*width_bytes),
            Decision::CannotVectorize(_) => None,
        }
    }

    /// 1ベクトルあたりの要素数
    pub fn elements_per_vector(&self) -> Option<u32> {
        match self {
            Decision::CanVectorize { elements_per_vector, .. } => Some(*elements_per_vector),
            Decision::CannotVectorize(_) => None,
        }
    }

    /// ベクトル化できない理由
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Decision::CanVectorize { .. } => None,
            Decision::CannotVectorize(reason) => Some(*reason),
        }
    }

    /// 最適化リマークに変換
    pub fn remark(&self, descriptor: &LoopDescriptor) -> Diagnostic {
        match self {
            Decision::CanVectorize { width_bytes, elements_per_vector } => Diagnostic::new(
                DiagnosticLevel::Note,
                format!(
                    "{}: 幅 {} バイト ({} 要素) でベクトル化しました",
                    descriptor, width_bytes, elements_per_vector
                ),
            )
            .with_code("V0001".to_string()),
            Decision::CannotVectorize(reason) => {
                let level = match reason {
                    RejectReason::UnverifiedBounds => DiagnosticLevel::Warning,
                    _ => DiagnosticLevel::Info,
                };
                Diagnostic::new(level, format!("{}: ベクトル化できません: {}", descriptor, reason))
                    .with_code(reason.code().to_string())
            }
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::CanVectorize { width_bytes, elements_per_vector } => {
                write!(f, "vectorize({}B x{})", width_bytes, elements_per_vector)
            }
            Decision::CannotVectorize(reason) => write!(f, "scalar({})", reason),
        }
    }
}

/// ベクトル化計画器
///
/// 判定は入力だけから決まり、呼び出し間で状態を持ち越しません。
#[derive(Debug, Clone)]
pub struct VectorizationPlanner {
    /// 有効なSIMD機能
    profile: FeatureProfile,
    /// ベクトル幅の上限（バイト）
    max_vector_size: u32,
    /// 循環依存のとき幅を狭めて再試行するか
    allow_narrowing: bool,
    resolver: VectorWidthResolver,
    analyzer: DependencyAnalyzer,
}

impl VectorizationPlanner {
    /// 新しい計画器を作成
    pub fn new(profile: FeatureProfile, max_vector_size: u32) -> Self {
        Self {
            profile,
            max_vector_size,
            allow_narrowing: false,
            resolver: VectorWidthResolver::new(),
            analyzer: DependencyAnalyzer::new(),
        }
    }

    /// シナリオから計画器を作成
    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.profile.clone(), scenario.max_vector_size)
    }

    /// 設定から計画器を作成
    pub fn from_config(config: &VectorizationConfig) -> Result<Self> {
        validate_vector_width(config.max_vector_size)?;
        Ok(Self::new(config.features.clone(), config.max_vector_size).with_narrowing(config.allow_narrowing))
    }

    /// 幅を狭めた再試行を有効化
    pub fn with_narrowing(mut self, allow: bool) -> Self {
        self.allow_narrowing = allow;
        self
    }

    /// 機能プロファイル
    pub fn profile(&self) -> &FeatureProfile {
        &self.profile
    }

    /// ベクトル幅の上限
    pub fn max_vector_size(&self) -> u32 {
        self.max_vector_size
    }

    /// ループに使える候補ベクトル幅（バイト）
    pub fn candidate_width(&self, descriptor: &LoopDescriptor) -> u32 {
        self.resolver
            .resolve(descriptor.element_kind, &self.profile, self.max_vector_size)
    }

    /// ループのベクトル化を計画
    pub fn plan(&self, descriptor: &LoopDescriptor) -> Decision {
        let decision = self.decide(descriptor);
        debug!("{} [{}; max {}B] -> {}", descriptor, self.profile, self.max_vector_size, decision);
        decision
    }

    /// ループのベクトル化を計画し、リマークを記録
    pub fn plan_with_remarks(&self, descriptor: &LoopDescriptor, emitter: &mut DiagnosticEmitter) -> Decision {
        let decision = self.plan(descriptor);
        let remark = decision.remark(descriptor);
        emitter.emit(&remark);
        emitter.add_diagnostic(remark);
        decision
    }

    fn decide(&self, descriptor: &LoopDescriptor) -> Decision {
        if !descriptor.loop_bounds_valid {
            return Decision::CannotVectorize(RejectReason::UnverifiedBounds);
        }

        let element_byte_size = descriptor.element_byte_size();
        let offset_elements = descriptor.offset_elements;

        let width_bytes = self.candidate_width(descriptor);
        if width_bytes == 0 {
            return Decision::CannotVectorize(RejectReason::NoSuitableVectorWidth);
        }

        if self
            .analyzer
            .has_cyclic_dependency(element_byte_size, offset_elements, width_bytes)
        {
            if self.allow_narrowing {
                if let Some(narrow) =
                    self.analyzer
                        .widest_legal_width(element_byte_size, offset_elements, width_bytes / 2)
                {
                    debug!("{}: 幅 {} -> {} バイトに縮小", descriptor, width_bytes, narrow);
                    return Decision::vectorize(narrow, element_byte_size);
                }
            }
            return Decision::CannotVectorize(RejectReason::CyclicDependency {
                byte_offset: descriptor.byte_offset(),
                width_bytes,
            });
        }

        Decision::vectorize(width_bytes, element_byte_size)
    }

    /// ループとシナリオの全組み合わせを並列に計画
    ///
    /// 各組み合わせは独立に計画され、結果は入力順（ループ優先）に並びます。
    pub fn sweep(loops: &[LoopDescriptor], scenarios: &[Scenario], allow_narrowing: bool) -> SweepReport {
        let pairs: Vec<(&LoopDescriptor, &Scenario)> = loops
            .iter()
            .flat_map(|descriptor| scenarios.iter().map(move |scenario| (descriptor, scenario)))
            .collect();

        let rows: Vec<SweepRow> = pairs
            .par_iter()
            .map(|&(descriptor, scenario)| {
                let planner = VectorizationPlanner::for_scenario(scenario).with_narrowing(allow_narrowing);
                SweepRow {
                    scenario: scenario.name.clone(),
                    descriptor: *descriptor,
                    candidate_width: planner.candidate_width(descriptor),
                    decision: planner.plan(descriptor),
                }
            })
            .collect();

        let report = SweepReport::from_rows(rows);
        info!(
            "スイープ完了: {} 件 (ベクトル化 {}, 循環依存 {}, 幅なし {}, 範囲未検査 {})",
            report.rows.len(),
            report.vectorized,
            report.cyclic,
            report.no_width,
            report.unverified
        );
        report
    }
}

/// スイープの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepRow {
    /// シナリオ名
    pub scenario: String,
    /// 対象ループ
    pub descriptor: LoopDescriptor,
    /// 解決されたベクトル幅（バイト、0はスカラーのみ）
    pub candidate_width: u32,
    /// 判定
    pub decision: Decision,
}

/// スイープ結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// 全行
    pub rows: Vec<SweepRow>,
    /// ベクトル化された件数
    pub vectorized: usize,
    /// 循環依存で拒否された件数
    pub cyclic: usize,
    /// ベクトル幅がなく拒否された件数
    pub no_width: usize,
    /// 範囲未検査で拒否された件数
    pub unverified: usize,
}

impl SweepReport {
    fn from_rows(rows: Vec<SweepRow>) -> Self {
        let mut report = SweepReport::default();
        for row in &rows {
            match row.decision {
                Decision::CanVectorize { .. } => report.vectorized += 1,
                Decision::CannotVectorize(RejectReason::CyclicDependency { .. }) => report.cyclic += 1,
                Decision::CannotVectorize(RejectReason::NoSuitableVectorWidth) => report.no_width += 1,
                Decision::CannotVectorize(RejectReason::UnverifiedBounds) => report.unverified += 1,
            }
        }
        report.rows = rows;
        report
    }

    /// シナリオ名とループで行を検索
    pub fn find(&self, scenario: &str, descriptor: &LoopDescriptor) -> Option<&SweepRow> {
        self.rows
            .iter()
            .find(|row| row.scenario == scenario && row.descriptor == *descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::target::TargetFeature;
    use crate::middleend::ir::ElementKind;

    fn avx512_planner(max_vector_size: u32) -> VectorizationPlanner {
        VectorizationPlanner::new(
            FeatureProfile::from_features([TargetFeature::Avx512F, TargetFeature::Avx512Bw]),
            max_vector_size,
        )
    }

    #[test]
    fn test_cyclic_rejected() {
        let planner = avx512_planner(16);
        let decision = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 2));
        assert_eq!(
            decision,
            Decision::CannotVectorize(RejectReason::CyclicDependency {
                byte_offset: 8,
                width_bytes: 16
            })
        );
    }

    #[test]
    fn test_vectorized_at_threshold() {
        let planner = avx512_planner(8);
        let decision = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 2));
        assert_eq!(decision, Decision::CanVectorize { width_bytes: 8, elements_per_vector: 2 });
    }

    #[test]
    fn test_narrowing() {
        let planner = avx512_planner(64).with_narrowing(true);
        // double, +4 -> 32バイト: 64では循環、32まで縮める
        let decision = planner.plan(&LoopDescriptor::new(ElementKind::Float64, 4));
        assert_eq!(decision, Decision::CanVectorize { width_bytes: 32, elements_per_vector: 4 });

        // int32, +1 -> 4バイト: 2要素を保てないのでスカラー
        let decision = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 1));
        assert!(matches!(
            decision,
            Decision::CannotVectorize(RejectReason::CyclicDependency { width_bytes: 64, .. })
        ));
    }

    #[test]
    fn test_unverified_bounds() {
        let planner = avx512_planner(64);
        let descriptor = LoopDescriptor::new(ElementKind::Int8, 0).with_bounds_valid(false);
        assert_eq!(
            planner.plan(&descriptor),
            Decision::CannotVectorize(RejectReason::UnverifiedBounds)
        );
    }

    #[test]
    fn test_remarks_are_recorded() {
        let planner = avx512_planner(64);
        let mut emitter = DiagnosticEmitter::new();
        planner.plan_with_remarks(&LoopDescriptor::new(ElementKind::Int32, -1), &mut emitter);
        planner.plan_with_remarks(&LoopDescriptor::new(ElementKind::Int32, 1), &mut emitter);

        let codes: Vec<_> = emitter
            .get_diagnostics()
            .iter()
            .map(|d| d.code.clone().unwrap_or_default())
            .collect();
        assert_eq!(codes, vec!["V0001", "V0102"]);
    }

    #[test]
    fn test_reject_reason_accessor() {
        let planner = avx512_planner(64);
        let cyclic = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 1));
        assert_eq!(cyclic.reject_reason().map(|r| r.code()), Some("V0102"));
        assert_eq!(cyclic.width_bytes(), None);

        let vectorized = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 0));
        assert_eq!(vectorized.reject_reason(), None);
        assert_eq!(vectorized.elements_per_vector(), Some(16));
    }

    #[test]
    fn test_unverified_bounds_remark_is_warning() {
        let planner = avx512_planner(64);
        let mut emitter = DiagnosticEmitter::new();
        planner.plan_with_remarks(&LoopDescriptor::new(ElementKind::Int32, -1), &mut emitter);
        assert!(!emitter.has_warnings());

        let descriptor = LoopDescriptor::new(ElementKind::Int32, -1).with_bounds_valid(false);
        planner.plan_with_remarks(&descriptor, &mut emitter);
        assert!(emitter.has_warnings());
        assert_eq!(emitter.count(DiagnosticLevel::Warning), 1);
        assert_eq!(emitter.get_diagnostics()[1].code.as_deref(), Some("V0103"));
    }

    #[test]
    fn test_from_config_rejects_bad_width() {
        let config = VectorizationConfig {
            max_vector_size: 24,
            ..VectorizationConfig::default()
        };
        assert!(VectorizationPlanner::from_config(&config).is_err());
    }

    #[test]
    #[should_panic]
    fn test_non_integral_lanes_panic() {
        Decision::vectorize(12, 8);
    }

    #[test]
    #[should_panic]
    fn test_single_lane_panics() {
        Decision::vectorize(8, 8);
    }
}
