// superword Compiler Library
// SLPベクトル化判定のライブラリ

//! # superword
//!
//! 自己参照オフセット配列ループ
//!
//! ```text
//! for (i = lo; i < hi; i++) { data[i + offset] = f(data[i]); }
//! ```
//!
//! について、SIMDベクトルにまとめても逐次実行と同じ結果になるかを判定し、
//! 使うベクトル幅を決めるライブラリです。
//!
//! 判定は入力だけから決まる純粋関数で、ベクトル化できないことはエラーではなく
//! `Decision::CannotVectorize` として返ります。
//!
//! ```
//! use superword_compiler::{Decision, ElementKind, FeatureProfile, LoopDescriptor, VectorizationPlanner};
//!
//! let profile: FeatureProfile = "sse4.1,avx,avx2".parse().unwrap();
//! let planner = VectorizationPlanner::new(profile, 8);
//! let decision = planner.plan(&LoopDescriptor::new(ElementKind::Int32, 2));
//! assert_eq!(decision, Decision::CanVectorize { width_bytes: 8, elements_per_vector: 2 });
//! ```

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod middleend;

// 再エクスポート
pub use self::backend::{EmittedLoop, FeatureProfile, LoopEmitter, Scenario, TargetFeature, VectorWidthResolver};
pub use self::config::VectorizationConfig;
pub use self::diagnostics::{Diagnostic, DiagnosticEmitter, DiagnosticLevel};
pub use self::error::{CompilerError, ErrorKind, Result};
pub use self::middleend::analysis::{has_cyclic_dependency, DependencyAnalyzer};
pub use self::middleend::ir::{ElementKind, LoopDescriptor, NativeElement};
pub use self::middleend::optimization::{Decision, RejectReason, SweepReport, SweepRow, VectorizationPlanner};

/// ライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 扱うベクトル幅の上限（バイト）
pub const MAX_VECTOR_WIDTH_BYTES: u32 = 128;
