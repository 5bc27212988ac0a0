// 最適化モジュール
//
// ループに対する最適化パスを提供します。
// 現在はオフセット配列ループのベクトル化計画のみを扱います。

pub mod vectorization;

pub use vectorization::{Decision, RejectReason, SweepReport, SweepRow, VectorizationPlanner};
