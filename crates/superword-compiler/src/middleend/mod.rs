// ミドルエンド
//
// ループ記述子、依存解析、ベクトル化計画を提供します。

pub mod ir;
pub mod analysis;
pub mod optimization;
