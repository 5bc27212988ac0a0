// ループ解析
//
// ベクトル化判定に必要なループの解析を提供します。

pub mod dependence;

pub use dependence::{has_cyclic_dependency, DependenceDistance, DependenceKind, DependencyAnalyzer};
