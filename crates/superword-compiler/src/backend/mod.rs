//! # バックエンド
//!
//! ターゲットの機能プロファイル、シナリオ、ループ生成を扱います。

pub mod emitter;
pub mod scenario;
pub mod target;

pub use emitter::{EmittedLoop, LoopEmitter};
pub use scenario::Scenario;
pub use target::{FeatureProfile, TargetFeature, VectorWidthResolver};
