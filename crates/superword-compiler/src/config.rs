// ベクトル化の設定管理を行うモジュール
// ベクトル幅の上限や有効なCPU機能、スイープ用のシナリオをTOMLから読み込みます

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::backend::scenario::Scenario;
use crate::backend::target::FeatureProfile;
use crate::error::{CompilerError, Result};
use crate::MAX_VECTOR_WIDTH_BYTES;

/// ベクトル幅上限のデフォルト（バイト）
pub const DEFAULT_MAX_VECTOR_SIZE: u32 = 64;

fn default_max_vector_size() -> u32 {
    DEFAULT_MAX_VECTOR_SIZE
}

/// ベクトル化の設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VectorizationConfig {
    /// ベクトル幅の上限（バイト）
    pub max_vector_size: u32,

    /// 循環依存のとき幅を狭めて再試行するか
    pub allow_narrowing: bool,

    /// 有効なCPU機能
    pub features: FeatureProfile,

    /// スイープ用のシナリオ（空ならカタログを使用）
    pub scenarios: Vec<ScenarioConfig>,
}

impl Default for VectorizationConfig {
    fn default() -> Self {
        Self {
            max_vector_size: DEFAULT_MAX_VECTOR_SIZE,
            allow_narrowing: false,
            features: FeatureProfile::new(),
            scenarios: Vec::new(),
        }
    }
}

/// 設定ファイル上のシナリオ
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// シナリオ名
    pub name: String,

    /// 有効なCPU機能
    #[serde(default)]
    pub features: FeatureProfile,

    /// ベクトル幅の上限（バイト）
    #[serde(default = "default_max_vector_size")]
    pub max_vector_size: u32,
}

impl ScenarioConfig {
    /// シナリオに変換
    pub fn to_scenario(&self) -> Scenario {
        Scenario::new(self.name.clone(), self.features.clone(), self.max_vector_size)
    }
}

impl VectorizationConfig {
    /// 設定ファイルを読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate().map_err(|e| match e {
            CompilerError::Config { message, .. } => CompilerError::config(Some(path.to_path_buf()), message),
            other => other,
        })?;
        log::debug!("設定ファイルを読み込みました: {}", path.display());
        Ok(config)
    }

    /// TOML文字列から設定を読み込む
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定内容を検証
    pub fn validate(&self) -> Result<()> {
        validate_vector_width(self.max_vector_size)?;

        let mut names = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.name.trim().is_empty() {
                return Err(CompilerError::config(None, "シナリオ名が空です"));
            }
            if !names.insert(scenario.name.as_str()) {
                return Err(CompilerError::config(
                    None,
                    format!("シナリオ名が重複しています: {}", scenario.name),
                ));
            }
            validate_vector_width(scenario.max_vector_size)?;
        }
        Ok(())
    }

    /// スイープに使うシナリオ一覧
    pub fn scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            return Scenario::catalog();
        }
        self.scenarios.iter().map(ScenarioConfig::to_scenario).collect()
    }
}

/// ベクトル幅が2のべき乗かつ上限以下であることを確認
pub fn validate_vector_width(width: u32) -> Result<()> {
    if width.is_power_of_two() && width <= MAX_VECTOR_WIDTH_BYTES {
        Ok(())
    } else {
        Err(CompilerError::InvalidVectorWidth(width))
    }
}
