//! # エラー処理モジュール
//!
//! ベクトル化判定ライブラリの境界（設定ファイル、文字列からの変換）で
//! 発生するエラーを表現します。
//! ベクトル化できないという判定そのものはエラーではなく、
//! `Decision` の値として扱われる点に注意してください。

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 未知の要素型名
    ElementKind,
    /// 未知のCPU機能名
    Feature,
    /// 不正なベクトル幅
    VectorWidth,
    /// 未知のシナリオ名
    Scenario,
    /// 設定エラー
    Config,
    /// I/Oエラー
    IO,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorKind::ElementKind => "要素型エラー",
            ErrorKind::Feature => "CPU機能エラー",
            ErrorKind::VectorWidth => "ベクトル幅エラー",
            ErrorKind::Scenario => "シナリオエラー",
            ErrorKind::Config => "設定エラー",
            ErrorKind::IO => "I/Oエラー",
        };
        write!(f, "{}", message)
    }
}

/// コンパイラのエラー型
#[derive(Error, Debug)]
pub enum CompilerError {
    /// 要素型名を解釈できない
    #[error("未知の要素型: '{0}'")]
    UnknownElementKind(String),

    /// CPU機能名を解釈できない
    #[error("未知のCPU機能: '{0}'")]
    UnknownFeature(String),

    /// ベクトル幅が2のべき乗でない、または範囲外
    #[error("不正なベクトル幅: {0} バイト (2のべき乗かつ {max} 以下である必要があります)", max = crate::MAX_VECTOR_WIDTH_BYTES)]
    InvalidVectorWidth(u32),

    /// シナリオ名がカタログにない
    #[error("未知のシナリオ: '{0}'")]
    UnknownScenario(String),

    /// 設定ファイルの内容が不正
    #[error("設定エラー ({}): {message}", display_path(.path))]
    Config {
        /// 設定ファイルのパス
        path: Option<PathBuf>,
        /// エラーメッセージ
        message: String,
    },

    /// I/Oエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] io::Error),

    /// TOMLの構文エラー
    #[error("TOML解析エラー: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl CompilerError {
    /// エラーの種類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilerError::UnknownElementKind(_) => ErrorKind::ElementKind,
            CompilerError::UnknownFeature(_) => ErrorKind::Feature,
            CompilerError::InvalidVectorWidth(_) => ErrorKind::VectorWidth,
            CompilerError::UnknownScenario(_) => ErrorKind::Scenario,
            CompilerError::Config { .. } | CompilerError::TomlParse(_) => ErrorKind::Config,
            CompilerError::Io(_) => ErrorKind::IO,
        }
    }

    /// 設定エラーを作成
    pub fn config(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        CompilerError::Config {
            path,
            message: message.into(),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<メモリ>".to_string(),
    }
}

/// ライブラリ全体で使う結果型
pub type Result<T> = std::result::Result<T, CompilerError>;
