//! 診断情報モジュール
//!
//! ベクトル化の最適化リマークを管理し、ログへ出力するためのユーティリティを提供します。

use std::fmt;

/// 診断情報のレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    /// 警告
    Warning,
    /// 情報
    Info,
    /// 注意
    Note,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Warning => write!(f, "警告"),
            DiagnosticLevel::Info => write!(f, "情報"),
            DiagnosticLevel::Note => write!(f, "注意"),
        }
    }
}

/// 診断情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// レベル
    pub level: DiagnosticLevel,
    /// メッセージ
    pub message: String,
    /// コード
    pub code: Option<String>,
}

impl Diagnostic {
    /// 新しい診断情報を作成
    pub fn new(level: DiagnosticLevel, message: String) -> Self {
        Self {
            level,
            message,
            code: None,
        }
    }

    /// コードを設定
    pub fn with_code(mut self, code: String) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.level, code, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// 診断情報エミッタ - 診断情報を出力する
#[derive(Debug, Default)]
pub struct DiagnosticEmitter {
    /// 診断情報
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEmitter {
    /// 新しい診断エミッタを作成
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// 診断情報をログに出力
    pub fn emit(&self, diagnostic: &Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Warning => log::warn!("{}", diagnostic),
            DiagnosticLevel::Info => log::info!("{}", diagnostic),
            DiagnosticLevel::Note => log::debug!("{}", diagnostic),
        }
    }

    /// 診断情報を追加
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 診断情報を取得
    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 指定レベルの件数
    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 警告が存在するかどうか
    pub fn has_warnings(&self) -> bool {
        self.count(DiagnosticLevel::Warning) > 0
    }
}
