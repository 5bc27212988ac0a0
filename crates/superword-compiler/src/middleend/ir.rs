//! # ループ記述子
//!
//! フロントエンドが正規化済みの計数ループをベクトル化判定に渡すための
//! 中間表現です。対象となるループは次の形をしています。
//!
//! ```text
//! for (i = lo; i < hi; i++) { data[i + offset] = f(data[i]); }
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CompilerError, Result};

/// 配列要素のスカラー型
///
/// 依存距離の計算に使うのは `byte_size` だけです。
/// `Uint16` と `Int16` は言語レベルの型付けでのみ区別されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// 8ビット符号付き整数
    Int8,
    /// 16ビット符号なし整数（文字型相当）
    Uint16,
    /// 16ビット符号付き整数
    Int16,
    /// 32ビット符号付き整数
    Int32,
    /// 64ビット符号付き整数
    Int64,
    /// 単精度浮動小数点
    Float32,
    /// 倍精度浮動小数点
    Float64,
}

impl ElementKind {
    /// すべての要素型
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Int8,
        ElementKind::Uint16,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    /// 要素のバイトサイズ
    pub const fn byte_size(self) -> u32 {
        match self {
            ElementKind::Int8 => 1,
            ElementKind::Uint16 | ElementKind::Int16 => 2,
            ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::Int64 | ElementKind::Float64 => 8,
        }
    }

    /// 浮動小数点型かどうか
    pub const fn is_floating_point(self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }

    /// 文字列表現の取得
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Int8 => "int8",
            ElementKind::Uint16 => "uint16",
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
        }
    }
}

impl FromStr for ElementKind {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "int8" | "i8" | "byte" => Ok(ElementKind::Int8),
            "uint16" | "u16" | "char" => Ok(ElementKind::Uint16),
            "int16" | "i16" | "short" => Ok(ElementKind::Int16),
            "int32" | "i32" | "int" => Ok(ElementKind::Int32),
            "int64" | "i64" | "long" => Ok(ElementKind::Int64),
            "float32" | "f32" | "float" => Ok(ElementKind::Float32),
            "float64" | "f64" | "double" => Ok(ElementKind::Float64),
            _ => Err(CompilerError::UnknownElementKind(s.to_string())),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 要素型に対応するRustのスカラー型
pub trait NativeElement: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// 対応する要素型
    const KIND: ElementKind;
}

macro_rules! impl_native_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl NativeElement for $ty {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

impl_native_element! {
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

/// 正規化済みの計数ループ
///
/// `loop_bounds_valid` はフロントエンドがオフセットの向きに応じて
/// ループ範囲を検査済みであることを示します。判定側はこれを再導出しません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LoopDescriptor {
    /// 配列要素の型
    pub element_kind: ElementKind,
    /// ストア添字 - ロード添字（要素単位）
    pub offset_elements: i32,
    /// ループ範囲が検査済みかどうか
    pub loop_bounds_valid: bool,
}

impl LoopDescriptor {
    /// 範囲検査済みのループ記述子を作成
    pub fn new(element_kind: ElementKind, offset_elements: i32) -> Self {
        Self {
            element_kind,
            offset_elements,
            loop_bounds_valid: true,
        }
    }

    /// Rustのスカラー型から範囲検査済みのループ記述子を作成
    pub fn of<T: NativeElement>(offset_elements: i32) -> Self {
        Self::new(T::KIND, offset_elements)
    }

    /// 範囲検査の状態を設定
    pub fn with_bounds_valid(mut self, valid: bool) -> Self {
        self.loop_bounds_valid = valid;
        self
    }

    /// 要素のバイトサイズ
    pub fn element_byte_size(&self) -> u32 {
        self.element_kind.byte_size()
    }

    /// ストアとロードの距離（バイト単位）
    pub fn byte_offset(&self) -> i64 {
        i64::from(self.offset_elements) * i64::from(self.element_byte_size())
    }

    /// 長さ `len` の配列で読み書きが範囲内に収まるループ範囲
    ///
    /// 正のオフセットでは上限を、負のオフセットでは下限をずらします。
    /// 範囲が空になる場合は `None`。
    pub fn bounded_range(&self, len: usize) -> Option<Range<usize>> {
        let shift = self.offset_elements.unsigned_abs() as usize;
        if shift >= len {
            return None;
        }
        if self.offset_elements >= 0 {
            Some(0..len - shift)
        } else {
            Some(shift..len)
        }
    }
}

impl fmt::Display for LoopDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[i {:+}] = f({}[i])", self.element_kind, self.offset_elements, self.element_kind)
    }
}
