//! # ループ生成モジュール
//!
//! ベクトル化の判定を受け取り、ストリップマイニングしたベクトルループか
//! 元のスカラーループの形を決めます。
//! 実際の命令生成は行わず、SIMDのメモリモデル（各ベクトルグループは
//! すべてのロードをストアより先に行う）に従ってスライス上で実行できます。

use std::fmt;
use std::ops::Range;

use log::debug;

use crate::middleend::ir::LoopDescriptor;
use crate::middleend::optimization::vectorization::{Decision, RejectReason};

/// 生成されたループの形
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmittedLoop {
    /// ベクトルループ + スカラーの残り
    Vector {
        /// ストア添字 - ロード添字
        offset_elements: i32,
        /// ベクトル幅（バイト）
        width_bytes: u32,
        /// 1ベクトルあたりの要素数
        lanes: u32,
        /// ループ範囲
        range: Range<usize>,
        /// ベクトルグループの数
        main_iterations: usize,
        /// スカラーで処理する残りの反復数
        tail_iterations: usize,
    },
    /// 元のスカラーループ
    Scalar {
        /// ストア添字 - ロード添字
        offset_elements: i32,
        /// ループ範囲
        range: Range<usize>,
        /// ベクトル化しなかった理由
        reason: RejectReason,
    },
}

/// ループ生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopEmitter;

impl LoopEmitter {
    /// 新しい生成器を作成
    pub fn new() -> Self {
        Self
    }

    /// 判定に従ってループを生成
    pub fn emit(&self, descriptor: &LoopDescriptor, decision: &Decision, range: Range<usize>) -> EmittedLoop {
        let offset_elements = descriptor.offset_elements;
        let emitted = match *decision {
            Decision::CanVectorize { width_bytes, elements_per_vector } => {
                let lanes = elements_per_vector as usize;
                let trip_count = range.len();
                EmittedLoop::Vector {
                    offset_elements,
                    width_bytes,
                    lanes: elements_per_vector,
                    range,
                    main_iterations: trip_count / lanes,
                    tail_iterations: trip_count % lanes,
                }
            }
            Decision::CannotVectorize(reason) => EmittedLoop::Scalar {
                offset_elements,
                range,
                reason,
            },
        };
        debug!("{} -> {}", descriptor, emitted);
        emitted
    }
}

impl EmittedLoop {
    /// ループ範囲
    pub fn range(&self) -> Range<usize> {
        match self {
            EmittedLoop::Vector { range, .. } | EmittedLoop::Scalar { range, .. } => range.clone(),
        }
    }

    /// 元のループの反復回数
    pub fn trip_count(&self) -> usize {
        self.range().len()
    }

    /// ベクトルループかどうか
    pub fn is_vector(&self) -> bool {
        matches!(self, EmittedLoop::Vector { .. })
    }

    /// `data[i + offset] = f(data[i])` を生成したループの形で実行
    pub fn execute<T, F>(&self, data: &mut [T], f: F)
    where
        T: Copy,
        F: Fn(T) -> T,
    {
        match self {
            EmittedLoop::Scalar { offset_elements, range, .. } => {
                execute_scalar(data, range.clone(), *offset_elements, f);
            }
            EmittedLoop::Vector {
                offset_elements,
                lanes,
                range,
                main_iterations,
                ..
            } => {
                let lanes = *lanes as usize;
                let mut group: Vec<T> = Vec::with_capacity(lanes);
                let mut i = range.start;
                for _ in 0..*main_iterations {
                    // グループ内のロードはすべてストアより先
                    group.clear();
                    group.extend(data[i..i + lanes].iter().map(|&x| f(x)));
                    for (lane, value) in group.iter().enumerate() {
                        data[store_index(i + lane, *offset_elements)] = *value;
                    }
                    i += lanes;
                }
                execute_scalar(data, i..range.end, *offset_elements, f);
            }
        }
    }
}

impl fmt::Display for EmittedLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmittedLoop::Vector {
                width_bytes,
                lanes,
                range,
                main_iterations,
                tail_iterations,
                ..
            } => write!(
                f,
                "vector loop [{}..{}): {} x {}B ({} lanes) + {} scalar",
                range.start, range.end, main_iterations, width_bytes, lanes, tail_iterations
            ),
            EmittedLoop::Scalar { range, .. } => {
                write!(f, "scalar loop [{}..{})", range.start, range.end)
            }
        }
    }
}

/// スカラーの逐次実行
pub fn execute_scalar<T, F>(data: &mut [T], range: Range<usize>, offset_elements: i32, f: F)
where
    T: Copy,
    F: Fn(T) -> T,
{
    for i in range {
        data[store_index(i, offset_elements)] = f(data[i]);
    }
}

fn store_index(i: usize, offset_elements: i32) -> usize {
    let index = i as i64 + i64::from(offset_elements);
    assert!(index >= 0, "ストア添字が負になりました: {}", index);
    index as usize
}
