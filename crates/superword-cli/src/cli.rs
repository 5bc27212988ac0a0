/*
 * superword CLI - コマンドライン引数処理モジュール
 *
 * コマンドライン引数と設定ファイルを組み合わせて、
 * ベクトル化判定ライブラリの呼び出しに変換します。
 */

use std::ops::Range;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use superword_compiler::config::validate_vector_width;
use superword_compiler::{
    CompilerError, DiagnosticEmitter, DiagnosticLevel, ElementKind, FeatureProfile,
    LoopDescriptor, LoopEmitter, VectorizationConfig, VectorizationPlanner, VERSION,
};

use crate::output;

/// スイープで使うデフォルトのオフセット
const DEFAULT_SWEEP_OFFSETS: &[i32] = &[
    0, -1, 1, -2, 2, -3, 3, -4, 4, -7, 7, -8, 8, -15, 15, -16, 16, -31, 31, -32, 32, -63, 63,
    -64, 64,
];

/// 自己参照オフセット配列ループのSLPベクトル化判定ツール
#[derive(Parser)]
#[command(name = "superword")]
#[command(version = VERSION)]
#[command(about = "オフセット配列ループをベクトル化できるかを判定します", long_about = None)]
pub struct Cli {
    /// 詳細なログ出力を有効にする
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 警告以外のログを抑制する
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// カラー表示を無効にする
    #[arg(long, global = true)]
    pub no_color: bool,

    /// ベクトル化設定ファイル（TOML）へのパス
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// サブコマンド
    #[command(subcommand)]
    pub command: Commands,
}

/// サブコマンド
#[derive(Subcommand)]
pub enum Commands {
    /// 1つのループのベクトル化を判定
    Plan(PlanArgs),

    /// ループとシナリオの全組み合わせを判定
    Sweep(SweepArgs),

    /// シナリオの一覧を表示（設定ファイルの指定がなければ標準カタログ）
    Scenarios,
}

/// planサブコマンドの引数
#[derive(Args)]
pub struct PlanArgs {
    /// 配列要素の型 (int8, uint16, int16, int32, int64, float32, float64)
    #[arg(short, long)]
    pub kind: ElementKind,

    /// ストア添字 - ロード添字（要素単位）
    #[arg(short, long, allow_negative_numbers = true)]
    pub offset: i32,

    /// 有効なCPU機能（カンマ区切り）
    #[arg(short, long)]
    pub features: Option<FeatureProfile>,

    /// ベクトル幅の上限（バイト）
    #[arg(short, long, value_name = "BYTES")]
    pub max_vector_size: Option<u32>,

    /// 循環依存のとき幅を狭めて再試行する
    #[arg(long, overrides_with = "no_narrow")]
    pub narrow: bool,

    /// 設定ファイルの allow_narrowing を無視して幅を狭めない
    #[arg(long, overrides_with = "narrow")]
    pub no_narrow: bool,

    /// ループ範囲が検査されていないものとして扱う
    #[arg(long)]
    pub bounds_unverified: bool,

    /// 警告のリマークをエラーとして扱う
    #[arg(short = 'W', long)]
    pub warnings_as_errors: bool,

    /// 生成するループの範囲 (lo..hi)
    #[arg(long, value_parser = parse_range, conflicts_with = "length")]
    pub range: Option<Range<usize>>,

    /// 配列長（オフセットに合わせて範囲を決める）
    #[arg(long)]
    pub length: Option<usize>,
}

/// sweepサブコマンドの引数
#[derive(Args)]
pub struct SweepArgs {
    /// 対象の要素型（カンマ区切り、省略時はすべて）
    #[arg(long, value_delimiter = ',')]
    pub kinds: Vec<ElementKind>,

    /// 対象のオフセット（カンマ区切り）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub offsets: Vec<i32>,

    /// 対象のシナリオ名（カンマ区切り、省略時はすべて）
    #[arg(long, value_delimiter = ',')]
    pub scenarios: Vec<String>,

    /// 循環依存のとき幅を狭めて再試行する
    #[arg(long, overrides_with = "no_narrow")]
    pub narrow: bool,

    /// 設定ファイルの allow_narrowing を無視して幅を狭めない
    #[arg(long, overrides_with = "narrow")]
    pub no_narrow: bool,

    /// 結果をJSONで出力する
    #[arg(long)]
    pub json: bool,
}

/// サブコマンドを実行
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Plan(args) => plan(args, &config),
        Commands::Sweep(args) => sweep(args, &config),
        Commands::Scenarios => {
            output::print_scenarios(&config.scenarios());
            Ok(())
        }
    }
}

/// 設定ファイルを読み込む（指定がなければデフォルト）
fn load_config(cli: &Cli) -> Result<VectorizationConfig> {
    match &cli.config {
        Some(path) => {
            let config = VectorizationConfig::load(path)
                .with_context(|| format!("設定ファイル {} を読み込めませんでした", path.display()))?;
            info!("設定ファイルを使用します: {}", path.display());
            Ok(config)
        }
        None => Ok(VectorizationConfig::default()),
    }
}

/// planコマンドの処理
fn plan(args: &PlanArgs, config: &VectorizationConfig) -> Result<()> {
    let profile = args.features.clone().unwrap_or_else(|| config.features.clone());
    let max_vector_size = args.max_vector_size.unwrap_or(config.max_vector_size);
    validate_vector_width(max_vector_size).context("--max-vector-size が不正です")?;

    let planner = VectorizationPlanner::new(profile, max_vector_size)
        .with_narrowing(narrowing(args.narrow, args.no_narrow, config));
    let descriptor =
        LoopDescriptor::new(args.kind, args.offset).with_bounds_valid(!args.bounds_unverified);
    debug!("判定対象: {}", descriptor);

    let mut remarks = DiagnosticEmitter::new();
    let decision = planner.plan_with_remarks(&descriptor, &mut remarks);

    let range = match (&args.range, args.length) {
        (Some(range), _) => Some(range.clone()),
        (None, Some(length)) => Some(descriptor.bounded_range(length).with_context(|| {
            format!("配列長 {} はオフセット {} に対して短すぎます", length, args.offset)
        })?),
        (None, None) => None,
    };
    let emitted = range.map(|range| LoopEmitter::new().emit(&descriptor, &decision, range));

    output::print_plan(
        &descriptor,
        &planner,
        &decision,
        remarks.get_diagnostics(),
        emitted.as_ref(),
    );

    if args.warnings_as_errors && remarks.has_warnings() {
        bail!(
            "警告のリマークが {} 件あります（--warnings-as-errors）",
            remarks.count(DiagnosticLevel::Warning)
        );
    }
    Ok(())
}

/// sweepコマンドの処理
fn sweep(args: &SweepArgs, config: &VectorizationConfig) -> Result<()> {
    let kinds = if args.kinds.is_empty() {
        ElementKind::ALL.to_vec()
    } else {
        args.kinds.clone()
    };
    let offsets = if args.offsets.is_empty() {
        DEFAULT_SWEEP_OFFSETS.to_vec()
    } else {
        args.offsets.clone()
    };

    let available = config.scenarios();
    let scenarios = if args.scenarios.is_empty() {
        available
    } else {
        args.scenarios
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|scenario| &scenario.name == name)
                    .cloned()
                    .ok_or_else(|| CompilerError::UnknownScenario(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    if scenarios.is_empty() {
        bail!("判定するシナリオがありません");
    }

    let loops: Vec<LoopDescriptor> = kinds
        .iter()
        .flat_map(|&kind| offsets.iter().map(move |&offset| LoopDescriptor::new(kind, offset)))
        .collect();

    let allow_narrowing = narrowing(args.narrow, args.no_narrow, config);
    let report = VectorizationPlanner::sweep(&loops, &scenarios, allow_narrowing);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("JSONへの変換に失敗しました")?;
        println!("{}", json);
    } else {
        output::print_sweep(&report);
    }
    Ok(())
}

/// 幅の縮小を許すか（コマンドラインの指定が設定ファイルより優先）
fn narrowing(narrow: bool, no_narrow: bool, config: &VectorizationConfig) -> bool {
    if narrow {
        true
    } else if no_narrow {
        false
    } else {
        config.allow_narrowing
    }
}

/// `lo..hi` 形式の範囲を解析
fn parse_range(s: &str) -> Result<Range<usize>, String> {
    let (lo, hi) = s
        .split_once("..")
        .ok_or_else(|| format!("範囲は lo..hi の形式で指定してください: '{}'", s))?;
    let lo: usize = lo.trim().parse().map_err(|_| format!("不正な下限: '{}'", lo))?;
    let hi: usize = hi.trim().parse().map_err(|_| format!("不正な上限: '{}'", hi))?;
    if lo > hi {
        return Err(format!("下限 {} が上限 {} を超えています", lo, hi));
    }
    Ok(lo..hi)
}
