/*
 * superword CLI - メインエントリーポイント
 *
 * SLPベクトル化判定ツールのエントリーポイントです。
 * コマンドライン引数の解析とロギングの初期化を行い、処理をcliモジュールに渡します。
 */

use clap::Parser;
use env_logger::Builder;
use log::{debug, LevelFilter};

mod cli;
mod output;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // ロギングの初期化（RUST_LOGが指定されていればそちらを優先）
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    Builder::new().filter_level(level).parse_default_env().init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("superword v{} を起動しています", superword_compiler::VERSION);
    cli::run(&cli)
}
