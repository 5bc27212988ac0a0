/*
 * superword CLI - 出力モジュール
 *
 * 判定結果を端末向けの表形式で表示します。
 */

use colored::{ColoredString, Colorize};
use superword_compiler::{
    Decision, Diagnostic, DiagnosticLevel, ElementKind, EmittedLoop, LoopDescriptor, RejectReason,
    Scenario, SweepReport, VectorizationPlanner,
};

/// 判定を色付きで表示
fn colorize_decision(decision: &Decision) -> ColoredString {
    let text = decision.to_string();
    match decision.reject_reason() {
        None => text.green(),
        Some(RejectReason::UnverifiedBounds) => text.red(),
        Some(_) => text.yellow(),
    }
}

fn colorize_remark(remark: &Diagnostic) -> ColoredString {
    let text = remark.to_string();
    match remark.level {
        DiagnosticLevel::Warning => text.yellow(),
        DiagnosticLevel::Info => text.normal(),
        DiagnosticLevel::Note => text.cyan(),
    }
}

/// 単一ループの判定結果を表示
pub fn print_plan(
    descriptor: &LoopDescriptor,
    planner: &VectorizationPlanner,
    decision: &Decision,
    remarks: &[Diagnostic],
    emitted: Option<&EmittedLoop>,
) {
    println!("{:<10}{}", "loop:".bold(), descriptor);
    println!(
        "{:<10}{} (max {}B)",
        "target:".bold(),
        planner.profile(),
        planner.max_vector_size()
    );
    println!("{:<10}{}B", "width:".bold(), planner.candidate_width(descriptor));
    println!("{:<10}{}", "decision:".bold(), colorize_decision(decision));
    for remark in remarks {
        println!("{:<10}{}", "remark:".bold(), colorize_remark(remark));
    }
    if let Some(emitted) = emitted {
        println!("{:<10}{}", "emitted:".bold(), emitted);
    }
}

/// スイープ結果を表形式で表示
pub fn print_sweep(report: &SweepReport) {
    let scenario_width = report
        .rows
        .iter()
        .map(|row| row.scenario.len())
        .max()
        .unwrap_or(0)
        .max("scenario".len());
    let loop_width = report
        .rows
        .iter()
        .map(|row| row.descriptor.to_string().len())
        .max()
        .unwrap_or(0)
        .max("loop".len());

    println!(
        "{:<sw$}  {:<lw$}  {:>6}  {}",
        "scenario".bold(),
        "loop".bold(),
        "width".bold(),
        "decision".bold(),
        sw = scenario_width,
        lw = loop_width
    );
    for row in &report.rows {
        println!(
            "{:<sw$}  {:<lw$}  {:>6}  {}",
            row.scenario,
            row.descriptor.to_string(),
            row.candidate_width,
            colorize_decision(&row.decision),
            sw = scenario_width,
            lw = loop_width
        );
    }

    println!();
    println!(
        "{} {} 件: ベクトル化 {}, 循環依存 {}, 幅なし {}, 範囲未検査 {}",
        "合計".bold(),
        report.rows.len(),
        report.vectorized.to_string().green(),
        report.cyclic.to_string().yellow(),
        report.no_width,
        report.unverified
    );
}

/// シナリオ一覧と要素型ごとのベクトル幅を表示
pub fn print_scenarios(scenarios: &[Scenario]) {
    let name_width = scenarios
        .iter()
        .map(|scenario| scenario.name.len())
        .max()
        .unwrap_or(0)
        .max("name".len());
    let feature_width = scenarios
        .iter()
        .map(|scenario| scenario.profile.to_string().len())
        .max()
        .unwrap_or(0)
        .max("features".len());

    let mut header = format!(
        "{:<nw$}  {:<fw$}  {:>4}",
        "name",
        "features",
        "max",
        nw = name_width,
        fw = feature_width
    );
    for kind in ElementKind::ALL {
        header.push_str(&format!("  {:>7}", kind.as_str()));
    }
    println!("{}", header.bold());

    for scenario in scenarios {
        let mut line = format!(
            "{:<nw$}  {:<fw$}  {:>4}",
            scenario.name,
            scenario.profile.to_string(),
            scenario.max_vector_size,
            nw = name_width,
            fw = feature_width
        );
        for kind in ElementKind::ALL {
            line.push_str(&format!("  {:>7}", scenario.vector_width(kind)));
        }
        println!("{}", line);
    }
}
