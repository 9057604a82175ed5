//! 調整結果の表示

use colored::Colorize;
use tpufleet_cloud::{ActionType, Assessment, FleetPhase, ReconcileReport, SyncReport};
use tpufleet_core::DesiredFleetSpec;

pub fn print_header(spec: &DesiredFleetSpec) {
    println!();
    println!(
        "{}",
        format!(
            "▶ {} ({} × {}, zone: {})",
            spec.generation,
            spec.target_count,
            spec.accelerator_type(),
            spec.zone
        )
        .bold()
    );
}

pub fn print_assessment(assessment: &Assessment) {
    println!(
        "  準拠ノード: {}",
        join_or_none(&assessment.compliant_names()).cyan()
    );
    for violation in &assessment.invariants.violations {
        println!("  {} {}", "⚠".yellow(), violation);
    }
    if !assessment.foreign.is_empty() {
        println!(
            "  {}",
            format!("他世代のノード（対象外）: {}", assessment.foreign.join(", ")).dimmed()
        );
    }
    print_missing(&assessment.missing);
}

fn print_missing(missing: &[u32]) {
    if missing.is_empty() {
        println!("  {} 目標台数を満たしています", "✓".green());
    } else {
        let list: Vec<String> = missing.iter().map(u32::to_string).collect();
        println!("  {} 不足している番号: {}", "✗".red(), list.join(", "));
    }
}

pub fn print_report(report: &ReconcileReport) {
    println!("  準拠ノード: {}", join_or_none(&report.compliant).cyan());
    for violation in &report.violations {
        println!("  {} {}", "⚠".yellow(), violation);
    }

    if let Some(plan) = &report.plan {
        println!("  計画: {}", plan.summary());
        for action in &plan.actions {
            let mark = match action.action_type {
                ActionType::Create => "+".green(),
                ActionType::Blocked => "!".yellow(),
            };
            println!("    {} {}", mark, action.description);
        }
    }

    if let Some(creation) = &report.creation {
        for result in &creation.succeeded {
            println!(
                "  {} {} を作成しました（{}回目で成功）",
                "✓".green(),
                result.node_name.cyan(),
                result.attempts
            );
        }
        for result in &creation.failed {
            println!(
                "  {} {}: {}",
                "✗".red(),
                result.node_name.cyan(),
                result.error.as_deref().unwrap_or("")
            );
        }
    }

    if let Some(sync) = &report.sync {
        print_sync(sync);
    }
    if let Some(error) = &report.sync_error {
        println!("  {} hosts同期に失敗しました: {}", "⚠".yellow(), error);
    }

    match report.phase {
        FleetPhase::Done => {
            if report.missing.is_empty() {
                println!("  {}", "✓ 完了".green().bold());
            } else {
                print_missing(&report.missing);
                println!(
                    "  {}",
                    "作成直後のノードはREADYになってから再実行で取り込まれます".dimmed()
                );
            }
        }
        FleetPhase::Satisfied => println!("  {}", "✓ 変更なし".green()),
        FleetPhase::Reported => {
            print_missing(&report.missing);
            println!(
                "  {}",
                "自動作成が無効です（--create-missing で作成できます）".yellow()
            );
        }
        FleetPhase::Escalated => {
            println!(
                "  {}",
                "✗ ノード作成が上限に達しました。クォータやゾーンの空き状況を確認してください"
                    .red()
                    .bold()
            );
        }
        other => println!("  状態: {}", other),
    }
}

pub fn print_sync(sync: &SyncReport) {
    for entry in &sync.entries {
        println!(
            "  {} {} → {}",
            "⇄".blue(),
            entry.short_name.cyan(),
            entry.external_ip
        );
    }
    if !sync.unresolved.is_empty() {
        println!(
            "  {} 外部IPが取得できませんでした: {}",
            "⚠".yellow(),
            sync.unresolved.join(", ")
        );
    }
    for failure in &sync.failures {
        println!("  {} {}", "⚠".yellow(), failure);
    }
}

pub fn print_error(spec: &DesiredFleetSpec, error: &dyn std::fmt::Display) {
    eprintln!(
        "  {} {} の処理に失敗しました: {}",
        "Error:".red().bold(),
        spec.generation,
        error
    );
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(なし)".to_string()
    } else {
        names.join(", ")
    }
}
