use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(explicit: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (path, fleet) = match utils::load_fleet(explicit) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&fleet)?);
        return Ok(());
    }

    println!("設定ファイル: {}", path.display().to_string().cyan());
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();

    let general = &fleet.general;
    println!("全体設定:");
    println!("  create_missing: {}", general.create_missing);
    println!("  pt_version: {}", general.pt_version);
    if !general.extension.is_empty() {
        println!("  extension: {}", general.extension);
    }
    if let Some(project) = &general.project {
        println!("  project: {}", project);
    }
    println!(
        "  作成リトライ: 最大{}回、{}ms間隔",
        general.create_max_attempts, general.create_retry_delay_ms
    );

    println!();
    let specs: Vec<_> = fleet.requested().collect();
    println!("要求された世代: {}個", specs.len());
    for spec in specs {
        println!(
            "  - {} ({} × {}, zone: {}, version: {})",
            spec.generation.to_string().cyan(),
            spec.target_count,
            spec.accelerator_type(),
            spec.zone,
            spec.runtime_version_tag()
        );
    }

    Ok(())
}
