//! jmerge - MODULE JSON MERGER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jmerge::{
    cli::Args,
    merger::{MergeEvent, MergeResult, Merger},
    pattern::PatternMatcher,
    stats::Statistics,
    store::{store, StoreEvent},
    OsFileSystem,
};

fn main() -> Result<()> {
    let args = Args::parse();
    run(&args)
}

/// 전체 실행 흐름
///
/// 입력 루트가 없으면 출력 폴더를 만들기 전에 에러를 반환하며, 종료 코드는 0이 아닙니다.
fn run(args: &Args) -> Result<()> {
    let mut stats = Statistics::new();

    // 모듈 필터 초기화
    let pattern_matcher = PatternMatcher::new(args.pattern.clone())?;

    // 헤더 출력
    print_header(args, &pattern_matcher);

    let fs = OsFileSystem::new();
    let merger = Merger::new(&fs).with_matcher(pattern_matcher);

    // 입력 루트 확인 및 폴더 목록
    let folders = merger.input_folders(&args.input)?;

    println!(
        "  {} 발견된 폴더 수: {}",
        "📋".bright_white(),
        folders.len().to_string().bright_green()
    );

    // 병합
    let mut issues: Vec<String> = Vec::new();
    let outcome = merger.merge(&folders, |event| report_merge_event(event, args, &mut issues));
    stats.record_merge(outcome.summary, outcome.result.len());

    if args.verbose {
        println!(
            "\n  {} 병합된 모듈: {}",
            "🧩".bright_white(),
            outcome.result.module_names().join(", ")
        );
    }

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&outcome.result);
        write_issues(args, &issues)?;
        return Ok(());
    }

    // 저장
    run_store(args, &fs, &outcome.result, &mut stats, &mut issues)?;

    // 로그 파일 작성
    write_issues(args, &issues)?;

    // 통계 출력
    stats.print_summary();

    println!("\n{} 저장 완료: {:?}\n", "✅".bright_green(), args.output);

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args, pattern_matcher: &PatternMatcher) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🧩 MODULE JSON MERGER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📁".bright_green(), args.output);
    println!("  {} 형식: {}", "⚙️".bright_yellow(), args.format);

    if pattern_matcher.has_pattern() {
        if let Some(ref pattern) = args.pattern {
            println!("  {} 모듈 필터: {}", "🔍".bright_magenta(), pattern);
        }
    }

    if args.quote {
        println!("  {} {}", "✨".bright_magenta(), "CSV 인용 처리".magenta());
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 저장 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 병합 이벤트 출력
fn report_merge_event(event: &MergeEvent, args: &Args, issues: &mut Vec<String>) {
    match event {
        MergeEvent::FolderStarted { .. } => {
            println!("\n{} {}", "📂".bright_cyan(), event.to_string().bright_cyan());
        }
        MergeEvent::ModuleStarted { .. } => {
            if args.verbose {
                println!("  {} {}", "•".bright_white(), event);
            }
        }
        MergeEvent::RecordSkipped { .. } => {
            println!("  {} {}", "⚠️".bright_yellow(), event.to_string().yellow());
            issues.push(event.to_string());
        }
        MergeEvent::FolderSkipped { .. } | MergeEvent::FileSkipped { .. } => {
            println!("  {} {}", "❌".bright_red(), event.to_string().red());
            issues.push(event.to_string());
        }
    }
}

/// 드라이런 출력
fn print_dry_run(merged: &MergeResult) {
    println!("\n{}", "📋 병합 예정 모듈 목록:".bright_cyan());
    for (i, (module, records)) in merged.iter().enumerate() {
        println!("  {}. {} ({} 레코드)", i + 1, module, records.len());
    }
    println!(
        "\n{} 총 {} 개의 모듈, {} 개의 레코드가 저장될 예정입니다.",
        "ℹ️".bright_blue(),
        merged.len().to_string().bright_green(),
        merged.total_records().to_string().bright_green()
    );
}

/// 저장 단계 실행
fn run_store(
    args: &Args,
    fs: &OsFileSystem,
    merged: &MergeResult,
    stats: &mut Statistics,
    issues: &mut Vec<String>,
) -> Result<()> {
    println!(
        "\n{} {:?}",
        "💾 병합 파일 저장 중:".bright_cyan(),
        args.output
    );

    let pb = create_progress_bar(merged.len())?;
    let options = args.store_options();

    let summary = store(fs, merged, &args.output, &options, |event| {
        pb.inc(1);
        match event {
            StoreEvent::ModuleWritten { .. } => {
                if args.verbose {
                    pb.println(format!("  {} {}", "✓".green(), event));
                }
            }
            StoreEvent::ModuleSkipped { .. } => {
                pb.println(format!("  {} {}", "❌".bright_red(), event.to_string().red()));
            }
        }
    })
    .with_context(|| format!("출력 폴더를 준비할 수 없습니다: {:?}", args.output))?;

    pb.finish_with_message("완료!");
    issues.extend(
        summary
            .failures
            .iter()
            .map(|(module, reason)| format!("모듈 {} 건너뜀: {}", module, reason)),
    );
    stats.record_store(summary);

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("█▓▒░"),
    );
    Ok(pb)
}

/// 로그 옵션이 있으면 에러 로그 작성
fn write_issues(args: &Args, issues: &[String]) -> Result<()> {
    match args.log {
        Some(ref log_path) => write_error_log(log_path, issues),
        None => Ok(()),
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, issues: &[String]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "jmerge 에러 로그")?;
    writeln!(log_file, "생성 시각 (Unix 초): {}", unix_seconds())?;
    writeln!(log_file, "총 항목 수: {}", issues.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for issue in issues {
        writeln!(log_file, "{}", issue)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 로그 헤더용 Unix 초
fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmerge::MergerError;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    #[test]
    fn test_write_error_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("errors.log");
        let issues = vec!["모듈 bp 건너뜀".to_string()];

        write_error_log(&log_path, &issues).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("총 항목 수: 1"));
        assert!(content.contains("모듈 bp 건너뜀"));
    }

    #[test]
    fn test_missing_input_root_aborts_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("missing");
        let output = temp_dir.path().join("merged");
        let args = Args::try_parse_from([
            OsStr::new("jmerge"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("csv"),
        ])
        .unwrap();

        let err = run(&args).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MergerError>(),
            Some(MergerError::InputNotFound { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_writes_modules() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        std::fs::create_dir_all(input.join("u1")).unwrap();
        std::fs::write(
            input.join("u1").join("m.json"),
            r#"[{"userId": "u1", "vitals": {"hr": 70}}]"#,
        )
        .unwrap();
        let output = temp_dir.path().join("merged");
        let args = Args::try_parse_from([
            OsStr::new("jmerge"),
            input.as_os_str(),
            output.as_os_str(),
            OsStr::new("CSV"),
        ])
        .unwrap();

        run(&args).unwrap();

        assert_eq!(
            std::fs::read_to_string(output.join("m.csv")).unwrap(),
            "userId;vitals.hr\nu1;70"
        );
    }

    #[test]
    fn test_report_merge_event_collects_skips() {
        let args = Args::try_parse_from(["jmerge", "in", "out"]).unwrap();
        let mut issues = Vec::new();

        report_merge_event(
            &MergeEvent::FolderStarted {
                folder: "in/u1".into(),
            },
            &args,
            &mut issues,
        );
        report_merge_event(
            &MergeEvent::RecordSkipped {
                module: "bp".to_string(),
                file: "in/u1/bp.json".into(),
                index: 0,
            },
            &args,
            &mut issues,
        );

        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("bp"));
    }
}
