//! 통계 및 유틸리티 모듈
//!
//! 병합/저장 집계를 모아 요약을 출력합니다.

use colored::Colorize;
use std::time::{Duration, Instant};

use crate::merger::MergeSummary;
use crate::store::StoreSummary;

/// 처리 통계 구조체
#[derive(Debug)]
pub struct Statistics {
    /// 병합 단계 집계
    pub merge: MergeSummary,
    /// 저장 단계 집계
    pub store: StoreSummary,
    /// 병합된 모듈 수
    pub modules: usize,
    /// 처리 시작 시간
    start_time: Instant,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self {
            merge: MergeSummary::default(),
            store: StoreSummary::default(),
            modules: 0,
            start_time: Instant::now(),
        }
    }

    /// 병합 집계 기록
    pub fn record_merge(&mut self, summary: MergeSummary, modules: usize) {
        self.merge = summary;
        self.modules = modules;
    }

    /// 저장 집계 기록
    pub fn record_store(&mut self, summary: StoreSummary) {
        self.store = summary;
    }

    /// 건너뛴 항목 총합 (파일 + 레코드 + 모듈)
    pub fn total_skipped(&self) -> usize {
        self.merge.files_skipped + self.merge.records_skipped + self.store.modules_skipped
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 레코드 채택률 (%)
    pub fn acceptance_rate(&self) -> Option<f64> {
        let total = self.merge.records_accepted + self.merge.records_skipped;
        if total == 0 {
            None
        } else {
            Some(self.merge.records_accepted as f64 / total as f64 * 100.0)
        }
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!("  {} 폴더:         {}", "📁".bright_cyan(), self.merge.folders);
        println!(
            "  {} 읽은 파일:    {}",
            "📄".bright_cyan(),
            self.merge.files_read.to_string().green()
        );
        print_count("건너뛴 파일:", self.merge.files_skipped);
        println!(
            "  {} 병합 레코드:  {}",
            "✅".bright_green(),
            self.merge.records_accepted.to_string().green()
        );
        print_count("제외 레코드:", self.merge.records_skipped);
        println!("  {} 모듈:         {}", "🧩".bright_white(), self.modules);
        println!(
            "  {} 저장 모듈:    {}",
            "💾".bright_green(),
            self.store.modules_written.to_string().green()
        );
        print_count("제외 모듈:  ", self.store.modules_skipped);
        for (module, reason) in &self.store.failures {
            println!("      {} {}: {}", "•".red(), module, reason.dimmed());
        }
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.store.bytes_written)
        );

        print_count("건너뛴 총계:", self.total_skipped());

        if let Some(rate) = self.acceptance_rate() {
            println!("  {} 채택률:       {:.1}%", "📈".bright_white(), rate);
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

fn print_count(label: &str, count: usize) {
    if count > 0 {
        println!("  {} {}  {}", "❌".bright_red(), label, count.to_string().red());
    } else {
        println!("  {} {}  {}", "✅".bright_green(), label, "0".green());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use jmerge::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
    }

    #[test]
    fn test_statistics_totals() {
        let mut stats = Statistics::new();
        assert_eq!(stats.acceptance_rate(), None);

        stats.record_merge(
            MergeSummary {
                folders: 2,
                files_read: 3,
                files_skipped: 1,
                records_accepted: 3,
                records_skipped: 1,
            },
            2,
        );
        stats.record_store(StoreSummary {
            modules_written: 1,
            modules_skipped: 1,
            bytes_written: 128,
            failures: vec![("deep".to_string(), "중첩 깊이 제한(64) 초과".to_string())],
        });

        assert_eq!(stats.total_skipped(), 3);
        assert_eq!(stats.acceptance_rate(), Some(75.0));
    }
}
