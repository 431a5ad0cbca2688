//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::csv_export::CsvOptions;
use crate::flatten::DEFAULT_MAX_DEPTH;
use crate::store::StoreOptions;

/// 출력 형식
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// 원본 레코드 배열을 그대로 JSON으로 저장
    #[default]
    Json,
    /// 레코드를 평탄화하여 `;` 구분 CSV로 저장
    Csv,
}

impl OutputFormat {
    /// 출력 파일 확장자
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// jmerge CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "jmerge",
    author = "YourName <your@email.com>",
    version,
    about = "MODULE JSON MERGER - 사용자별 모듈 JSON 파일들을 모듈 단위로 병합하는 CLI 도구",
    long_about = r#"
MODULE JSON MERGER
==================

입력 루트 아래의 각 폴더(보통 사용자별 폴더)에서 모듈 JSON 파일을 읽어
같은 이름의 모듈끼리 하나의 파일로 병합합니다.

특징:
  • userId가 없는 레코드는 기록 후 제외
  • 잘못된 파일은 건너뛰고 나머지를 계속 처리
  • 중첩 JSON을 점 경로 열로 평탄화한 CSV 출력
  • 진행률 표시 및 상세 통계

예제:
  jmerge ./exports ./merged
  jmerge ./exports ./merged csv
  jmerge ./exports ./merged csv --quote --pattern "heart*"
  jmerge ./exports ./merged --dry-run
"#
)]
pub struct Args {
    /// 사용자별 폴더들이 있는 입력 루트 폴더
    pub input: PathBuf,

    /// 병합된 모듈 파일을 쓸 출력 폴더
    pub output: PathBuf,

    /// 출력 형식 (대소문자 무시)
    #[arg(value_enum, ignore_case = true, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// 모듈 파일 이름 패턴 필터 (glob 형식, 예: "heart*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 저장 없이 모듈별 레코드 수만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// CSV 평탄화 최대 중첩 깊이
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// CSV 값에 구분자/줄바꿈이 있으면 따옴표로 감싸기
    #[arg(long)]
    pub quote: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// JSON 출력 보기 좋게 들여쓰기 (기본값: 압축)
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// 인자로부터 저장 옵션 생성
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new()
            .with_format(self.format)
            .with_pretty(self.pretty)
            .with_csv(
                CsvOptions::new()
                    .with_quote(self.quote)
                    .with_max_depth(self.max_depth),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["jmerge", "in", "out"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in"));
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_format_case_insensitive() {
        let args = Args::try_parse_from(["jmerge", "in", "out", "CSV"]).unwrap();
        assert_eq!(args.format, OutputFormat::Csv);
    }

    #[test]
    fn test_missing_output_is_usage_error() {
        assert!(Args::try_parse_from(["jmerge", "in"]).is_err());
        assert!(Args::try_parse_from(["jmerge"]).is_err());
    }

    #[test]
    fn test_store_options() {
        let args =
            Args::try_parse_from(["jmerge", "in", "out", "csv", "--quote", "--max-depth", "5"])
                .unwrap();
        let options = args.store_options();

        assert_eq!(options.format, OutputFormat::Csv);
        assert!(options.csv.quote);
        assert_eq!(options.csv.max_depth, 5);
        assert!(!options.pretty);
    }
}
