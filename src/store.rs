//! 결과 저장 모듈
//!
//! 병합 결과를 출력 폴더에 모듈별 파일(`<모듈>.json` 또는 `<모듈>.csv`)로 씁니다.
//! 한 모듈의 실패는 기록 후 건너뛰고 나머지 모듈은 계속 씁니다.

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::csv_export::{to_csv, CsvOptions};
use crate::error::{MergerError, Result};
use crate::fs::FileSystem;
use crate::merger::MergeResult;

/// 저장 옵션
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// 출력 형식
    pub format: OutputFormat,
    /// CSV 출력 옵션
    pub csv: CsvOptions,
    /// JSON Pretty 출력 여부
    pub pretty: bool,
}

impl StoreOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 출력 형식 설정
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// CSV 옵션 설정
    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Pretty 출력 설정
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// 저장 중 발생하는 이벤트
#[derive(Debug)]
pub enum StoreEvent {
    /// 모듈 파일 작성 완료
    ModuleWritten {
        module: String,
        path: PathBuf,
        bytes: u64,
    },
    /// 모듈 건너뜀 (평탄화/직렬화/쓰기 실패)
    ModuleSkipped { module: String, error: MergerError },
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEvent::ModuleWritten { module, path, .. } => {
                write!(f, "모듈 {} 저장: {}", module, path.display())
            }
            StoreEvent::ModuleSkipped { module, error } => {
                write!(f, "모듈 {} 건너뜀: {}", module, error)
            }
        }
    }
}

/// 저장 집계
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub modules_written: usize,
    pub modules_skipped: usize,
    pub bytes_written: u64,
    /// 건너뛴 모듈과 그 사유
    pub failures: Vec<(String, String)>,
}

/// 병합 결과를 출력 폴더에 저장
///
/// 출력 폴더가 없으면 만들고, 같은 이름의 파일은 덮어씁니다.
/// 출력 폴더를 만들 수 없을 때만 에러를 반환합니다.
pub fn store<F: FileSystem + ?Sized>(
    fs: &F,
    merged: &MergeResult,
    output_folder: &Path,
    options: &StoreOptions,
    mut observer: impl FnMut(&StoreEvent),
) -> Result<StoreSummary> {
    fs.create_dir(output_folder)
        .map_err(|e| MergerError::WriteError {
            path: output_folder.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut summary = StoreSummary::default();

    for (module, records) in merged.iter() {
        let path = output_path(output_folder, module, options.format);
        let written = render_module(module, records, options).and_then(|content| {
            fs.write(&path, &content)
                .map(|_| content.len() as u64)
                .map_err(|e| MergerError::WriteError {
                    path: path.clone(),
                    reason: e.to_string(),
                })
        });

        match written {
            Ok(bytes) => {
                summary.modules_written += 1;
                summary.bytes_written += bytes;
                observer(&StoreEvent::ModuleWritten {
                    module: module.to_string(),
                    path,
                    bytes,
                });
            }
            Err(error) => {
                summary.modules_skipped += 1;
                summary.failures.push((module.to_string(), error.to_string()));
                observer(&StoreEvent::ModuleSkipped {
                    module: module.to_string(),
                    error,
                });
            }
        }
    }

    Ok(summary)
}

/// 모듈 출력 파일 경로
pub fn output_path(output_folder: &Path, module: &str, format: OutputFormat) -> PathBuf {
    output_folder.join(format!("{}.{}", module, format.extension()))
}

/// 모듈 하나를 출력 형식의 텍스트로 변환
pub fn render_module(module: &str, records: &[Value], options: &StoreOptions) -> Result<String> {
    match options.format {
        OutputFormat::Csv => to_csv(records, &options.csv),
        OutputFormat::Json => {
            let serialized = if options.pretty {
                serde_json::to_string_pretty(records)
            } else {
                serde_json::to_string(records)
            };
            serialized.map_err(|e| MergerError::SerializeError {
                module: module.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::merger::Merger;
    use serde_json::json;

    fn merged(fs: &MemoryFileSystem) -> MergeResult {
        Merger::new(fs)
            .merge(&[PathBuf::from("in/A"), PathBuf::from("in/B")], |_| {})
            .result
    }

    fn seeded() -> MemoryFileSystem {
        let fs = MemoryFileSystem::new();
        fs.add_file("in/A/bp.json", r#"[{"userId": "u1", "val": 1}]"#);
        fs.add_file("in/B/bp.json", r#"[{"userId": "u2", "val": 2}]"#);
        fs.add_file(
            "in/B/m.json",
            r#"[{"userId": "u1", "vitals": {"hr": 70}}]"#,
        );
        fs
    }

    #[test]
    fn test_store_json() {
        let fs = seeded();
        let result = merged(&fs);

        let summary = store(&fs, &result, Path::new("out"), &StoreOptions::new(), |_| {}).unwrap();

        assert_eq!(summary.modules_written, 2);
        assert!(summary.failures.is_empty());
        let bp: Value = serde_json::from_str(&fs.file("out/bp.json").unwrap()).unwrap();
        assert_eq!(
            bp,
            json!([{"userId": "u1", "val": 1}, {"userId": "u2", "val": 2}])
        );
    }

    #[test]
    fn test_store_csv() {
        let fs = seeded();
        let result = merged(&fs);
        let options = StoreOptions::new().with_format(OutputFormat::Csv);

        store(&fs, &result, Path::new("out"), &options, |_| {}).unwrap();

        assert_eq!(fs.file("out/m.csv").unwrap(), "userId;vitals.hr\nu1;70");
        assert_eq!(fs.file("out/bp.csv").unwrap(), "userId;val\nu1;1\nu2;2");
        assert!(fs.file("out/bp.json").is_none());
    }

    #[test]
    fn test_depth_exceeded_skips_only_that_module() {
        let fs = MemoryFileSystem::new();
        fs.add_file("in/A/deep.json", r#"[{"userId": "u1", "a": {"b": {"c": 1}}}]"#);
        fs.add_file("in/A/flat.json", r#"[{"userId": "u1", "v": 1}]"#);
        let result = Merger::new(&fs).merge(&[PathBuf::from("in/A")], |_| {}).result;

        let options = StoreOptions::new()
            .with_format(OutputFormat::Csv)
            .with_csv(CsvOptions::new().with_max_depth(2));
        let mut skipped = Vec::new();
        let summary = store(&fs, &result, Path::new("out"), &options, |event| {
            if let StoreEvent::ModuleSkipped { module, .. } = event {
                skipped.push(module.clone());
            }
        })
        .unwrap();

        assert_eq!(skipped, vec!["deep".to_string()]);
        assert_eq!(summary.modules_written, 1);
        assert_eq!(summary.modules_skipped, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "deep");
        assert!(summary.failures[0].1.contains("중첩 깊이 제한(2) 초과"));
        assert!(fs.file("out/deep.csv").is_none());
        assert!(fs.file("out/flat.csv").is_some());
    }

    #[test]
    fn test_empty_result_creates_folder_only() {
        let fs = MemoryFileSystem::new();
        let summary = store(
            &fs,
            &MergeResult::new(),
            Path::new("out"),
            &StoreOptions::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(summary, StoreSummary::default());
        assert!(fs.is_dir(Path::new("out")));
        assert!(fs.files_in("out").is_empty());
    }

    #[test]
    fn test_pretty_json() {
        let records = vec![json!({"userId": "u1"})];
        let content =
            render_module("m", &records, &StoreOptions::new().with_pretty(true)).unwrap();
        assert!(content.contains('\n'));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), "heart-rate", OutputFormat::Csv),
            PathBuf::from("out/heart-rate.csv")
        );
    }
}
