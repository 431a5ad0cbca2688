//! 모듈 병합 모듈
//!
//! 여러 폴더(보통 사용자별 폴더)에 흩어진 모듈 JSON 파일을 읽어
//! 모듈 이름 기준으로 하나의 레코드 목록에 모읍니다.
//! 사용자 매칭은 폴더 구조가 아니라 각 레코드의 `userId` 존재 여부로만 판단합니다.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MergerError, Result};
use crate::fs::FileSystem;
use crate::pattern::PatternMatcher;

/// 레코드가 반드시 가져야 하는 사용자 식별자 필드
pub const USER_ID_FIELD: &str = "userId";

/// 모듈 이름 → 병합된 레코드 목록
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeResult {
    modules: BTreeMap<String, Vec<Value>>,
}

impl MergeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모듈의 레코드 목록 조회
    pub fn get(&self, module: &str) -> Option<&[Value]> {
        self.modules.get(module).map(Vec::as_slice)
    }

    /// (모듈 이름, 레코드 목록) 순회 (모듈 이름순)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.modules
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// 모듈 수
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 전체 레코드 수
    pub fn total_records(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    /// 모듈 컬렉션을 가져오거나 새로 만들기
    fn collection_mut(&mut self, module: &str) -> &mut Vec<Value> {
        self.modules.entry(module.to_string()).or_default()
    }
}

/// 병합 진행 중 발생하는 이벤트
///
/// 라이브러리는 출력하지 않고 이벤트만 전달하며, 기록 방식은 호출자가 정합니다.
#[derive(Debug)]
pub enum MergeEvent {
    /// 폴더 처리 시작
    FolderStarted { folder: PathBuf },
    /// 폴더 나열 실패로 건너뜀
    FolderSkipped { folder: PathBuf, error: MergerError },
    /// 모듈 파일 처리 시작
    ModuleStarted { module: String, file: PathBuf },
    /// 읽기/파싱 실패로 파일 건너뜀
    FileSkipped { module: String, error: MergerError },
    /// `userId`가 없어 레코드 건너뜀
    RecordSkipped {
        module: String,
        file: PathBuf,
        index: usize,
    },
}

impl MergeEvent {
    /// 건너뛰기 이벤트 여부
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            MergeEvent::FolderSkipped { .. }
                | MergeEvent::FileSkipped { .. }
                | MergeEvent::RecordSkipped { .. }
        )
    }
}

impl fmt::Display for MergeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeEvent::FolderStarted { folder } => {
                write!(f, "폴더 처리 중: {}", folder.display())
            }
            MergeEvent::FolderSkipped { folder, error } => {
                write!(f, "폴더 건너뜀 ({}): {}", folder.display(), error)
            }
            MergeEvent::ModuleStarted { module, .. } => write!(f, "모듈 처리 중: {}", module),
            MergeEvent::FileSkipped { module, error } => {
                write!(f, "모듈 {} 파일 건너뜀: {}", module, error)
            }
            MergeEvent::RecordSkipped {
                module,
                file,
                index,
            } => write!(
                f,
                "모듈 {} 데이터에 사용자 식별자({})가 없어 병합할 수 없습니다 ({} #{})",
                module,
                USER_ID_FIELD,
                file.display(),
                index
            ),
        }
    }
}

/// 병합 집계
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub folders: usize,
    pub files_read: usize,
    pub files_skipped: usize,
    pub records_accepted: usize,
    pub records_skipped: usize,
}

/// 병합 결과와 집계
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeOutcome {
    pub result: MergeResult,
    pub summary: MergeSummary,
}

/// 폴더 목록을 모듈 단위로 병합하는 병합기
pub struct Merger<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    matcher: PatternMatcher,
}

impl<'a, F: FileSystem + ?Sized> Merger<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            matcher: PatternMatcher::default(),
        }
    }

    /// 모듈 파일 필터 설정
    pub fn with_matcher(mut self, matcher: PatternMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// 입력 루트의 직계 하위 폴더 목록
    ///
    /// 루트가 없거나 폴더가 아니면 실행을 중단해야 하는 에러를 반환합니다.
    pub fn input_folders(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !self.fs.exists(root) {
            return Err(MergerError::InputNotFound {
                path: root.to_path_buf(),
            });
        }
        if !self.fs.is_dir(root) {
            return Err(MergerError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        self.fs
            .list_dirs(root)
            .map_err(|e| MergerError::ReadError {
                file: root.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// 폴더들을 순서대로 병합
    ///
    /// # Arguments
    /// * `folders` - 처리할 폴더 목록 (이 순서대로 레코드가 쌓임)
    /// * `observer` - 진행/건너뛰기 이벤트 수신자
    pub fn merge(&self, folders: &[PathBuf], mut observer: impl FnMut(&MergeEvent)) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for folder in folders {
            observer(&MergeEvent::FolderStarted {
                folder: folder.clone(),
            });
            outcome.summary.folders += 1;

            let files = match self.fs.list_files(folder) {
                Ok(files) => files,
                Err(e) => {
                    observer(&MergeEvent::FolderSkipped {
                        folder: folder.clone(),
                        error: MergerError::ReadError {
                            file: folder.clone(),
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            for file in files.iter().filter(|f| self.is_module_file(f)) {
                self.merge_file(file, &mut outcome, &mut observer);
            }
        }

        outcome
    }

    fn is_module_file(&self, path: &Path) -> bool {
        has_json_extension(path) && self.matcher.matches_path(path)
    }

    fn merge_file(
        &self,
        file: &Path,
        outcome: &mut MergeOutcome,
        observer: &mut impl FnMut(&MergeEvent),
    ) {
        let module = module_name(file);
        observer(&MergeEvent::ModuleStarted {
            module: module.clone(),
            file: file.to_path_buf(),
        });

        let entries = match read_module_file(self.fs, file) {
            Ok(entries) => entries,
            Err(error) => {
                outcome.summary.files_skipped += 1;
                observer(&MergeEvent::FileSkipped { module, error });
                return;
            }
        };
        outcome.summary.files_read += 1;

        let collection = outcome.result.collection_mut(&module);
        for (index, entry) in entries.into_iter().enumerate() {
            if has_user_id(&entry) {
                collection.push(entry);
                outcome.summary.records_accepted += 1;
            } else {
                outcome.summary.records_skipped += 1;
                observer(&MergeEvent::RecordSkipped {
                    module: module.clone(),
                    file: file.to_path_buf(),
                    index,
                });
            }
        }
    }
}

/// 확장자가 `.json`인지 확인 (대소문자 무시)
pub fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// 파일 이름에서 확장자를 뗀 모듈 이름
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 레코드가 비어 있지 않은 `userId`를 가지는지 확인
///
/// `null`, `false`, 빈 문자열, 숫자 0은 없는 것으로 봅니다.
pub fn has_user_id(record: &Value) -> bool {
    match record.get(USER_ID_FIELD) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// 모듈 파일을 읽어 최상위 배열의 원소들을 반환
pub fn read_module_file<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Vec<Value>> {
    let content = fs.read_to_string(path).map_err(|e| MergerError::ReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let json: Value = serde_json::from_str(&content).map_err(|e| MergerError::ParseError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match json {
        Value::Array(entries) => Ok(entries),
        other => Err(MergerError::NotAnArray {
            file: path.to_path_buf(),
            found: value_kind(&other),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
