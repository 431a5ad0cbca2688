//! 에러 타입 정의 모듈
//!
//! jmerge에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 파일/레코드/모듈 단위 에러는 호출자가 기록 후 건너뛰고,
//! 입력 루트 관련 에러만 실행 전체를 중단시킵니다.

use std::path::PathBuf;
use thiserror::Error;

/// jmerge에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum MergerError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    ReadError { file: PathBuf, reason: String },

    /// JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    ParseError { file: PathBuf, reason: String },

    /// 최상위 값이 배열이 아님
    #[error("최상위 값이 배열이 아닙니다 ({file}): {found}")]
    NotAnArray { file: PathBuf, found: &'static str },

    /// 평탄화 깊이 초과
    #[error("중첩 깊이 제한({limit}) 초과: {path}")]
    DepthExceeded { path: String, limit: usize },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {reason}")]
    WriteError { path: PathBuf, reason: String },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({module}): {reason}")]
    SerializeError { module: String, reason: String },

    /// CSV 작성 실패
    #[error("CSV 작성 실패: {reason}")]
    CsvError { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

/// jmerge 결과 타입 별칭
pub type Result<T> = std::result::Result<T, MergerError>;
