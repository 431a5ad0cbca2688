//! jmerge - MODULE JSON MERGER
//!
//! 여러 폴더(보통 사용자별 폴더)에 흩어진 모듈별 측정 JSON 파일을
//! 모듈 단위의 단일 파일로 병합하고, 필요하면 평탄화된 CSV로 내보냅니다.
//!
//! # 주요 기능
//!
//! - 🧩 **모듈 병합**: 파일 이름(확장자 제외)을 모듈 이름으로 삼아 모든 폴더의 레코드를 모음
//! - 🪪 **사용자 식별자 검사**: `userId`가 없는 레코드는 기록 후 제외
//! - 🛡️ **부분 실패 허용**: 잘못된 파일/모듈은 건너뛰고 나머지를 계속 처리
//! - 🪜 **평탄화**: 중첩 JSON을 `a.b.0.c` 형태의 점 경로 열로 변환
//! - 📑 **CSV 출력**: 처음 등장한 순서의 열 집합, `;` 구분, 선택적 인용 처리
//! - 🔍 **패턴 필터링**: glob 형식의 모듈 파일 필터
//! - 📈 **상세 통계**: 파일/레코드/모듈 단위 집계
//!
//! # 예제
//!
//! ```bash
//! # JSON으로 병합
//! jmerge ./exports ./merged
//!
//! # 평탄화된 CSV로 병합
//! jmerge ./exports ./merged csv
//! ```

pub mod cli;
pub mod csv_export;
pub mod error;
pub mod flatten;
pub mod fs;
pub mod merger;
pub mod pattern;
pub mod stats;
pub mod store;

// Re-exports for convenient access
pub use cli::{Args, OutputFormat};
pub use csv_export::{column_set, to_csv, CsvOptions};
pub use error::{MergerError, Result};
pub use flatten::{flatten, FlatRow};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use merger::{MergeEvent, MergeOutcome, MergeResult, MergeSummary, Merger};
pub use pattern::PatternMatcher;
pub use stats::{format_bytes, Statistics};
pub use store::{store, StoreEvent, StoreOptions, StoreSummary};
