//! 모듈 필터 모듈
//!
//! glob 패턴으로 병합할 모듈 파일을 고릅니다.

use glob::{MatchOptions, Pattern};
use std::path::Path;

use crate::error::{MergerError, Result};

/// 컴파일된 모듈 파일 필터
#[derive(Debug, Default, Clone)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 모듈 파일 매칭)
    ///
    /// # Examples
    /// ```
    /// use jmerge::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("heart*".to_string())).unwrap();
    /// assert!(matcher.matches("heart-rate.json"));
    /// assert!(!matcher.matches("blood-pressure.json"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| MergerError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (대소문자 무시)
    pub fn matches(&self, file_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        match &self.pattern {
            Some(p) => p.matches_with(file_name, options),
            None => true,
        }
    }

    /// 경로의 파일 이름 부분으로 매칭
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .map(|s| self.matches(s))
            .unwrap_or(false)
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
