//! CSV 내보내기 모듈
//!
//! 모듈 레코드들을 평탄화한 뒤, 전체 행에서 처음 등장한 순서대로 모은
//! 열 집합으로 다시 투영하여 구분자 텍스트를 만듭니다.
//!
//! 기본 출력은 값 안의 구분자/줄바꿈을 이스케이프하지 않습니다.
//! 기존 출력과의 호환을 위해서이며, 필요하면 `quote` 옵션으로 인용 처리를 켭니다.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{MergerError, Result};
use crate::flatten::{flatten, FlatRow, DEFAULT_MAX_DEPTH, PATH_SEPARATOR};

/// 기본 루트 접두사
pub const DEFAULT_ROOT: &str = "root";

/// 기본 구분자
pub const DEFAULT_DELIMITER: u8 = b';';

/// CSV 출력 옵션
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// 평탄화 루트 접두사 (헤더에서는 제거됨)
    pub root: String,
    /// 필드 구분자
    pub delimiter: u8,
    /// 구분자/따옴표/줄바꿈이 든 값을 따옴표로 감쌀지 여부
    pub quote: bool,
    /// 평탄화 최대 깊이
    pub max_depth: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            delimiter: DEFAULT_DELIMITER,
            quote: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CsvOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 구분자 설정
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 인용 처리 설정
    pub fn with_quote(mut self, quote: bool) -> Self {
        self.quote = quote;
        self
    }

    /// 최대 깊이 설정
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// 레코드 목록을 CSV 텍스트로 변환
///
/// 헤더 줄, 줄바꿈, 데이터 행들(줄바꿈으로 연결) 순서이며 마지막 행 뒤에는 줄바꿈이 없습니다.
///
/// # Examples
/// ```
/// use jmerge::csv_export::{to_csv, CsvOptions};
/// use serde_json::json;
///
/// let records = vec![json!({"userId": "u1", "vitals": {"hr": 70}})];
/// let csv = to_csv(&records, &CsvOptions::new()).unwrap();
/// assert_eq!(csv, "userId;vitals.hr\nu1;70");
/// ```
pub fn to_csv(records: &[Value], options: &CsvOptions) -> Result<String> {
    let rows = records
        .iter()
        .map(|record| flatten(&options.root, record, options.max_depth))
        .collect::<Result<Vec<_>>>()?;

    let columns = column_set(&rows);
    let header: Vec<String> = columns
        .iter()
        .map(|column| header_name(column, &options.root))
        .collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(render_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    if options.quote && !columns.is_empty() {
        write_quoted(&header, &cells, options.delimiter)
    } else {
        Ok(write_plain(&header, &cells, options.delimiter))
    }
}

/// 모든 행의 키를 처음 등장한 순서대로 중복 없이 모은 열 집합
pub fn column_set(rows: &[FlatRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if seen.insert(key.as_str()) {
            columns.push(key.clone());
        }
    }
    columns
}

fn header_name(column: &str, root: &str) -> String {
    column
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
        .unwrap_or(column)
        .to_string()
}

/// 스칼라 값을 셀 문자열로 변환 (문자열은 따옴표 없이, null은 빈 값)
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_plain(header: &[String], cells: &[Vec<String>], delimiter: u8) -> String {
    let separator = char::from(delimiter).to_string();
    let body: Vec<String> = cells.iter().map(|row| row.join(&separator)).collect();
    format!("{}\n{}", header.join(&separator), body.join("\n"))
}

fn write_quoted(header: &[String], cells: &[Vec<String>], delimiter: u8) -> Result<String> {
    let csv_error = |e: &dyn std::fmt::Display| MergerError::CsvError {
        reason: e.to_string(),
    };

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header).map_err(|e| csv_error(&e))?;
    for row in cells {
        writer.write_record(row).map_err(|e| csv_error(&e))?;
    }

    let bytes = writer.into_inner().map_err(|e| csv_error(&e))?;
    let mut text = String::from_utf8(bytes).map_err(|e| csv_error(&e))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
