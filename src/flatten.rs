//! JSON 평탄화 모듈
//!
//! 중첩된 JSON 값을 점(`.`)으로 이어진 경로 → 스칼라 값의 단일 레벨 맵으로 바꿉니다.
//! 객체 키와 배열 인덱스가 경로 구간이 되며, 키 순서는 문서 순서를 따릅니다.

use serde_json::{Map, Value};

use crate::error::{MergerError, Result};

/// 평탄화된 한 행 (경로 → 스칼라), 삽입 순서 유지
pub type FlatRow = Map<String, Value>;

/// 기본 최대 중첩 깊이
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// 경로 구간 구분자
pub const PATH_SEPARATOR: char = '.';

/// 값을 평탄화
///
/// # Arguments
/// * `prefix` - 모든 경로 앞에 붙을 접두사 (빈 문자열이면 구분자 없이 키부터 시작)
/// * `value` - 평탄화할 JSON 값
/// * `max_depth` - 허용할 최대 중첩 깊이
///
/// # Examples
/// ```
/// use jmerge::flatten::flatten;
/// use serde_json::json;
///
/// let row = flatten("root", &json!({"a": {"b": 1, "c": [true]}}), 8).unwrap();
/// let keys: Vec<_> = row.keys().cloned().collect();
/// assert_eq!(keys, vec!["root.a.b", "root.a.c.0"]);
/// ```
pub fn flatten(prefix: &str, value: &Value, max_depth: usize) -> Result<FlatRow> {
    let mut row = FlatRow::new();
    flatten_into(&mut row, prefix.to_string(), value, 0, max_depth)?;
    Ok(row)
}

fn flatten_into(
    row: &mut FlatRow,
    path: String,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    match value {
        Value::Array(items) => {
            check_depth(&path, depth, max_depth)?;
            for (index, item) in items.iter().enumerate() {
                flatten_into(row, join(&path, &index.to_string()), item, depth + 1, max_depth)?;
            }
        }
        Value::Object(map) => {
            check_depth(&path, depth, max_depth)?;
            for (key, item) in map {
                flatten_into(row, join(&path, key), item, depth + 1, max_depth)?;
            }
        }
        scalar => {
            row.insert(path, scalar.clone());
        }
    }
    Ok(())
}

fn check_depth(path: &str, depth: usize, max_depth: usize) -> Result<()> {
    if depth >= max_depth {
        return Err(MergerError::DepthExceeded {
            path: path.to_string(),
            limit: max_depth,
        });
    }
    Ok(())
}

/// 접두사가 비어 있으면 구간만 반환
fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", prefix, PATH_SEPARATOR, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(row: &FlatRow) -> Vec<&str> {
        row.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_prefix_has_no_leading_separator() {
        let row = flatten("", &json!({"a": {"b": 1}, "c": [2]}), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(keys(&row), vec!["a.b", "c.0"]);
    }

    #[test]
    fn test_scalar_is_single_entry() {
        for scalar in [json!(5), json!("x"), json!(true), Value::Null] {
            let row = flatten("p", &scalar, DEFAULT_MAX_DEPTH).unwrap();
            assert_eq!(row.len(), 1);
            assert_eq!(row.get("p"), Some(&scalar));
        }
    }

    #[test]
    fn test_nested_object_keeps_key_order() {
        let row = flatten("root", &json!({"a": {"b": 1, "c": 2}}), DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(keys(&row), vec!["root.a.b", "root.a.c"]);
        assert_eq!(row.get("root.a.b"), Some(&json!(1)));
        assert_eq!(row.get("root.a.c"), Some(&json!(2)));
    }

    #[test]
    fn test_document_order_not_sorted() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": {"y": 3, "b": 4}}"#).unwrap();
        let row = flatten("root", &value, DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(keys(&row), vec!["root.z", "root.a", "root.m.y", "root.m.b"]);
    }

    #[test]
    fn test_arrays_use_index_segments() {
        let value = json!({"readings": [{"hr": 70}, {"hr": 72, "ok": null}], "tags": ["a", "b"]});
        let row = flatten("root", &value, DEFAULT_MAX_DEPTH).unwrap();

        assert_eq!(
            keys(&row),
            vec![
                "root.readings.0.hr",
                "root.readings.1.hr",
                "root.readings.1.ok",
                "root.tags.0",
                "root.tags.1"
            ]
        );
        assert_eq!(row.get("root.readings.1.ok"), Some(&Value::Null));
    }

    #[test]
    fn test_top_level_array() {
        let row = flatten("root", &json!([1, [2]]), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(keys(&row), vec!["root.0", "root.1.0"]);
    }

    #[test]
    fn test_empty_containers_produce_nothing() {
        let row = flatten("root", &json!({"a": {}, "b": [], "c": 1}), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(keys(&row), vec!["root.c"]);
    }

    #[test]
    fn test_depth_exceeded() {
        let value = json!({"a": {"b": {"c": 1}}});

        assert!(flatten("root", &value, 3).is_ok());
        match flatten("root", &value, 2) {
            Err(MergerError::DepthExceeded { path, limit }) => {
                assert_eq!(path, "root.a.b");
                assert_eq!(limit, 2);
            }
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut value = json!(1);
        for _ in 0..1_000 {
            value = json!([value]);
        }
        let result = flatten("root", &value, DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(MergerError::DepthExceeded { .. })));
    }
}
