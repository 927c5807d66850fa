//! 목록 조회 파라미터
//!
//! `GET /students?first_name=John&fields=first_name,email` 같은 query string을
//! 프로젝션 컬럼 목록과 equality 필터로 나눕니다.

use crate::value::{Filters, Scalar};

/// 프로젝션 컬럼을 지정하는 특수 파라미터 이름
pub const FIELDS_PARAM: &str = "fields";

/// 목록 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    /// SELECT할 컬럼 목록 (비어 있으면 `*`)
    pub columns: Vec<String>,

    /// WHERE 조건
    pub filters: Filters,
}

impl ListParams {
    /// query string 쌍에서 파싱
    ///
    /// 같은 키가 여러 번 나오면 마지막 값이 이깁니다. 필터 값은 모두 텍스트입니다.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = ListParams::default();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();

            if key == FIELDS_PARAM {
                params.columns = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            } else {
                params.filters.insert(key, Scalar::Text(value));
            }
        }

        params
    }

    /// 컬럼/필터 이름이 허용 목록 안에 있는지 검증
    pub fn validate(&self, allowed_columns: &[&str]) -> Result<(), ColumnValidationError> {
        validate_columns(
            self.columns
                .iter()
                .chain(self.filters.keys())
                .map(String::as_str),
            allowed_columns,
        )
    }
}

/// 이름 목록이 허용 목록 안에 있는지 검증
pub fn validate_columns<'a>(
    names: impl IntoIterator<Item = &'a str>,
    allowed_columns: &[&str],
) -> Result<(), ColumnValidationError> {
    for name in names {
        if !allowed_columns.contains(&name) {
            return Err(ColumnValidationError::UnknownColumn(name.to_string()));
        }
    }
    Ok(())
}

/// 컬럼 검증 에러
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColumnValidationError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
