//! 스칼라 값과 Row 타입
//!
//! 필터, INSERT/UPDATE 값, SELECT 결과 모두 `IndexMap<String, Scalar>`로 표현합니다.
//! 삽입 순서가 곧 SQL 절과 placeholder 인자의 순서입니다.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// 컬럼 하나의 값
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// SELECT 결과 한 행 (컬럼 이름 → 값)
pub type Row = IndexMap<String, Scalar>;

/// WHERE 절 equality 조건 (컬럼 이름 → 값)
pub type Filters = IndexMap<String, Scalar>;

/// INSERT/UPDATE 대상 값 (컬럼 이름 → 값)
pub type Values = IndexMap<String, Scalar>;

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 정수 또는 정수 형태의 문자열을 i64로 해석
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// 배열/객체처럼 스칼라가 아닌 JSON 값
#[derive(Debug, Clone, thiserror::Error)]
#[error("expected a scalar value, got {kind}")]
pub struct NotScalar {
    pub kind: &'static str,
}

impl TryFrom<Value> for Scalar {
    type Error = NotScalar;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Scalar::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Scalar::Float(f))
                } else {
                    Ok(Scalar::Text(n.to_string()))
                }
            }
            Value::String(s) => Ok(Scalar::Text(s)),
            Value::Array(_) => Err(NotScalar { kind: "array" }),
            Value::Object(_) => Err(NotScalar { kind: "object" }),
        }
    }
}
