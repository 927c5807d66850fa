//! 쿼리 실행기
//!
//! 빌드된 [`Query`]를 DB 연결에 한 번 보내고 결과를 Row 목록 또는 영향 받은 행 수로
//! 정규화합니다. 재시도, 재연결, 트랜잭션은 하지 않습니다 (autocommit).

use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::{Any, AnyPool, Column, Row as _, TypeInfo, ValueRef};

use crate::builder::{build_delete, build_insert, build_select, build_update, Query};
use crate::error::{Error, Result};
use crate::value::{Filters, Row, Scalar, Values};

/// 결과 형태 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 매칭되는 모든 행 반환
    Fetch,
    /// DB가 보고한 영향 받은 행 수 반환
    Count,
}

/// 실행 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Row>),
    Count(u64),
}

impl Outcome {
    pub fn into_rows(self) -> Result<Vec<Row>> {
        match self {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Count(_) => Err(Error::ResultShape {
                expected: Mode::Fetch,
            }),
        }
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Outcome::Count(count) => Ok(count),
            Outcome::Rows(_) => Err(Error::ResultShape {
                expected: Mode::Count,
            }),
        }
    }
}

/// DB 연결 계약
///
/// `execute` 한 번이 DB 왕복 한 번입니다. SELECT는 `Fetch`, 쓰기 문장은 `Count`로
/// 부르는 것은 호출자 규약이며 실행기가 강제하지 않습니다.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, query: &Query, mode: Mode) -> Result<Outcome>;

    /// SELECT 빌드 + 실행
    async fn select(&self, table: &str, columns: &[String], filters: &Filters) -> Result<Vec<Row>> {
        let query = build_select(table, columns, filters)?;
        self.execute(&query, Mode::Fetch).await?.into_rows()
    }

    /// INSERT 빌드 + 실행, 영향 받은 행 수 반환
    async fn insert(&self, table: &str, values: &Values) -> Result<u64> {
        let query = build_insert(table, values)?;
        self.execute(&query, Mode::Count).await?.into_count()
    }

    /// UPDATE 빌드 + 실행, 영향 받은 행 수 반환
    async fn update(&self, table: &str, values: &Values, filters: &Filters) -> Result<u64> {
        let query = build_update(table, values, filters)?;
        self.execute(&query, Mode::Count).await?.into_count()
    }

    /// DELETE 빌드 + 실행, 영향 받은 행 수 반환
    async fn delete(&self, table: &str, filters: &Filters) -> Result<u64> {
        let query = build_delete(table, filters)?;
        self.execute(&query, Mode::Count).await?.into_count()
    }
}

/// sqlx `AnyPool` 기반 실행기 (MySQL, SQLite)
#[derive(Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
}

impl SqlxExecutor {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// URL로 풀을 열어 실행기 생성
    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl Executor for SqlxExecutor {
    async fn execute(&self, query: &Query, mode: Mode) -> Result<Outcome> {
        let statement = bind_args(sqlx::query(query.sql()), query.args());

        match mode {
            Mode::Fetch => {
                let rows = statement.fetch_all(&self.pool).await?;
                let rows = rows.iter().map(row_to_scalars).collect::<Result<Vec<_>>>()?;
                Ok(Outcome::Rows(rows))
            }
            Mode::Count => {
                let result = statement.execute(&self.pool).await?;
                Ok(Outcome::Count(result.rows_affected()))
            }
        }
    }
}

fn bind_args<'q>(
    mut statement: sqlx::query::Query<'q, Any, AnyArguments<'q>>,
    args: &[Scalar],
) -> sqlx::query::Query<'q, Any, AnyArguments<'q>> {
    for arg in args {
        statement = match arg {
            Scalar::Null => statement.bind(Option::<String>::None),
            Scalar::Bool(b) => statement.bind(*b),
            Scalar::Int(i) => statement.bind(*i),
            Scalar::Float(f) => statement.bind(*f),
            Scalar::Text(s) => statement.bind(s.clone()),
        };
    }
    statement
}

/// 행 하나를 Row로 변환
///
/// 값 자체의 타입으로 디코딩합니다. SQL NULL만 `Scalar::Null`이 되고,
/// 디코딩할 수 없는 값(BLOB 등)은 `Error::Database`로 올라갑니다.
fn row_to_scalars(row: &AnyRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.columns().len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Scalar::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "SMALLINT" => Scalar::Int(row.try_get::<i16, _>(index)?.into()),
                "INTEGER" => Scalar::Int(row.try_get::<i32, _>(index)?.into()),
                "BIGINT" => Scalar::Int(row.try_get::<i64, _>(index)?),
                "REAL" => Scalar::Float(row.try_get::<f32, _>(index)?.into()),
                "DOUBLE" => Scalar::Float(row.try_get::<f64, _>(index)?),
                "BOOLEAN" => Scalar::Bool(row.try_get::<bool, _>(index)?),
                _ => Scalar::Text(row.try_get::<String, _>(index)?),
            }
        };

        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}
