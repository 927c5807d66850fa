//! 테이블 부트스트랩
//!
//! 개발/테스트용으로 `CREATE TABLE IF NOT EXISTS`만 실행합니다. 기존 테이블은 건드리지 않습니다.

use sea_query::{MysqlQueryBuilder, SqliteQueryBuilder, TableCreateStatement};
use sqlx::AnyPool;

use crate::entities::{Employee, Resource, Student};

/// 지원하는 DB 종류 (둘 다 `?` placeholder 사용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql:") {
            Some(Backend::MySql)
        } else if url.starts_with("sqlite:") {
            Some(Backend::Sqlite)
        } else {
            None
        }
    }

    fn render(&self, stmt: &TableCreateStatement) -> String {
        match self {
            Backend::MySql => stmt.to_string(MysqlQueryBuilder),
            Backend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        }
    }
}

/// 모든 엔터티의 DDL
pub fn create_statements(backend: Backend) -> Vec<String> {
    [Student::table_def(), Employee::table_def()]
        .iter()
        .map(|stmt| backend.render(stmt))
        .collect()
}

/// 테이블이 없으면 생성
pub async fn bootstrap(pool: &AnyPool, backend: Backend) -> Result<(), sqlx::Error> {
    for ddl in create_statements(backend) {
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}
