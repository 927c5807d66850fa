//! roster-sql: 파라미터화된 SQL 생성 및 실행 라이브러리
//!
//! 컬럼/필터/값 맵을 `?` placeholder SQL로 바꾸고, DB 연결에 실행합니다.
//! 값은 항상 placeholder 인자로만 전달되어 SQL Injection을 막습니다.
//!
//! # 모듈 구조
//!
//! - `value`: 스칼라 값, Row/Filters/Values 타입
//! - `builder`: CRUD SQL 빌더
//! - `executor`: 실행기 계약 (`Executor`)과 sqlx 구현
//! - `params`: 목록 조회 파라미터 파싱/검증
//! - `error`: 에러 타입

pub mod builder;
pub mod error;
pub mod executor;
pub mod params;
pub mod value;

pub use builder::{
    build_delete, build_insert, build_select, build_update, DeleteBuilder, InsertBuilder, Query,
    SelectBuilder, UpdateBuilder,
};
pub use error::{Error, Result};
pub use executor::{Executor, Mode, Outcome, SqlxExecutor};
pub use params::{ColumnValidationError, ListParams};
pub use value::{Filters, Row, Scalar, Values};
