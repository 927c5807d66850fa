//! 엔터티 정의 (student, employee)
//!
//! 테이블/컬럼 이름, 테이블 정의, 엔터티별 값 규칙을 모아 둡니다.
//! email 필수/중복 검사처럼 DB 조회가 필요한 공통 규칙은 `handlers::resource`에 있습니다.

use sea_query::{Alias, ColumnDef, Table, TableCreateStatement};

use roster_sql::{Scalar, Values};

/// 공통 email 컬럼
pub const EMAIL_COLUMN: &str = "email";

/// 요청 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
}

/// 엔터티 규칙 위반
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RuleViolation {
    pub message: String,
}

impl RuleViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// HTTP로 노출되는 테이블 하나
pub trait Resource: Send + Sync + 'static {
    /// 테이블 이름
    const TABLE: &'static str;

    /// 자동 증가 ID 컬럼
    const ID_COLUMN: &'static str;

    /// 허용 컬럼 (ID 포함)
    const COLUMNS: &'static [&'static str];

    /// CREATE TABLE IF NOT EXISTS 정의
    fn table_def() -> TableCreateStatement;

    /// 엔터티별 값 규칙
    fn check_values(values: &Values, action: Action) -> Result<(), RuleViolation>;
}

pub struct Student;

impl Student {
    /// 허용 입학 연도
    ///
    /// 정수 또는 정수 문자열만 받습니다. `2019.5`, `2020.0` 같은 실수는 잘라내지 않고 거부합니다.
    pub const ENROLLMENT_YEARS: std::ops::RangeInclusive<i64> = 2016..=2023;
}

impl Resource for Student {
    const TABLE: &'static str = "student";
    const ID_COLUMN: &'static str = "student_id";
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "first_name",
        "last_name",
        "email",
        "enrollment_year",
    ];

    fn table_def() -> TableCreateStatement {
        let mut stmt = Table::create();
        stmt.table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id_column(Self::ID_COLUMN))
            .col(ColumnDef::new(Alias::new("first_name")).string_len(255))
            .col(ColumnDef::new(Alias::new("last_name")).string_len(255))
            .col(email_column())
            .col(ColumnDef::new(Alias::new("enrollment_year")).integer());
        stmt
    }

    fn check_values(values: &Values, _action: Action) -> Result<(), RuleViolation> {
        if let Some(year) = values.get("enrollment_year") {
            match year.as_i64() {
                Some(year) if Self::ENROLLMENT_YEARS.contains(&year) => {}
                _ => {
                    return Err(RuleViolation::new(format!(
                        "enrollment_year must be between {} and {}",
                        Self::ENROLLMENT_YEARS.start(),
                        Self::ENROLLMENT_YEARS.end()
                    )))
                }
            }
        }
        Ok(())
    }
}

pub struct Employee;

impl Employee {
    pub const EMPLOYEE_TYPES: &'static [&'static str] = &["Professor", "Lecturer", "Staff"];
}

impl Resource for Employee {
    const TABLE: &'static str = "employee";
    const ID_COLUMN: &'static str = "employee_id";
    const COLUMNS: &'static [&'static str] = &[
        "employee_id",
        "first_name",
        "last_name",
        "email",
        "employee_type",
    ];

    fn table_def() -> TableCreateStatement {
        let mut stmt = Table::create();
        stmt.table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id_column(Self::ID_COLUMN))
            .col(ColumnDef::new(Alias::new("first_name")).string_len(255))
            .col(ColumnDef::new(Alias::new("last_name")).string_len(255))
            .col(email_column())
            .col(
                ColumnDef::new(Alias::new("employee_type"))
                    .string_len(32)
                    .not_null(),
            );
        stmt
    }

    fn check_values(values: &Values, action: Action) -> Result<(), RuleViolation> {
        match values.get("employee_type") {
            Some(Scalar::Text(kind)) if Self::EMPLOYEE_TYPES.contains(&kind.as_str()) => Ok(()),
            None if action == Action::Update => Ok(()),
            None => Err(RuleViolation::new("employee_type is required")),
            Some(_) => Err(RuleViolation::new(format!(
                "employee_type must be one of {}",
                Self::EMPLOYEE_TYPES.join(", ")
            ))),
        }
    }
}

fn id_column(name: &str) -> ColumnDef {
    let mut col = ColumnDef::new(Alias::new(name));
    col.integer().not_null().auto_increment().primary_key();
    col
}

fn email_column() -> ColumnDef {
    let mut col = ColumnDef::new(Alias::new(EMAIL_COLUMN));
    col.string_len(255).not_null().unique_key();
    col
}
