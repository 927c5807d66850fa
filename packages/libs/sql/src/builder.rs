//! CRUD SQL 빌더
//!
//! 테이블 이름과 컬럼/필터/값 맵을 받아 `?` placeholder SQL과 인자 목록을 만듭니다.
//! 값은 절대 SQL 문자열에 들어가지 않고 항상 인자로만 전달됩니다.
//! SQL 문자열에 직접 들어가는 것은 테이블/컬럼 식별자뿐이며, 식별자는 빌드 전에 검증합니다.

use crate::error::{Error, Result};
use crate::value::{Filters, Scalar, Values};

/// 실행 준비가 끝난 SQL과 placeholder 인자
///
/// `sql` 안의 `?` 개수와 `args` 길이는 항상 같고, 순서도 왼쪽부터 일치합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    args: Vec<Scalar>,
}

impl Query {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Scalar] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Scalar>) {
        (self.sql, self.args)
    }
}

/// 검증된 테이블/컬럼 식별자
#[derive(Debug, Clone, Copy)]
struct Ident<'a>(&'a str);

impl<'a> Ident<'a> {
    /// `[A-Za-z_][A-Za-z0-9_]*`만 허용
    fn parse(name: &'a str) -> Result<Self> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };

        if valid {
            Ok(Self(name))
        } else {
            Err(Error::invalid(format!("invalid identifier: {:?}", name)))
        }
    }
}

/// `c1 = ?<sep>c2 = ?` 형태로 조건을 이어 붙이고 값을 인자에 추가
fn push_assignments(
    sql: &mut String,
    pairs: &indexmap::IndexMap<String, Scalar>,
    separator: &str,
    args: &mut Vec<Scalar>,
) -> Result<()> {
    for (i, (column, value)) in pairs.iter().enumerate() {
        let column = Ident::parse(column)?;
        if i > 0 {
            sql.push_str(separator);
        }
        sql.push_str(column.0);
        sql.push_str(" = ?");
        args.push(value.clone());
    }
    Ok(())
}

/// 필터가 있을 때만 ` WHERE ...` 추가
fn push_where(sql: &mut String, filters: &Filters, args: &mut Vec<Scalar>) -> Result<()> {
    if filters.is_empty() {
        return Ok(());
    }
    sql.push_str(" WHERE ");
    push_assignments(sql, filters, " AND ", args)
}

/// SELECT 쿼리 빌더
pub struct SelectBuilder<'a> {
    table: &'a str,
}

impl<'a> SelectBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// SQL 생성
    ///
    /// # Arguments
    /// * `columns` - 조회할 컬럼 (비어 있으면 `*`)
    /// * `filters` - equality 조건 (비어 있으면 WHERE 생략)
    pub fn build<S: AsRef<str>>(&self, columns: &[S], filters: &Filters) -> Result<Query> {
        let table = Ident::parse(self.table)?;

        let mut sql = String::from("SELECT ");
        if columns.is_empty() {
            sql.push('*');
        } else {
            for (i, column) in columns.iter().enumerate() {
                let column = Ident::parse(column.as_ref())?;
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(column.0);
            }
        }
        sql.push_str(" FROM ");
        sql.push_str(table.0);

        let mut args = Vec::with_capacity(filters.len());
        push_where(&mut sql, filters, &mut args)?;

        Ok(Query { sql, args })
    }
}

/// INSERT 쿼리 빌더
pub struct InsertBuilder<'a> {
    table: &'a str,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// SQL 생성 (`values`가 비어 있으면 InvalidArgument)
    pub fn build(&self, values: &Values) -> Result<Query> {
        let table = Ident::parse(self.table)?;
        if values.is_empty() {
            return Err(Error::invalid(format!(
                "insert into {} requires at least one value",
                table.0
            )));
        }

        let mut columns = Vec::with_capacity(values.len());
        let mut args = Vec::with_capacity(values.len());
        for (column, value) in values {
            columns.push(Ident::parse(column)?.0);
            args.push(value.clone());
        }
        let placeholders = vec!["?"; args.len()].join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.0,
            columns.join(", "),
            placeholders
        );

        Ok(Query { sql, args })
    }
}

/// UPDATE 쿼리 빌더
///
/// 빈 `filters`는 테이블 전체 UPDATE가 됩니다. 막는 것은 호출자의 책임입니다.
pub struct UpdateBuilder<'a> {
    table: &'a str,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// SQL 생성 (SET 인자가 WHERE 인자보다 앞)
    pub fn build(&self, values: &Values, filters: &Filters) -> Result<Query> {
        let table = Ident::parse(self.table)?;
        if values.is_empty() {
            return Err(Error::invalid(format!(
                "update of {} requires at least one value",
                table.0
            )));
        }

        let mut sql = format!("UPDATE {} SET ", table.0);
        let mut args = Vec::with_capacity(values.len() + filters.len());

        // SET 절
        push_assignments(&mut sql, values, ", ", &mut args)?;

        // WHERE 절
        push_where(&mut sql, filters, &mut args)?;

        Ok(Query { sql, args })
    }
}

/// DELETE 쿼리 빌더
///
/// 빈 `filters`는 테이블 전체 DELETE가 됩니다.
pub struct DeleteBuilder<'a> {
    table: &'a str,
}

impl<'a> DeleteBuilder<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    pub fn build(&self, filters: &Filters) -> Result<Query> {
        let table = Ident::parse(self.table)?;

        let mut sql = format!("DELETE FROM {}", table.0);
        let mut args = Vec::with_capacity(filters.len());
        push_where(&mut sql, filters, &mut args)?;

        Ok(Query { sql, args })
    }
}

pub fn build_select<S: AsRef<str>>(table: &str, columns: &[S], filters: &Filters) -> Result<Query> {
    SelectBuilder::new(table).build(columns, filters)
}

pub fn build_insert(table: &str, values: &Values) -> Result<Query> {
    InsertBuilder::new(table).build(values)
}

pub fn build_update(table: &str, values: &Values, filters: &Filters) -> Result<Query> {
    UpdateBuilder::new(table).build(values, filters)
}

pub fn build_delete(table: &str, filters: &Filters) -> Result<Query> {
    DeleteBuilder::new(table).build(filters)
}
