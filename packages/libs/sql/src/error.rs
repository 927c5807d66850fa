//! roster-sql 에러 타입

use thiserror::Error;

use crate::executor::Mode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 호출자가 잘못된 입력을 넘긴 경우 (빈 values, 잘못된 식별자 등)
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// DB 실행 중 발생한 에러 (해석하지 않고 그대로 전달)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 요청한 결과 형태와 실제 Outcome이 다름
    #[error("expected {expected:?} outcome")]
    ResultShape { expected: Mode },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }
}
