//! API 앱 상태

use std::sync::Arc;

use roster_sql::{Executor, SqlxExecutor};

use crate::config::Config;
use crate::schema;

/// 앱 상태
///
/// 모든 핸들러에서 공유합니다. DB 핸들은 전역이 아니라 여기로 주입됩니다.
pub struct AppState {
    /// 쿼리 실행기 (연결 풀)
    pub db: Arc<dyn Executor>,
}

impl AppState {
    /// 설정으로 DB 풀을 열고 상태 생성
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let backend = config.backend()?;
        let executor =
            SqlxExecutor::connect(&config.database_url, config.db_max_connections).await?;

        if config.bootstrap_schema {
            tracing::info!("Bootstrapping tables for {:?}", backend);
            schema::bootstrap(executor.pool(), backend).await?;
        }

        Ok(Self::with_executor(Arc::new(executor)))
    }

    /// 이미 만들어진 실행기로 상태 생성
    pub fn with_executor(db: Arc<dyn Executor>) -> Self {
        Self { db }
    }
}
