// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::{debug, info};

/// 数据库后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    /// 文件型 SQLite
    Sqlite,
    /// 内存 SQLite，数据只存在于单个连接中
    SqliteMemory,
}

impl Backend {
    /// 根据连接URL判断后端
    pub fn from_url(url: &str) -> Self {
        if !url.starts_with("sqlite:") {
            return Backend::Postgres;
        }
        if url.contains(":memory:") || url.contains("mode=memory") {
            Backend::SqliteMemory
        } else {
            Backend::Sqlite
        }
    }
}

/// 由配置构造连接参数
///
/// 内存 SQLite 固定为单个常驻连接：连接一旦被回收，库中数据随之丢失。
pub fn connect_options(settings: &DatabaseSettings) -> ConnectOptions {
    let backend = Backend::from_url(&settings.url);
    let mut opt = ConnectOptions::new(settings.url.to_owned());

    if let Some(timeout) = settings.connect_timeout {
        opt.connect_timeout(Duration::from_secs(timeout));
        opt.acquire_timeout(Duration::from_secs(timeout));
    }

    if backend == Backend::SqliteMemory {
        opt.max_connections(1).min_connections(1);
    } else {
        if let Some(max) = settings.max_connections {
            opt.max_connections(max);
        }
        if let Some(min) = settings.min_connections {
            opt.min_connections(min);
        }
        if let Some(idle) = settings.idle_timeout {
            opt.idle_timeout(Duration::from_secs(idle));
        }
        if let Some(lifetime) = settings.max_lifetime {
            opt.max_lifetime(Duration::from_secs(lifetime));
        }
    }

    opt.sqlx_logging(settings.sqlx_logging);
    opt
}

/// 创建数据库连接池
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let backend = Backend::from_url(&settings.url);
    let opt = connect_options(settings);
    debug!(?backend, max_connections = ?opt.get_max_connections(), "Connecting to database");

    let db = Database::connect(opt).await?;
    info!(?backend, "Database pool ready");
    Ok(db)
}
