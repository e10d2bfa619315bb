//! Dump 配置模块
//!
//! 提供不可变的配置值 [`DumpConfig`]：构造一次、校验一次，然后交给
//! [`crate::run_dump`]。取代原实现中多次调用 setter、在特定调用顺序下
//! 才抛错的可变配置对象。
//!
//! mysqldump 的调用参数由 [`DumpConfig::mysqldump_args`] 渲染为离散的
//! 参数向量，每个库名/表名/口令都是独立的 token，不经过 shell 解释，
//! 名称里的元字符不会被注入执行。

use crate::error::ConfigError;
use crate::splitter::SplitMode;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// 备份对象的选择
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DumpTarget {
    /// 整个实例（`--all-databases`），dump 中含库边界标记
    AllDatabases,
    /// 指定的一组库（`--databases a b`），dump 中含库边界标记
    Databases(Vec<String>),
    /// 单库中的指定表（`db t1 t2`）。
    ///
    /// 这种 dump **不含**库边界标记，按表切分时库名充当
    /// [`crate::split_dump_file`] 的 `database_hint`。
    Tables {
        /// 库名
        database: String,
        /// 表名列表
        tables: Vec<String>,
    },
}

/// 一致性开关：导出期间采用哪种点时一致性手段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsistencyMode {
    /// InnoDB 事务快照（`--single-transaction`）
    SingleTransaction,
    /// 全局读锁（`--lock-all-tables`），RDS 上不可用
    LockAllTables,
    /// 不加任何一致性开关
    None,
}

/// 一次 mysqldump 备份的完整描述
///
/// 全部字段公开，用结构体字面量或 [`DumpConfig::new`] + 更新语法构造，
/// 构造后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DumpConfig {
    /// mysqldump 可执行文件（默认 `mysqldump`，测试中可替换）
    pub mysqldump_bin: PathBuf,
    /// 服务器地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// 登录用户
    pub user: String,
    /// 登录口令；`None` 时交给 mysqldump 的常规口令来源（option file 等）
    pub password: Option<String>,
    /// 备份对象
    pub target: DumpTarget,
    /// 一致性开关
    pub consistency: ConsistencyMode,
    /// 是否记录 binlog 坐标（`--master-data=2`）
    pub master_data: bool,
    /// 目标实例是否为 RDS（禁用需要 SUPER/全局锁的选项）
    pub rds: bool,
    /// 输出根目录，时间戳目录建在它下面
    pub destination_root: PathBuf,
    /// 输出拓扑
    pub split_mode: SplitMode,
    /// 本次运行的命名空间；`None` 时取 Unix epoch 秒
    pub timestamp: Option<String>,
}

impl DumpConfig {
    /// 本机默认连接参数的配置
    pub fn new(target: DumpTarget, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            mysqldump_bin: PathBuf::from("mysqldump"),
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            target,
            consistency: ConsistencyMode::SingleTransaction,
            master_data: false,
            rds: false,
            destination_root: destination_root.into(),
            split_mode: SplitMode::SingleFile,
            timestamp: None,
        }
    }

    /// 在任何 I/O 之前校验整份配置。
    ///
    /// 所有互斥组合都在这里报 [`ConfigError`]，与字段赋值顺序无关。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.destination_root.exists() {
            return Err(ConfigError::DestinationMissing(
                self.destination_root.display().to_string(),
            ));
        }
        if !self.destination_root.is_dir() {
            return Err(ConfigError::DestinationNotADirectory(
                self.destination_root.display().to_string(),
            ));
        }

        match &self.target {
            DumpTarget::AllDatabases => {}
            DumpTarget::Databases(dbs) => {
                if dbs.is_empty() {
                    return Err(ConfigError::EmptyDatabases);
                }
            }
            DumpTarget::Tables { database, tables } => {
                if tables.is_empty() {
                    return Err(ConfigError::EmptyTables(database.clone()));
                }
            }
        }

        if self.master_data {
            // binlog 坐标只对完整的单体 dump 有意义
            if self.split_mode != SplitMode::SingleFile {
                return Err(ConfigError::MasterDataWithSplit);
            }
            if self.rds {
                return Err(ConfigError::MasterDataOnRds);
            }
        }
        if self.rds && self.consistency == ConsistencyMode::LockAllTables {
            return Err(ConfigError::LockAllTablesOnRds);
        }

        Ok(())
    }

    /// 渲染 mysqldump 的参数向量。
    ///
    /// 每个参数都是独立 token，直接交给 `Command::args`，不拼接 shell
    /// 字符串。
    pub fn mysqldump_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--host={}", self.host),
            format!("--port={}", self.port),
            format!("--user={}", self.user),
        ];
        if let Some(password) = &self.password {
            args.push(format!("--password={password}"));
        }
        match self.consistency {
            ConsistencyMode::SingleTransaction => args.push("--single-transaction".to_string()),
            ConsistencyMode::LockAllTables => args.push("--lock-all-tables".to_string()),
            ConsistencyMode::None => {}
        }
        if self.master_data {
            args.push("--master-data=2".to_string());
        }
        match &self.target {
            DumpTarget::AllDatabases => args.push("--all-databases".to_string()),
            DumpTarget::Databases(dbs) => {
                args.push("--databases".to_string());
                args.extend(dbs.iter().cloned());
            }
            DumpTarget::Tables { database, tables } => {
                args.push(database.clone());
                args.extend(tables.iter().cloned());
            }
        }
        args
    }

    /// 表级 dump 不含库边界标记，返回充当切分提示的库名
    pub fn database_hint(&self) -> Option<&str> {
        match &self.target {
            DumpTarget::Tables { database, .. } => Some(database.as_str()),
            _ => None,
        }
    }

    /// 本次运行的时间戳：显式给定的值，否则当前 Unix epoch 秒
    pub fn effective_timestamp(&self) -> String {
        self.timestamp.clone().unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
                .to_string()
        })
    }
}
