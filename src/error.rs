//! 错误类型定义
//!
//! 定义了配置校验、dump 切分和 mysqldump 调用过程中可能出现的所有错误类型。

use thiserror::Error;

/// 配置校验错误
///
/// 在任何 I/O 发生之前由 [`crate::DumpConfig::validate`] 返回，
/// 取代原实现中构造期/设置期抛出的顺序敏感异常。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 目标根目录不存在
    #[error("destination root does not exist: {0}")]
    DestinationMissing(String),

    /// 目标根路径不是目录
    #[error("destination root is not a directory: {0}")]
    DestinationNotADirectory(String),

    /// 选择了按库备份但库列表为空
    #[error("database list is empty")]
    EmptyDatabases,

    /// 选择了按表备份但表列表为空
    #[error("table list is empty for database `{0}`")]
    EmptyTables(String),

    /// master-data 与拆分输出互斥（binlog 坐标只对整份 dump 有意义）
    #[error("--master-data cannot be combined with split output")]
    MasterDataWithSplit,

    /// RDS 实例没有 SUPER 权限，无法使用 master-data
    #[error("--master-data is not available on RDS instances")]
    MasterDataOnRds,

    /// RDS 实例不允许全局读锁
    #[error("--lock-all-tables is not available on RDS instances")]
    LockAllTablesOnRds,
}

/// 切分错误
///
/// 任何一个错误都会立即终止本次切分；已写出的部分文件保留原样，
/// 源 dump 文件不会被删除。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// 源 dump 文件不存在或无法打开
    #[error("source dump not found or inaccessible: {0}")]
    SourceUnreadable(String),

    /// 输出目录创建失败（含时间戳目录已存在的情况）
    #[error("failed to create output directory: {0}")]
    CreateDir(String),

    /// 输出文件创建失败
    #[error("failed to create output file: {0}")]
    CreateFile(String),

    /// 读取源文件失败
    #[error("failed to read source dump: {0}")]
    Read(String),

    /// 写出失败
    #[error("failed to write output file: {0}")]
    Write(String),

    /// 成功切分后删除源文件失败
    #[error("failed to remove source dump after split: {0}")]
    RemoveSource(String),

    /// 标记行缺少成对反引号，无法提取库/表名
    #[error("malformed marker at line {line_no}: expected `name` between backticks: {line}")]
    MalformedMarker {
        /// 行号（从 1 开始）
        line_no: u64,
        /// 标记行内容（已去掉换行符）
        line: String,
    },

    /// 标记中的标识符非法（非 UTF-8，或包含路径分隔符）
    #[error("invalid identifier in marker at line {line_no}: {name}")]
    InvalidName {
        /// 行号（从 1 开始）
        line_no: u64,
        /// 提取出的标识符（有损转义）
        name: String,
    },

    /// 在任何库标记出现之前遇到表标记，且未提供库名提示
    #[error("table marker at line {line_no} precedes any database marker and no database hint was given")]
    TableOutsideDatabase {
        /// 行号（从 1 开始）
        line_no: u64,
    },
}

/// mysqldump 调用错误
///
/// 由编排器 [`crate::run_dump`] 返回；切分器本身从不检查外部进程。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DumpError {
    /// 配置校验失败
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 切分阶段失败
    #[error(transparent)]
    Split(#[from] SplitError),

    /// 无法启动 mysqldump 进程
    #[error("failed to spawn `{program}`: {message}")]
    Spawn {
        /// 被调用的程序名
        program: String,
        /// 系统错误信息
        message: String,
    },

    /// dump 文件创建或进程等待期间的 I/O 错误
    #[error("dump I/O error: {0}")]
    Io(String),

    /// mysqldump 以非零状态退出
    #[error("mysqldump exited with {status}: {stderr}")]
    CommandFailed {
        /// 退出状态描述
        status: String,
        /// 捕获的 stderr（截断到末尾若干行）
        stderr: String,
    },
}
