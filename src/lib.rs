//! # MySQL Dump Splitter
//!
//! 一个围绕 `mysqldump` 的流式备份辅助库：构建参数向量调起外部 dump
//! 进程，再把产出的单体 SQL dump 按库或按库/表切分成文件树。
//!
//! ## 功能特性
//!
//! - **单趟低内存切分**: 对 dump 文件做一次前向扫描，除行缓冲外任一时刻
//!   至多一个打开的输出句柄，文件大于内存也能处理
//! - **不可变配置**: [`DumpConfig`] 构造一次、[`DumpConfig::validate`]
//!   统一校验，没有调用顺序陷阱
//! - **无 shell 注入**: mysqldump 以离散参数向量启动，库名/表名/口令
//!   不经过 shell 解释
//! - **明确的错误类型**: 畸形标记报 [`SplitError::MalformedMarker`]，
//!   不会带着错名字继续切分
//!
//! ## 快速开始
//!
//! ### 只切分一个已有的 dump 文件
//!
//! ```no_run
//! use mysql_dump_splitter::{SplitMode, split_dump_file};
//!
//! let report = split_dump_file(
//!     "/backups/dump.sql",
//!     "/backups",
//!     "1700000000",
//!     SplitMode::PerDatabaseAndTable,
//!     None,
//! )?;
//!
//! for file in &report.files {
//!     println!("写出 {}", file.display());
//! }
//! # Ok::<(), mysql_dump_splitter::SplitError>(())
//! ```
//!
//! ### 完整备份（dump + 切分）
//!
//! ```no_run
//! use mysql_dump_splitter::{DumpConfig, DumpTarget, SplitMode, run_dump};
//!
//! let config = DumpConfig {
//!     split_mode: SplitMode::PerDatabase,
//!     password: Some("secret".to_string()),
//!     ..DumpConfig::new(DumpTarget::AllDatabases, "/backups")
//! };
//!
//! let artifacts = run_dump(&config)?;
//! println!("备份完成: {}", artifacts.report.root.display());
//! # Ok::<(), mysql_dump_splitter::DumpError>(())
//! ```
//!
//! ## 输入格式
//!
//! 识别的边界标记是 mysqldump 输出中的两个精确子串：
//!
//! ```text
//! -- Current Database: `shop`     ← 库边界
//! DROP TABLE IF EXISTS `orders`;  ← 表边界（仅 PerDatabaseAndTable 模式）
//! ```
//!
//! 输出布局：
//!
//! ```text
//! PerDatabase:          <root>/<timestamp>/<库名>.sql
//! PerDatabaseAndTable:  <root>/<timestamp>/<库名>/<表名>.sql
//! ```
//!
//! ## 已知局限
//!
//! 其他工具产出的、不含上述标记的 dump 会退化为"找不到切分点"：首个
//! 标记之前的内容全部丢弃，输出目录为空而源文件照常删除。调用方应检查
//! [`SplitReport::files`] 的数量做健全性检查。
//!
//! ## 恢复
//!
//! 本库不实现恢复，直接用 mysql 客户端回灌即可：
//!
//! ```text
//! mysql --host=... --user=... --password=... shop < 1700000000/shop.sql
//! ```

pub mod config;
pub mod dumper;
pub mod error;
pub mod marker;
pub mod splitter;

pub use config::{ConsistencyMode, DumpConfig, DumpTarget};
pub use dumper::{DumpArtifacts, run_dump};
pub use error::{ConfigError, DumpError, SplitError};
pub use splitter::{SplitMode, SplitReport, split_dump_file};
