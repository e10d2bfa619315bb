//! mysqldump 编排器
//!
//! 负责切分器之外的那半边约定：以参数向量方式启动 mysqldump、把 stdout
//! 重定向到 dump 文件、检查退出状态并带着捕获的 stderr 上报失败，
//! 一切正常后才把文件交给 [`crate::split_dump_file`]。
//! 切分器本身从不检查外部进程。

use crate::config::DumpConfig;
use crate::error::DumpError;
use crate::splitter::{SplitReport, split_dump_file};
use std::fs::File;
use std::process::{Command, Stdio};
use tracing::info;

/// 一次完整备份运行的产物
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DumpArtifacts {
    /// 本次运行使用的时间戳
    pub timestamp: String,
    /// 切分结果
    pub report: SplitReport,
}

/// 执行一次完整备份：校验配置 → 调 mysqldump → 切分。
///
/// dump 先落在 `<destination_root>/dump-<timestamp>.sql`，切分成功后该
/// 文件被删除。mysqldump 非零退出时返回
/// [`DumpError::CommandFailed`]，此时 dump 文件保留在原地供排查，
/// 不会进入切分阶段。
///
/// 认证、连通性、锁超时这类失败都在这里以捕获的 stderr 浮出水面
/// （mysqldump 把口令告警也写到 stderr，一并带出）。
pub fn run_dump(config: &DumpConfig) -> Result<DumpArtifacts, DumpError> {
    config.validate()?;
    let timestamp = config.effective_timestamp();
    let dump_path = config.destination_root.join(format!("dump-{timestamp}.sql"));

    let stdout = File::create(&dump_path)
        .map_err(|e| DumpError::Io(format!("{}: {}", dump_path.display(), e)))?;

    let child = Command::new(&config.mysqldump_bin)
        .args(config.mysqldump_args())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DumpError::Spawn {
            program: config.mysqldump_bin.display().to_string(),
            message: e.to_string(),
        })?;

    let output = child
        .wait_with_output()
        .map_err(|e| DumpError::Io(e.to_string()))?;

    if !output.status.success() {
        return Err(DumpError::CommandFailed {
            status: output.status.to_string(),
            stderr: stderr_tail(&output.stderr),
        });
    }

    let report = split_dump_file(
        &dump_path,
        &config.destination_root,
        &timestamp,
        config.split_mode,
        config.database_hint(),
    )?;

    info!(
        timestamp = %timestamp,
        root = %report.root.display(),
        files = report.files.len(),
        "backup complete"
    );

    Ok(DumpArtifacts { timestamp, report })
}

/// stderr 只保留末尾几行，够定位失败原因即可
fn stderr_tail(stderr: &[u8]) -> String {
    const KEEP_LINES: usize = 8;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(KEEP_LINES);
    lines[start..].join("\n")
}
