//! 流式 dump 切分器
//!
//! 对单体 SQL dump 文件做一次前向扫描，按库边界标记（`Current Database:`）
//! 或库+表边界标记（额外识别 `DROP TABLE`）把行分发到输出文件树中，
//! 成功后删除源文件。
//!
//! 内存占用与文件大小无关：除一个行缓冲外，任一时刻最多持有一个打开的
//! 输出句柄（上一个在下一个打开时关闭），dump 超过可用内存也能处理。
//!
//! # 已知局限
//!
//! 输入中找不到任何标记时**不报错**：输出目录创建后保持为空，源文件照常
//! 删除。调用方应检查 [`SplitReport::files`] 的数量来发现这种情况。

use crate::error::SplitError;
use crate::marker::{self, NameError};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 输出拓扑
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitMode {
    /// 不切分，整份 dump 移入时间戳目录
    SingleFile,
    /// 每个库一个文件：`<root>/<timestamp>/<database>.sql`
    PerDatabase,
    /// 每个表一个文件：`<root>/<timestamp>/<database>/<table>.sql`
    PerDatabaseAndTable,
}

/// 一次切分的结果
///
/// `files` 按创建顺序排列；没有任何标记命中时它为空，
/// 调用方据此做文件数量的健全性检查。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitReport {
    /// 输出根目录 `<destination_root>/<timestamp>/`
    pub root: PathBuf,
    /// 本次创建的输出文件
    pub files: Vec<PathBuf>,
    /// 写出的行数（`SingleFile` 模式不扫描行，恒为 0）
    pub lines_written: u64,
    /// 丢弃的行数：首个标记之前的前导内容，以及库边界行本身
    pub lines_discarded: u64,
}

/// 把 `source` 指向的 dump 文件切分进 `destination_root/timestamp/`。
///
/// 行为由 [`SplitMode`] 决定：
///
/// - `PerDatabase`：每遇到一个库边界就换一个 `<库名>.sql` 句柄，
///   边界行本身不写出；
/// - `PerDatabaseAndTable`：库边界只建目录并更新当前库，表边界
///   （`DROP TABLE`）换 `<库名>/<表名>.sql` 句柄，表边界行写入新句柄；
/// - `SingleFile`：不扫描，直接把源文件移入时间戳目录。
///
/// `database_hint` 用于本身不含库边界标记的 dump（单库的表级导出）：
/// 在表模式下会预先创建 `<root>/<hint>/` 目录并作为初始当前库。
///
/// 任何 I/O 或解析错误都立即终止：已写出的部分文件保留原样，源文件
/// 不删除。只有完整成功才删除源文件并返回 [`SplitReport`]。
///
/// # 示例
///
/// ```no_run
/// use mysql_dump_splitter::{SplitMode, split_dump_file};
///
/// let report = split_dump_file(
///     "/backups/dump-1700000000.sql",
///     "/backups",
///     "1700000000",
///     SplitMode::PerDatabase,
///     None,
/// )?;
/// println!("{} 个输出文件，根目录 {}", report.files.len(), report.root.display());
/// # Ok::<(), mysql_dump_splitter::SplitError>(())
/// ```
pub fn split_dump_file<P, Q>(
    source: P,
    destination_root: Q,
    timestamp: &str,
    mode: SplitMode,
    database_hint: Option<&str>,
) -> Result<SplitReport, SplitError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let source = source.as_ref();
    let out_root = destination_root.as_ref().join(timestamp);

    // 时间戳目录已存在视为错误：同一目标根 + 同一时间戳的并发调用不安全
    fs::create_dir(&out_root).map_err(|e| SplitError::CreateDir(io_ctx(&out_root, &e)))?;

    if mode == SplitMode::SingleFile {
        return move_whole_dump(source, out_root, database_hint);
    }

    let mut pass = SplitPass {
        out_root,
        mode,
        current_db: None,
        out: None,
        report: SplitReport {
            root: PathBuf::new(),
            files: Vec::new(),
            lines_written: 0,
            lines_discarded: 0,
        },
    };

    // 表级 dump 没有库边界标记，提示的库名充当初始当前库
    if mode == SplitMode::PerDatabaseAndTable
        && let Some(hint) = database_hint
    {
        let dir = pass.out_root.join(hint);
        fs::create_dir_all(&dir).map_err(|e| SplitError::CreateDir(io_ctx(&dir, &e)))?;
        pass.current_db = Some(hint.to_string());
    }

    let file = File::open(source).map_err(|e| SplitError::SourceUnreadable(io_ctx(source, &e)))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut line_no: u64 = 0;

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| SplitError::Read(io_ctx(source, &e)))?;
        if n == 0 {
            break;
        }
        line_no += 1;
        pass.feed(&line, line_no)?;
    }

    pass.finish()?;
    fs::remove_file(source).map_err(|e| SplitError::RemoveSource(io_ctx(source, &e)))?;

    let report = pass.into_report();
    debug!(
        root = %report.root.display(),
        files = report.files.len(),
        lines_written = report.lines_written,
        lines_discarded = report.lines_discarded,
        "dump split complete"
    );
    Ok(report)
}

/// 单趟扫描的有界状态：当前库名 + 至多一个打开的输出句柄
struct SplitPass {
    out_root: PathBuf,
    mode: SplitMode,
    current_db: Option<String>,
    out: Option<BufWriter<File>>,
    report: SplitReport,
}

impl SplitPass {
    /// 处理一行（含行终止符）
    fn feed(&mut self, line: &[u8], line_no: u64) -> Result<(), SplitError> {
        if let Some(from) = marker::database_marker(line) {
            let name = extract_name(line, from, line_no)?;
            match self.mode {
                SplitMode::PerDatabase => {
                    let path = self.out_root.join(format!("{name}.sql"));
                    self.open_output(path)?;
                }
                SplitMode::PerDatabaseAndTable => {
                    // 库边界只切换上下文，句柄等到表边界再开
                    self.close_output()?;
                    let dir = self.out_root.join(&name);
                    fs::create_dir_all(&dir)
                        .map_err(|e| SplitError::CreateDir(io_ctx(&dir, &e)))?;
                    self.current_db = Some(name);
                }
                SplitMode::SingleFile => unreachable!("SingleFile never scans lines"),
            }
            // 库边界行本身不属于任何输出文件
            self.report.lines_discarded += 1;
            return Ok(());
        }

        if self.mode == SplitMode::PerDatabaseAndTable
            && let Some(from) = marker::table_marker(line)
        {
            let name = extract_name(line, from, line_no)?;
            let db = self
                .current_db
                .as_deref()
                .ok_or(SplitError::TableOutsideDatabase { line_no })?;
            let path = self.out_root.join(db).join(format!("{name}.sql"));
            self.open_output(path)?;
            // DROP TABLE 行属于新表的文件
            return self.write_line(line);
        }

        match self.out {
            Some(_) => self.write_line(line),
            None => {
                // 首个标记之前的前导注释
                self.report.lines_discarded += 1;
                Ok(())
            }
        }
    }

    /// 关闭旧句柄（若有），truncate-create 新输出文件
    fn open_output(&mut self, path: PathBuf) -> Result<(), SplitError> {
        self.close_output()?;
        let file = File::create(&path).map_err(|e| SplitError::CreateFile(io_ctx(&path, &e)))?;
        self.out = Some(BufWriter::new(file));
        self.report.files.push(path);
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> Result<(), SplitError> {
        if let Some(out) = self.out.as_mut() {
            out.write_all(line)
                .map_err(|e| SplitError::Write(e.to_string()))?;
            self.report.lines_written += 1;
        }
        Ok(())
    }

    /// 显式 flush 再丢弃句柄；Drop 会吞掉写错误
    fn close_output(&mut self) -> Result<(), SplitError> {
        if let Some(mut out) = self.out.take() {
            out.flush().map_err(|e| SplitError::Write(e.to_string()))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SplitError> {
        self.close_output()
    }

    fn into_report(mut self) -> SplitReport {
        self.report.root = self.out_root;
        self.report
    }
}

/// `SingleFile` 模式：整份 dump 改名移入时间戳目录，跨文件系统时退化为复制+删除
fn move_whole_dump(
    source: &Path,
    out_root: PathBuf,
    database_hint: Option<&str>,
) -> Result<SplitReport, SplitError> {
    if !source.is_file() {
        return Err(SplitError::SourceUnreadable(format!(
            "{}: not a regular file",
            source.display()
        )));
    }

    let stem = database_hint
        .map(str::to_string)
        .or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "dump".to_string());
    let target = out_root.join(format!("{stem}.sql"));

    if fs::rename(source, &target).is_err() {
        fs::copy(source, &target).map_err(|e| SplitError::Write(io_ctx(&target, &e)))?;
        fs::remove_file(source).map_err(|e| SplitError::RemoveSource(io_ctx(source, &e)))?;
    }

    Ok(SplitReport {
        root: out_root,
        files: vec![target],
        lines_written: 0,
        lines_discarded: 0,
    })
}

fn extract_name(line: &[u8], from: usize, line_no: u64) -> Result<String, SplitError> {
    match marker::backtick_name(line, from) {
        Ok(name) => Ok(name.to_string()),
        Err(NameError::MissingBackticks) => Err(SplitError::MalformedMarker {
            line_no,
            line: String::from_utf8_lossy(trim_newline(line)).into_owned(),
        }),
        Err(NameError::Invalid(name)) => Err(SplitError::InvalidName { line_no, name }),
    }
}

fn trim_newline(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

fn io_ctx(path: &Path, e: &io::Error) -> String {
    format!("{}: {}", path.display(), e)
}
