//! 标记行识别
//!
//! mysqldump 输出中有两类边界标记：
//!
//! ```text
//! -- Current Database: `shop`
//! DROP TABLE IF EXISTS `orders`;
//! ```
//!
//! 识别按**精确子串**进行，库/表名取标记之后第一对反引号之间的内容。
//! 整个模块工作在原始字节上，含二进制 blob 行的 dump 不会中断扫描。

use memchr::memchr;
use memchr::memmem::Finder;
use once_cell::sync::Lazy;

/// 库边界标记子串
pub const DATABASE_MARKER: &str = "Current Database:";

/// 表边界标记子串
pub const TABLE_MARKER: &str = "DROP TABLE";

// 预编译的子串查找器，跨行复用
static DATABASE_FINDER: Lazy<Finder<'static>> = Lazy::new(|| Finder::new(DATABASE_MARKER));
static TABLE_FINDER: Lazy<Finder<'static>> = Lazy::new(|| Finder::new(TABLE_MARKER));

/// 名称提取失败的原因，由切分器补充行号后转为 [`crate::SplitError`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NameError {
    /// 标记后面凑不齐一对反引号
    MissingBackticks,
    /// 非 UTF-8 或包含不允许出现在文件名中的字符
    Invalid(String),
}

/// 若行内含库边界标记，返回标记结束处的字节偏移
#[inline]
pub fn database_marker(line: &[u8]) -> Option<usize> {
    DATABASE_FINDER
        .find(line)
        .map(|pos| pos + DATABASE_MARKER.len())
}

/// 若行内含表边界标记，返回标记结束处的字节偏移
#[inline]
pub fn table_marker(line: &[u8]) -> Option<usize> {
    TABLE_FINDER.find(line).map(|pos| pos + TABLE_MARKER.len())
}

/// 提取 `from` 偏移之后第一对反引号之间的名称。
///
/// 少于两个反引号是畸形输入，必须报错而不是带错名字继续切分。
/// 名称会拼进输出路径，因此空名、`..`、路径分隔符和 NUL 一并拒绝。
pub(crate) fn backtick_name(line: &[u8], from: usize) -> Result<&str, NameError> {
    let rest = &line[from..];
    let open = memchr(b'`', rest).ok_or(NameError::MissingBackticks)?;
    let after_open = &rest[open + 1..];
    let close = memchr(b'`', after_open).ok_or(NameError::MissingBackticks)?;
    let raw = &after_open[..close];

    let name = std::str::from_utf8(raw)
        .map_err(|_| NameError::Invalid(String::from_utf8_lossy(raw).into_owned()))?;

    if name.is_empty()
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(NameError::Invalid(name.to_string()));
    }

    Ok(name)
}
