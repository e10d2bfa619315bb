use mysql_dump_splitter::{SplitMode, split_dump_file};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_dump(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("dump.sql");
    fs::write(&path, content).unwrap();
    path
}

const SPEC_SCENARIO: &str = "-- dump preamble\n\
-- Current Database: `shop`\n\
DROP TABLE IF EXISTS `orders`;\n\
INSERT INTO orders VALUES (1);\n";

#[test]
fn per_database_single_database() {
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), SPEC_SCENARIO);

    let report = split_dump_file(
        &source,
        dir.path(),
        "1700000000",
        SplitMode::PerDatabase,
        None,
    )
    .unwrap();

    assert_eq!(report.root, dir.path().join("1700000000"));
    assert_eq!(report.files, vec![report.root.join("shop.sql")]);

    // 库边界行不写出，前导注释丢弃，其余行原样保留
    let content = fs::read_to_string(&report.files[0]).unwrap();
    assert_eq!(
        content,
        "DROP TABLE IF EXISTS `orders`;\nINSERT INTO orders VALUES (1);\n"
    );
    assert_eq!(report.lines_written, 2);
    assert_eq!(report.lines_discarded, 2);
}

#[test]
fn per_database_and_table_single_database() {
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), SPEC_SCENARIO);

    let report = split_dump_file(
        &source,
        dir.path(),
        "1700000000",
        SplitMode::PerDatabaseAndTable,
        None,
    )
    .unwrap();

    let table_file = report.root.join("shop").join("orders.sql");
    assert_eq!(report.files, vec![table_file.clone()]);

    // DROP TABLE 行属于新表文件；库边界行在表模式下不写任何句柄
    let content = fs::read_to_string(&table_file).unwrap();
    assert_eq!(
        content,
        "DROP TABLE IF EXISTS `orders`;\nINSERT INTO orders VALUES (1);\n"
    );
}

#[test]
fn per_database_multiple_databases() {
    let dump = "-- preamble\n\
-- Current Database: `shop`\n\
INSERT INTO orders VALUES (1);\n\
-- Current Database: `crm`\n\
INSERT INTO leads VALUES (2);\n\
INSERT INTO leads VALUES (3);\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report =
        split_dump_file(&source, dir.path(), "ts", SplitMode::PerDatabase, None).unwrap();

    assert_eq!(
        report.files,
        vec![report.root.join("shop.sql"), report.root.join("crm.sql")]
    );
    assert_eq!(
        fs::read_to_string(&report.files[0]).unwrap(),
        "INSERT INTO orders VALUES (1);\n"
    );
    assert_eq!(
        fs::read_to_string(&report.files[1]).unwrap(),
        "INSERT INTO leads VALUES (2);\nINSERT INTO leads VALUES (3);\n"
    );
}

#[test]
fn table_mode_nests_tables_under_latest_database() {
    // 表边界始终归属最近一次出现的库边界
    let dump = "-- Current Database: `shop`\n\
CREATE DATABASE shop;\n\
DROP TABLE IF EXISTS `orders`;\n\
INSERT INTO orders VALUES (1);\n\
-- Current Database: `crm`\n\
CREATE DATABASE crm;\n\
DROP TABLE IF EXISTS `leads`;\n\
INSERT INTO leads VALUES (2);\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report = split_dump_file(
        &source,
        dir.path(),
        "ts",
        SplitMode::PerDatabaseAndTable,
        None,
    )
    .unwrap();

    assert_eq!(
        report.files,
        vec![
            report.root.join("shop").join("orders.sql"),
            report.root.join("crm").join("leads.sql"),
        ]
    );
    // 库边界之后、首个表边界之前的行（CREATE DATABASE）没有打开的句柄，丢弃
    assert_eq!(
        fs::read_to_string(&report.files[0]).unwrap(),
        "DROP TABLE IF EXISTS `orders`;\nINSERT INTO orders VALUES (1);\n"
    );
    assert_eq!(
        fs::read_to_string(&report.files[1]).unwrap(),
        "DROP TABLE IF EXISTS `leads`;\nINSERT INTO leads VALUES (2);\n"
    );
}

#[test]
fn table_mode_multiple_tables_per_database() {
    let dump = "-- Current Database: `shop`\n\
DROP TABLE IF EXISTS `orders`;\n\
INSERT INTO orders VALUES (1);\n\
DROP TABLE IF EXISTS `users`;\n\
INSERT INTO users VALUES (2);\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report = split_dump_file(
        &source,
        dir.path(),
        "ts",
        SplitMode::PerDatabaseAndTable,
        None,
    )
    .unwrap();

    assert_eq!(report.files.len(), 2);
    assert_eq!(
        fs::read_to_string(report.root.join("shop/orders.sql")).unwrap(),
        "DROP TABLE IF EXISTS `orders`;\nINSERT INTO orders VALUES (1);\n"
    );
    assert_eq!(
        fs::read_to_string(report.root.join("shop/users.sql")).unwrap(),
        "DROP TABLE IF EXISTS `users`;\nINSERT INTO users VALUES (2);\n"
    );
}

#[test]
fn table_mode_with_database_hint() {
    // 表级导出：没有库边界标记，提示的库名决定子目录
    let dump = "DROP TABLE IF EXISTS `orders`;\nINSERT INTO orders VALUES (1);\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report = split_dump_file(
        &source,
        dir.path(),
        "ts",
        SplitMode::PerDatabaseAndTable,
        Some("shop"),
    )
    .unwrap();

    assert_eq!(report.files, vec![report.root.join("shop").join("orders.sql")]);
    assert_eq!(fs::read_to_string(&report.files[0]).unwrap(), dump);
}

#[test]
fn completeness_no_line_lost_or_duplicated() {
    // P1：所有输出拼接 = 首个标记之后的全部行，去掉库边界行
    let dump = "-- header\n\
-- Current Database: `a`\n\
line a1\n\
line a2\n\
-- Current Database: `b`\n\
line b1\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report =
        split_dump_file(&source, dir.path(), "ts", SplitMode::PerDatabase, None).unwrap();

    let mut concatenated = String::new();
    for file in &report.files {
        concatenated.push_str(&fs::read_to_string(file).unwrap());
    }
    let expected: String = dump
        .lines()
        .skip(1) // 前导行
        .filter(|l| !l.contains("Current Database:"))
        .map(|l| format!("{l}\n"))
        .collect();
    assert_eq!(concatenated, expected);
}

#[test]
fn split_is_deterministic_across_destinations() {
    // P2：同一输入切进两个不同目标根，产出逐字节一致
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    let source_a = write_dump(dir_a.path(), SPEC_SCENARIO);
    let source_b = write_dump(dir_b.path(), SPEC_SCENARIO);

    let report_a =
        split_dump_file(&source_a, dir_a.path(), "ts", SplitMode::PerDatabase, None).unwrap();
    let report_b =
        split_dump_file(&source_b, dir_b.path(), "ts", SplitMode::PerDatabase, None).unwrap();

    assert_eq!(report_a.files.len(), report_b.files.len());
    for (a, b) in report_a.files.iter().zip(&report_b.files) {
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn crlf_terminators_preserved_verbatim() {
    let dump = "-- Current Database: `shop`\r\nINSERT INTO t VALUES (1);\r\n";
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), dump);

    let report =
        split_dump_file(&source, dir.path(), "ts", SplitMode::PerDatabase, None).unwrap();
    assert_eq!(
        fs::read(&report.files[0]).unwrap(),
        b"INSERT INTO t VALUES (1);\r\n"
    );
}

#[test]
fn source_deleted_on_success() {
    let dir = tempdir().unwrap();
    let source = write_dump(dir.path(), SPEC_SCENARIO);

    split_dump_file(&source, dir.path(), "ts", SplitMode::PerDatabase, None).unwrap();
    assert!(!source.exists());
}
