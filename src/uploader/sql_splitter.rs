// ==========================================
// 门店运营数据导入 - SQL 语句拆分
// ==========================================
// 规则: 按行扫描
// - 一行中 `$$` 出现奇数次时切换函数体状态
// - 函数体外的整行 `--` 注释丢弃
// - 函数体外、去空白后以 `;` 结尾时结束一条语句
// - 末尾无分号的内容作为最后一条语句
// 限制: 不处理字符串字面量中的 `;` / `$$`，也不处理 `$tag$`
// ==========================================

/// 拆分 SQL 文本为语句列表（保持原有顺序）
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_dollar_quote = false;

    for line in sql.lines() {
        let stripped = line.trim();
        if !in_dollar_quote && stripped.starts_with("--") {
            continue;
        }

        if line.matches("$$").count() % 2 == 1 {
            in_dollar_quote = !in_dollar_quote;
        }

        current.push_str(line);
        current.push('\n');

        if !in_dollar_quote && stripped.ends_with(';') {
            push_statement(&mut statements, &current);
            current.clear();
        }
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim();
    if stmt.is_empty() || stmt == ";" || stmt.starts_with("--") {
        return;
    }
    statements.push(stmt.to_string());
}
