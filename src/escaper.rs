//! Escaper：可插拔的方言转义能力（字符串 / 二进制 / 标识符 / 注释 / LIKE 体）。
//!
//! 安全要求：每个原语的输出在被原样拼入 SQL 后，都不能提前终止或逃出
//! 其外层的引号 / 注释上下文。格式化引擎只负责策略层，所有方言细节在这里。

/// 方言转义能力。引擎按 `&dyn Escaper` 消费，能力集由 trait 在编译期保证完整。
pub trait Escaper {
    /// 把 UTF-8 字符串转义为带引号的字符串字面量。
    fn escape_string(&self, text: &str) -> String;

    /// 把二进制串转义为字面量（通常是 hex 形式）。
    fn escape_binary(&self, bytes: &[u8]) -> String;

    /// 把列名 / 表名转义为带引号的标识符；绝不能按字符串字面量处理。
    fn escape_identifier(&self, name: &str) -> String;

    /// 把任意文本转义为多行注释，内容不能提前闭合注释。
    fn escape_comment(&self, text: &str) -> String;

    /// 转义 LIKE 模式体（不带引号），需要中和 `%`/`_` 等元字符。
    fn escape_like_body(&self, text: &str) -> String;
}

/// MySQL 方言的 Escaper 实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlEscaper;

impl Escaper for MySqlEscaper {
    fn escape_string(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        push_escaped_chars(&mut out, text);
        out.push('\'');
        out
    }

    fn escape_binary(&self, bytes: &[u8]) -> String {
        // X'..' 的 hex 字面量：对任意字节安全，无需处理引号。
        let mut out = String::with_capacity(bytes.len() * 2 + 3);
        out.push_str("X'");
        push_hex(&mut out, bytes);
        out.push('\'');
        out
    }

    fn escape_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        out.push('`');
        for ch in name.chars() {
            match ch {
                '`' => out.push_str("``"),
                // NUL 在标识符里没有合法位置，直接剔除
                '\u{0000}' => {}
                _ => out.push(ch),
            }
        }
        out.push('`');
        out
    }

    fn escape_comment(&self, text: &str) -> String {
        // 拆散 "*/"，内容无法提前闭合注释。
        let body = text.replace("*/", "* /");
        let mut out = String::with_capacity(body.len() + 8);
        out.push_str("/* ");
        out.push_str(&body);
        out.push_str(" */");
        out
    }

    fn escape_like_body(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '%' => out.push_str("\\%"),
                '_' => out.push_str("\\_"),
                _ => push_escaped_char(&mut out, ch),
            }
        }
        out
    }
}

fn push_escaped_chars(out: &mut String, s: &str) {
    for ch in s.chars() {
        push_escaped_char(out, ch);
    }
}

fn push_escaped_char(out: &mut String, ch: char) {
    match ch {
        '\u{0000}' => out.push_str("\\0"),
        '\u{0008}' => out.push_str("\\b"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{001a}' => out.push_str("\\Z"),
        '\'' => out.push_str("\\'"),
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        _ => out.push(ch),
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}
