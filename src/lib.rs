//! halo-sql-format：安全的 SQL 片段格式化库（qsprintf 风格的占位符语法）。
//!
//! 每个插入值按其语义角色（字面量 / 标识符 / 注释 / 子片段 / 秘密值）
//! 经由可插拔的 [`Escaper`] 转义，绝不二次转义、绝不把未转义文本当作
//! 可信内容。产出的 [`Fragment`] 不可变，可作为 `%Q` 参数再次组合。

pub mod conversion;
pub mod envelope;
pub mod escaper;
pub mod format;
#[cfg(test)]
mod format_tests;
pub mod fragment;
pub mod macros;
pub use crate::macros::*;
pub mod value;

pub use crate::conversion::{BaseKind, ListJoin, Modifier, Specifier};
pub use crate::envelope::{OpaqueEnvelope, SecretEnvelope, TableRef, TableRefValue};
pub use crate::escaper::{Escaper, MySqlEscaper};
pub use crate::format::{FormatError, SECRET_PLACEHOLDER, format_query, format_query_compat};
pub use crate::fragment::Fragment;
pub use crate::value::{QueryArg, list};
