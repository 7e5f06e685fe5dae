//! OpaqueEnvelope 与 TableRef：格式化引擎消费的两个外部参数能力。
//!
//! 秘密值默认不可见：只有显式 `reveal()` 才会取出真实内容，且只在
//! 非掩码渲染路径上被调用。

use std::borrow::Cow;
use std::fmt;

/// 秘密值信封能力：默认渲染绝不暴露内容。
pub trait SecretEnvelope: dyn_clone::DynClone + fmt::Debug {
    /// 显式取出真实值；只允许在非掩码渲染时调用。
    fn reveal(&self) -> String;
}

dyn_clone::clone_trait_object!(SecretEnvelope);

/// 自带的信封实现：`Debug` 输出固定占位，不含真实值。
#[derive(Clone)]
pub struct OpaqueEnvelope {
    value: Cow<'static, str>,
}

impl OpaqueEnvelope {
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Debug for OpaqueEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueEnvelope(<secret>)")
    }
}

impl SecretEnvelope for OpaqueEnvelope {
    fn reveal(&self) -> String {
        self.value.clone().into_owned()
    }
}

/// 库名 + 表名引用能力（`%R` 的参数形状）。
pub trait TableRef: dyn_clone::DynClone + fmt::Debug {
    fn database_name(&self) -> &str;
    fn table_name(&self) -> &str;
}

dyn_clone::clone_trait_object!(TableRef);

/// 自带的 TableRef 实现。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRefValue {
    database: String,
    table: String,
}

impl TableRefValue {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

impl TableRef for TableRefValue {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn table_name(&self) -> &str {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::{OpaqueEnvelope, SecretEnvelope, TableRef, TableRefValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_debug_never_prints_value() {
        let env = OpaqueEnvelope::new("hunter2");
        assert_eq!(format!("{env:?}"), "OpaqueEnvelope(<secret>)");
        assert_eq!(env.reveal(), "hunter2");
    }

    #[test]
    fn table_ref_accessors() {
        let r = TableRefValue::new("app", "user");
        assert_eq!(r.database_name(), "app");
        assert_eq!(r.table_name(), "user");
    }
}
