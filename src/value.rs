//! QueryArg：格式化参数的封闭类型集合。
//!
//! 转换说明符只面向这组固定形状做匹配；匹配逻辑见 `conversion`。

use crate::envelope::{SecretEnvelope, TableRef};
use crate::fragment::Fragment;
use std::borrow::Cow;

/// 一次格式化调用中绑定到某个转换说明符的参数值。
#[derive(Clone)]
pub enum QueryArg {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(Cow<'static, str>),
    Bytes(Vec<u8>),
    /// 列表说明符（`%L?`）的参数形状；元素逐个按基础类别校验。
    List(Vec<QueryArg>),
    /// 已转义片段（`%Q`）：嵌入时原样替换，不再二次转义。
    Fragment(Fragment),
    /// 秘密值信封（`%P`）。
    Secret(Box<dyn SecretEnvelope>),
    /// 库名 + 表名引用（`%R`）。
    Ref(Box<dyn TableRef>),
}

impl QueryArg {
    /// 把 `Option<T>` 映射为参数：`None => Null`。
    pub fn from_option<T: Into<QueryArg>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    /// 是否是标量（可被 `%s` 一类字符串类别接收）。
    pub(crate) fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::I64(_) | Self::U64(_) | Self::F64(_) | Self::Str(_)
        )
    }
}

impl std::fmt::Debug for QueryArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Self::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Self::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Fragment(v) => f.debug_tuple("Fragment").field(v).finish(),
            // 秘密值绝不进入 Debug 输出
            Self::Secret(_) => f.write_str("Secret(..)"),
            Self::Ref(v) => f.debug_tuple("Ref").field(v).finish(),
        }
    }
}

impl PartialEq for QueryArg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Fragment(a), Self::Fragment(b)) => a == b,
            // 能力对象不做内容比较
            (Self::Secret(_), _) | (_, Self::Secret(_)) => false,
            (Self::Ref(_), _) | (_, Self::Ref(_)) => false,
            _ => false,
        }
    }
}

impl From<()> for QueryArg {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for QueryArg {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for QueryArg {
    fn from(v: i8) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i16> for QueryArg {
    fn from(v: i16) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i32> for QueryArg {
    fn from(v: i32) -> Self {
        Self::I64(v as i64)
    }
}

impl From<i64> for QueryArg {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u8> for QueryArg {
    fn from(v: u8) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u16> for QueryArg {
    fn from(v: u16) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u32> for QueryArg {
    fn from(v: u32) -> Self {
        Self::U64(v as u64)
    }
}

impl From<u64> for QueryArg {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f32> for QueryArg {
    fn from(v: f32) -> Self {
        Self::F64(v as f64)
    }
}

impl From<f64> for QueryArg {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for QueryArg {
    fn from(v: String) -> Self {
        Self::Str(Cow::Owned(v))
    }
}

impl From<&'static str> for QueryArg {
    fn from(v: &'static str) -> Self {
        Self::Str(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for QueryArg {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Fragment> for QueryArg {
    fn from(v: Fragment) -> Self {
        Self::Fragment(v)
    }
}

impl From<&Fragment> for QueryArg {
    fn from(v: &Fragment) -> Self {
        Self::Fragment(v.clone())
    }
}

impl From<crate::envelope::OpaqueEnvelope> for QueryArg {
    fn from(v: crate::envelope::OpaqueEnvelope) -> Self {
        Self::Secret(Box::new(v))
    }
}

impl From<Box<dyn SecretEnvelope>> for QueryArg {
    fn from(v: Box<dyn SecretEnvelope>) -> Self {
        Self::Secret(v)
    }
}

impl From<crate::envelope::TableRefValue> for QueryArg {
    fn from(v: crate::envelope::TableRefValue) -> Self {
        Self::Ref(Box::new(v))
    }
}

impl From<Box<dyn TableRef>> for QueryArg {
    fn from(v: Box<dyn TableRef>) -> Self {
        Self::Ref(v)
    }
}

impl<T> From<Option<T>> for QueryArg
where
    T: Into<QueryArg>,
{
    fn from(v: Option<T>) -> Self {
        Self::from_option(v)
    }
}

/// List：把一组可转换值收集为列表参数（`%L?` 的参数形状）。
///
/// `Vec<u8>` 的 `From` 已被二进制串占用，列表统一经由本函数构造。
pub fn list<T: Into<QueryArg>>(items: impl IntoIterator<Item = T>) -> QueryArg {
    QueryArg::List(items.into_iter().map(Into::into).collect())
}
