//! 宏集合：为格式化入口提供可变参数调用封装。
//! 通过 `query!` / `query_compat!`，可以直接书写不定长参数而无需手动创建 `Vec`。

#[doc(hidden)]
#[macro_export]
macro_rules! __collect_args {
    () => {
        Vec::<$crate::value::QueryArg>::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut values = Vec::<$crate::value::QueryArg>::new();
        $(
            values.push($crate::value::QueryArg::from($value));
        )*
        values
    }};
}

/// 可变参数形式的 [`crate::format::format_query`]。
///
/// ```
/// use halo_format::{MySqlEscaper, query};
///
/// let f = query!(&MySqlEscaper, "SELECT %C FROM %T WHERE id = %d", "name", "user", 42_i64)
///     .unwrap();
/// assert_eq!(f.unmasked_text(), "SELECT `name` FROM `user` WHERE id = 42");
/// ```
#[macro_export]
macro_rules! query {
    ($escaper:expr, $pattern:expr $(, $arg:expr)* $(,)?) => {
        $crate::format::format_query($escaper, $pattern, $crate::__collect_args!($($arg),*))
    };
}
pub use crate::query;

/// 可变参数形式的 [`crate::format::format_query_compat`]。
#[macro_export]
macro_rules! query_compat {
    ($escaper:expr, $pattern:expr $(, $arg:expr)* $(,)?) => {
        $crate::format::format_query_compat($escaper, $pattern, $crate::__collect_args!($($arg),*))
    };
}
pub use crate::query_compat;
