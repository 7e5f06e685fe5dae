//! Fragment：一次格式化调用产出的“已转义 SQL 文本”不可变值。
//!
//! 同时持有掩码 / 非掩码两份渲染：掩码版把秘密值替换为固定占位，可安全
//! 打日志；非掩码版才是可执行文本。Fragment 可以作为 `%Q` 参数再次参与
//! 格式化，嵌入时原样替换、不再二次转义。

use std::fmt;

/// 不可变的已转义 SQL 片段。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    unmasked: String,
    masked: String,
}

impl Fragment {
    pub(crate) fn new(unmasked: String, masked: String) -> Self {
        Self { unmasked, masked }
    }

    /// 可执行文本（包含已揭示的秘密值）。
    pub fn unmasked_text(&self) -> &str {
        &self.unmasked
    }

    /// 日志安全文本（秘密值已替换为占位）。
    pub fn masked_text(&self) -> &str {
        &self.masked
    }

    /// 两份渲染是否一致（不含秘密绑定时恒为 true）。
    pub fn is_unmasked_safe(&self) -> bool {
        self.unmasked == self.masked
    }
}

// Display/Debug 走掩码版：把 Fragment 直接塞进日志不会泄露秘密。
impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fragment").field(&self.masked).finish()
    }
}
