//! 格式化引擎：扫描 pattern、校验参数形状、按策略分发转义并产出 [`Fragment`]。
//!
//! 三条硬性约定：
//!
//! - 标记数与参数数不符时，在调用任何转义原语之前失败（fail fast）；
//! - 形状校验先于全部替换，第一处不匹配即失败，不产出部分结果；
//! - 每个标记替换进输出缓冲的都是“已是文本”的结果，扫描不回溯、
//!   不重新解释已替换内容。

use crate::conversion::{self, BaseKind, ListJoin, Modifier, Specifier};
use crate::escaper::Escaper;
use crate::fragment::Fragment;
use crate::value::QueryArg;
use std::borrow::Cow;

/// 掩码渲染里替换秘密值的固定占位（定长）。
pub const SECRET_PLACEHOLDER: &str = "********";

/// 格式化错误：全部同步产生、调用内不可恢复。
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    /// 标记的说明符文本不在说明符表里。
    #[error("format unknown conversion {conversion}")]
    UnknownConversion { conversion: String },

    /// 标记数与参数数不一致。
    #[error("format expected {markers} argument(s), got {args}")]
    ArgCountMismatch { markers: usize, args: usize },

    /// 参数形状与说明符声明不符。错误里只携带 pattern，绝不携带参数值。
    #[error("format parameter for {conversion} must be {expected} in pattern {pattern:?}")]
    ParameterMismatch {
        conversion: String,
        expected: &'static str,
        pattern: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Masked,
    Unmasked,
}

/// 按 pattern 与参数序列构建 [`Fragment`]。
///
/// 裸字符串出现在 `%Q` 位置会被拒绝；兼容旧调用方请用
/// [`format_query_compat`]。可变参数形式见 [`crate::query!`]。
pub fn format_query(
    escaper: &dyn Escaper,
    pattern: &str,
    args: impl IntoIterator<Item = impl Into<QueryArg>>,
) -> Result<Fragment, FormatError> {
    let args: Vec<QueryArg> = args.into_iter().map(Into::into).collect();
    format_inner(escaper, pattern, args, false)
}

/// 与 [`format_query`] 相同，但 `%Q` 位置的裸字符串会告警后按
/// 已转义文本接受。这是面向旧调用方的显式选择，不是默认行为。
pub fn format_query_compat(
    escaper: &dyn Escaper,
    pattern: &str,
    args: impl IntoIterator<Item = impl Into<QueryArg>>,
) -> Result<Fragment, FormatError> {
    let args: Vec<QueryArg> = args.into_iter().map(Into::into).collect();
    format_inner(escaper, pattern, args, true)
}

fn format_inner(
    escaper: &dyn Escaper,
    pattern: &str,
    mut args: Vec<QueryArg>,
    lenient_fragment: bool,
) -> Result<Fragment, FormatError> {
    let specs = scan_specifiers(pattern)?;

    if specs.len() != args.len() {
        return Err(FormatError::ArgCountMismatch {
            markers: specs.len(),
            args: args.len(),
        });
    }

    for (spec, arg) in specs.iter().zip(args.iter_mut()) {
        spec.bind(arg, lenient_fragment)
            .map_err(|expected| FormatError::ParameterMismatch {
                conversion: spec.text(),
                expected,
                pattern: pattern.to_string(),
            })?;
    }

    let unmasked = render(escaper, pattern, &specs, &args, Mode::Unmasked);
    let masked = if needs_dual_render(&args) {
        render(escaper, pattern, &specs, &args, Mode::Masked)
    } else {
        unmasked.clone()
    };

    Ok(Fragment::new(unmasked, masked))
}

/// 扫描 pattern，按出现顺序收集说明符；`%%` 不占槽位。
fn scan_specifiers(pattern: &str) -> Result<Vec<Specifier>, FormatError> {
    let mut specs = Vec::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('%') {
        rest = &rest[pos + 1..];
        if let Some(tail) = rest.strip_prefix('%') {
            rest = tail;
            continue;
        }
        let Some(spec) = Specifier::parse(rest) else {
            return Err(FormatError::UnknownConversion {
                conversion: conversion::unknown_marker_text(rest),
            });
        };
        rest = &rest[spec.marker_len() - 1..];
        specs.push(spec);
    }

    Ok(specs)
}

/// 只有存在秘密绑定（直接、列表内或嵌入片段携带）时才需要双份渲染。
fn needs_dual_render(args: &[QueryArg]) -> bool {
    fn carries_secret(arg: &QueryArg) -> bool {
        match arg {
            QueryArg::Secret(_) => true,
            QueryArg::Fragment(f) => !f.is_unmasked_safe(),
            QueryArg::List(items) => items.iter().any(carries_secret),
            _ => false,
        }
    }
    args.iter().any(carries_secret)
}

/// 单次前向扫描：把每个标记替换为其参数的转义文本，其余字符原样保留。
///
/// 形状已在 `bind` 阶段校验，渲染本身不会失败。
fn render(
    escaper: &dyn Escaper,
    pattern: &str,
    specs: &[Specifier],
    args: &[QueryArg],
    mode: Mode,
) -> String {
    let mut out = String::with_capacity(pattern.len() + args.len() * 16);
    let mut rest = pattern;
    let mut slot = 0usize;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        if let Some(tail) = rest.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }
        let spec = &specs[slot];
        let arg = &args[slot];
        slot += 1;
        rest = &rest[spec.marker_len() - 1..];
        emit(escaper, spec, arg, mode, &mut out);
    }

    out.push_str(rest);
    out
}

/// 策略层：按修饰符分发一个 (说明符, 参数) 的替换文本。
fn emit(escaper: &dyn Escaper, spec: &Specifier, arg: &QueryArg, mode: Mode, out: &mut String) {
    match spec.modifier {
        Modifier::None => emit_base(escaper, spec.base, arg, mode, out),
        Modifier::Nullable => {
            if matches!(arg, QueryArg::Null) {
                out.push_str("NULL");
            } else {
                emit_base(escaper, spec.base, arg, mode, out);
            }
        }
        Modifier::NullableTest => {
            if matches!(arg, QueryArg::Null) {
                out.push_str("IS NULL");
            } else {
                out.push_str("= ");
                emit_base(escaper, spec.base, arg, mode, out);
            }
        }
        Modifier::List(join) => {
            if let QueryArg::List(items) = arg {
                match join {
                    ListJoin::Comma => {
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                out.push_str(", ");
                            }
                            emit_base(escaper, spec.base, item, mode, out);
                        }
                    }
                    ListJoin::And | ListJoin::Or => {
                        let sep = match join {
                            ListJoin::And => ") AND (",
                            _ => ") OR (",
                        };
                        out.push('(');
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                out.push_str(sep);
                            }
                            emit_base(escaper, BaseKind::Fragment, item, mode, out);
                        }
                        out.push(')');
                    }
                }
            }
        }
    }
}

/// 基础类别的转义分发；未被校验规则覆盖的分支不可达，按空替换处理。
fn emit_base(escaper: &dyn Escaper, base: BaseKind, arg: &QueryArg, mode: Mode, out: &mut String) {
    match base {
        BaseKind::Int => match arg {
            // 非可空位置的 NULL 按数值零渲染（与字符串类别的空串一致）
            QueryArg::Null => out.push('0'),
            QueryArg::Bool(b) => out.push(if *b { '1' } else { '0' }),
            QueryArg::I64(n) => out.push_str(&n.to_string()),
            QueryArg::U64(n) => out.push_str(&n.to_string()),
            _ => {}
        },
        BaseKind::Float => match arg {
            QueryArg::Null => out.push('0'),
            QueryArg::Bool(b) => out.push(if *b { '1' } else { '0' }),
            QueryArg::I64(n) => out.push_str(&n.to_string()),
            QueryArg::U64(n) => out.push_str(&n.to_string()),
            QueryArg::F64(n) => out.push_str(&n.to_string()),
            _ => {}
        },
        BaseKind::Str => out.push_str(&escaper.escape_string(&scalar_text(arg))),
        BaseKind::Binary => match arg {
            QueryArg::Bytes(b) => out.push_str(&escaper.escape_binary(b)),
            other => out.push_str(&escaper.escape_binary(scalar_text(other).as_bytes())),
        },
        BaseKind::Column | BaseKind::Table => {
            if let QueryArg::Str(name) = arg {
                out.push_str(&escaper.escape_identifier(name));
            }
        }
        BaseKind::Ref => {
            if let QueryArg::Ref(r) = arg {
                out.push_str(&escaper.escape_identifier(r.database_name()));
                out.push('.');
                out.push_str(&escaper.escape_identifier(r.table_name()));
            }
        }
        BaseKind::Comment => out.push_str(&escaper.escape_comment(&scalar_text(arg))),
        BaseKind::LikeSub | BaseKind::LikePrefix | BaseKind::LikeSuffix => {
            let body = escaper.escape_like_body(&scalar_text(arg));
            out.push('\'');
            if matches!(base, BaseKind::LikeSub | BaseKind::LikeSuffix) {
                out.push('%');
            }
            out.push_str(&body);
            if matches!(base, BaseKind::LikeSub | BaseKind::LikePrefix) {
                out.push('%');
            }
            out.push('\'');
        }
        BaseKind::Fragment => match arg {
            // 信任组合：片段文本原样替换，不再转义
            QueryArg::Fragment(f) => out.push_str(match mode {
                Mode::Unmasked => f.unmasked_text(),
                Mode::Masked => f.masked_text(),
            }),
            // 兼容路径：裸字符串已在校验阶段告警通过
            QueryArg::Str(s) => out.push_str(s),
            _ => {}
        },
        BaseKind::Secret => {
            if let QueryArg::Secret(env) = arg {
                match mode {
                    Mode::Masked => out.push_str(&escaper.escape_string(SECRET_PLACEHOLDER)),
                    Mode::Unmasked => out.push_str(&escaper.escape_string(&env.reveal())),
                }
            }
        }
    }
}

/// 标量参数的文本形式（字符串类别公用）：NULL 按空串处理。
fn scalar_text(arg: &QueryArg) -> Cow<'_, str> {
    match arg {
        QueryArg::Null => Cow::Borrowed(""),
        QueryArg::Bool(b) => Cow::Borrowed(if *b { "1" } else { "0" }),
        QueryArg::I64(n) => Cow::Owned(n.to_string()),
        QueryArg::U64(n) => Cow::Owned(n.to_string()),
        QueryArg::F64(n) => Cow::Owned(n.to_string()),
        QueryArg::Str(s) => Cow::Borrowed(s.as_ref()),
        _ => Cow::Borrowed(""),
    }
}
