#[cfg(test)]
mod tests {
    use crate::envelope::{OpaqueEnvelope, TableRefValue};
    use crate::escaper::{Escaper, MySqlEscaper};
    use crate::format::{FormatError, SECRET_PLACEHOLDER, format_query, format_query_compat};
    use crate::value::{QueryArg, list};
    use crate::{query, query_compat};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// 统计每个转义原语被调用次数的测试 Escaper。
    #[derive(Default)]
    struct CountingEscaper {
        calls: Cell<usize>,
    }

    impl CountingEscaper {
        fn bump(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl Escaper for CountingEscaper {
        fn escape_string(&self, text: &str) -> String {
            self.bump();
            MySqlEscaper.escape_string(text)
        }

        fn escape_binary(&self, bytes: &[u8]) -> String {
            self.bump();
            MySqlEscaper.escape_binary(bytes)
        }

        fn escape_identifier(&self, name: &str) -> String {
            self.bump();
            MySqlEscaper.escape_identifier(name)
        }

        fn escape_comment(&self, text: &str) -> String {
            self.bump();
            MySqlEscaper.escape_comment(text)
        }

        fn escape_like_body(&self, text: &str) -> String {
            self.bump();
            MySqlEscaper.escape_like_body(text)
        }
    }

    fn unescaped_quote_count(s: &str) -> usize {
        let mut n = 0usize;
        let mut escaping = false;
        for c in s.chars() {
            if escaping {
                escaping = false;
                continue;
            }
            match c {
                '\\' => escaping = true,
                '\'' => n += 1,
                _ => {}
            }
        }
        n
    }

    #[test]
    fn plain_text_and_percent_literal() {
        let f = query!(&MySqlEscaper, "SELECT 100%% FROM x").unwrap();
        assert_eq!(f.unmasked_text(), "SELECT 100% FROM x");
    }

    #[test]
    fn scalar_kinds() {
        let e = MySqlEscaper;
        let f = query!(&e, "%d | %f | %s | %B", 42_i64, 1.5_f64, "a'b", vec![0xAB_u8]).unwrap();
        assert_eq!(f.unmasked_text(), "42 | 1.5 | 'a\\'b' | X'AB'");
    }

    #[test]
    fn identifier_kinds() {
        let e = MySqlEscaper;
        let f = query!(&e, "SELECT %C FROM %T", "na`me", "user").unwrap();
        assert_eq!(f.unmasked_text(), "SELECT `na``me` FROM `user`");
    }

    #[test]
    fn table_ref_joins_with_dot() {
        let e = MySqlEscaper;
        let f = query!(&e, "SELECT * FROM %R", TableRefValue::new("app", "user")).unwrap();
        assert_eq!(f.unmasked_text(), "SELECT * FROM `app`.`user`");
    }

    #[test]
    fn comment_kind() {
        let e = MySqlEscaper;
        let f = query!(&e, "SELECT 1 %K", "trace: abc */ def").unwrap();
        assert_eq!(f.unmasked_text(), "SELECT 1 /* trace: abc * / def */");
    }

    #[test]
    fn quote_balance_for_quoted_strings() {
        let e = MySqlEscaper;
        for s in ["I'm fine", "'';--", "a\\'b", "'"] {
            let f = query!(&e, "WHERE name = %s", s.to_string()).unwrap();
            assert_eq!(unescaped_quote_count(f.unmasked_text()) % 2, 0, "{s:?}");
        }
    }

    #[test]
    fn nullable_renders_null_literal() {
        let e = MySqlEscaper;
        let f = query!(&e, "VALUES (%nd, %ns)", QueryArg::Null, QueryArg::Null).unwrap();
        assert_eq!(f.unmasked_text(), "VALUES (NULL, NULL)");

        let f = query!(&e, "VALUES (%nd, %ns)", 5_i64, "x").unwrap();
        assert_eq!(f.unmasked_text(), "VALUES (5, 'x')");
    }

    #[test]
    fn nullable_test_rewrites_equality() {
        let e = MySqlEscaper;
        let f = query!(&e, "WHERE id %=d", QueryArg::Null).unwrap();
        assert_eq!(f.unmasked_text(), "WHERE id IS NULL");

        let f = query!(&e, "WHERE id %=d", 5_i64).unwrap();
        assert_eq!(f.unmasked_text(), "WHERE id = 5");

        let f = query!(&e, "WHERE name %=s", "bo'b").unwrap();
        assert_eq!(f.unmasked_text(), "WHERE name = 'bo\\'b'");
    }

    #[test]
    fn int_list_joins_with_comma() {
        let e = MySqlEscaper;
        let f = query!(&e, "WHERE id IN (%Ld)", list(vec![1_i64, 2, 3])).unwrap();
        assert_eq!(f.unmasked_text(), "WHERE id IN (1, 2, 3)");
    }

    #[test]
    fn empty_list_is_rejected() {
        let e = MySqlEscaper;
        let err = query!(&e, "WHERE id IN (%Ld)", list(Vec::<i64>::new())).unwrap_err();
        assert_eq!(
            err,
            FormatError::ParameterMismatch {
                conversion: "%Ld".to_string(),
                expected: "a non-empty list of integers",
                pattern: "WHERE id IN (%Ld)".to_string(),
            }
        );
    }

    #[test]
    fn string_and_column_lists() {
        let e = MySqlEscaper;
        let f = query!(&e, "IN (%Ls)", list(vec!["a", "b'c"])).unwrap();
        assert_eq!(f.unmasked_text(), "IN ('a', 'b\\'c')");

        let f = query!(&e, "SELECT %LC", list(vec!["id", "name"])).unwrap();
        assert_eq!(f.unmasked_text(), "SELECT `id`, `name`");
    }

    #[test]
    fn like_variants_wrap_and_escape() {
        let e = MySqlEscaper;
        let f = query!(&e, "LIKE %~", "abc").unwrap();
        assert_eq!(f.unmasked_text(), "LIKE '%abc%'");

        let f = query!(&e, "LIKE %>", "50%").unwrap();
        assert_eq!(f.unmasked_text(), "LIKE '50\\%%'");

        let f = query!(&e, "LIKE %<", "under_score").unwrap();
        assert_eq!(f.unmasked_text(), "LIKE '%under\\_score'");
    }

    #[test]
    fn masked_equals_unmasked_without_secrets() {
        let e = MySqlEscaper;
        let f = query!(&e, "SELECT %C FROM %T WHERE a = %s", "c", "t", "v").unwrap();
        assert!(f.is_unmasked_safe());
        assert_eq!(f.masked_text(), f.unmasked_text());
    }

    #[test]
    fn secret_renders_placeholder_when_masked() {
        let e = MySqlEscaper;
        let f = query!(&e, "SET password = %P", OpaqueEnvelope::new("hunter2")).unwrap();
        assert_eq!(f.unmasked_text(), "SET password = 'hunter2'");
        assert_eq!(
            f.masked_text(),
            format!("SET password = '{SECRET_PLACEHOLDER}'")
        );
        assert!(!f.is_unmasked_safe());
        // Display 走掩码版
        assert_eq!(format!("{f}"), f.masked_text());
    }

    #[test]
    fn fragment_embeds_verbatim_without_reescaping() {
        let e = MySqlEscaper;
        let inner = query!(&e, "name = %s", "I'm fine").unwrap();
        let outer = query!(&e, "SELECT * FROM t WHERE %Q", &inner).unwrap();
        assert_eq!(
            outer.unmasked_text(),
            "SELECT * FROM t WHERE name = 'I\\'m fine'"
        );
    }

    #[test]
    fn secret_fragment_keeps_masking_through_composition() {
        let e = MySqlEscaper;
        let inner = query!(&e, "token = %P", OpaqueEnvelope::new("s3cret")).unwrap();
        let outer = query!(&e, "UPDATE t SET %Q WHERE id = %d", &inner, 7_i64).unwrap();
        assert_eq!(outer.unmasked_text(), "UPDATE t SET token = 's3cret' WHERE id = 7");
        assert_eq!(
            outer.masked_text(),
            format!("UPDATE t SET token = '{SECRET_PLACEHOLDER}' WHERE id = 7")
        );
    }

    #[test]
    fn fragment_lists_join_with_and_or() {
        let e = MySqlEscaper;
        let a = query!(&e, "x = %d", 1_i64).unwrap();
        let b = query!(&e, "y = %d", 2_i64).unwrap();

        let f = query!(&e, "WHERE %LA", list(vec![a.clone(), b.clone()])).unwrap();
        assert_eq!(f.unmasked_text(), "WHERE (x = 1) AND (y = 2)");

        let f = query!(&e, "WHERE %LO", list(vec![a.clone(), b.clone()])).unwrap();
        assert_eq!(f.unmasked_text(), "WHERE (x = 1) OR (y = 2)");

        let f = query!(&e, "SELECT %LQ", list(vec![a, b])).unwrap();
        assert_eq!(f.unmasked_text(), "SELECT x = 1, y = 2");
    }

    #[test]
    fn count_mismatch_fails_before_any_escaping() {
        let e = CountingEscaper::default();
        let err = format_query(&e, "WHERE a = %s AND b = %s", vec![QueryArg::from("x")])
            .unwrap_err();
        assert_eq!(err, FormatError::ArgCountMismatch { markers: 2, args: 1 });
        assert_eq!(e.calls.get(), 0);
    }

    #[test]
    fn shape_mismatch_fails_before_any_escaping() {
        let e = CountingEscaper::default();
        let err = format_query(
            &e,
            "SELECT %C FROM %T",
            vec![QueryArg::I64(1), QueryArg::from("t")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            FormatError::ParameterMismatch {
                conversion: "%C".to_string(),
                expected: "an identifier string",
                pattern: "SELECT %C FROM %T".to_string(),
            }
        );
        assert_eq!(e.calls.get(), 0);
    }

    #[test]
    fn unknown_conversions() {
        let e = MySqlEscaper;
        let err = format_query(&e, "SELECT %z", Vec::<QueryArg>::new()).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownConversion {
                conversion: "%z".to_string()
            }
        );

        let err = format_query(&e, "SELECT %nK", Vec::<QueryArg>::new()).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownConversion {
                conversion: "%nK".to_string()
            }
        );

        // 末尾孤立的 %
        let err = format_query(&e, "SELECT 1 %", Vec::<QueryArg>::new()).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownConversion {
                conversion: "%".to_string()
            }
        );
    }

    #[test]
    fn raw_string_for_fragment_is_rejected_by_default() {
        let e = MySqlEscaper;
        let err = query!(&e, "WHERE %Q", "id = 1").unwrap_err();
        assert_eq!(
            err,
            FormatError::ParameterMismatch {
                conversion: "%Q".to_string(),
                expected: "an already-formatted query fragment",
                pattern: "WHERE %Q".to_string(),
            }
        );
    }

    #[test]
    fn compat_entry_accepts_raw_string_fragment() {
        let e = MySqlEscaper;
        let f = query_compat!(&e, "WHERE %Q", "id = 1").unwrap();
        assert_eq!(f.unmasked_text(), "WHERE id = 1");

        // 兼容入口不改变其它类别的行为
        let err = query_compat!(&e, "WHERE id = %d", "abc").unwrap_err();
        assert_eq!(
            err,
            FormatError::ParameterMismatch {
                conversion: "%d".to_string(),
                expected: "an integer or NULL",
                pattern: "WHERE id = %d".to_string(),
            }
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let e = MySqlEscaper;
        let f = query!(&e, "%d + %f", "5", "1.5").unwrap();
        assert_eq!(f.unmasked_text(), "5 + 1.5");
    }

    #[test]
    fn mismatch_error_never_carries_the_secret_value() {
        let e = MySqlEscaper;
        // %s 位置传信封：形状不符
        let err = query!(&e, "WHERE a = %s", OpaqueEnvelope::new("hunter2")).unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn sequence_and_variadic_entries_agree() {
        let e = MySqlEscaper;
        let by_macro = query!(&e, "WHERE a = %d AND b = %s", 1_i64, "x").unwrap();
        let by_vec = format_query(
            &e,
            "WHERE a = %d AND b = %s",
            vec![QueryArg::I64(1), QueryArg::from("x")],
        )
        .unwrap();
        assert_eq!(by_macro, by_vec);
    }

    #[test]
    fn compat_sequence_entry_matches_macro() {
        let e = MySqlEscaper;
        let a = query_compat!(&e, "WHERE %Q", "x = 1").unwrap();
        let b = format_query_compat(&e, "WHERE %Q", vec![QueryArg::from("x = 1")]).unwrap();
        assert_eq!(a, b);
    }
}
