#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::operator::VALUE_SEPARATOR;
    use crate::{
        compose_query, parse_filter_key, Arity, Error, FilterPredicate, LinkConfig, OperatorKind,
        OrderBy, PaginationRequest, QueryOverride, SortDir, DEFAULT_TAKE, MAX_OFFSET, MAX_TAKE,
    };

    fn request(pairs: &[(&str, &str)]) -> PaginationRequest {
        PaginationRequest::from_pairs(pairs.iter().copied()).expect("valid request")
    }

    #[test]
    fn test_parse_three_segment_key() {
        let key = parse_filter_key("where__id__more_than").unwrap();
        assert_eq!(key.prefix, "where");
        assert_eq!(key.field, "id");
        assert_eq!(key.operator, Some("more_than"));
    }

    #[test]
    fn test_parse_two_segment_key_has_no_operator() {
        let key = parse_filter_key("order__createdAt").unwrap();
        assert_eq!(key.prefix, "order");
        assert_eq!(key.field, "createdAt");
        assert_eq!(key.operator, None);
    }

    #[test]
    fn test_parse_rejects_bad_segment_counts() {
        for bad in ["where", "a__b__c__d", "where__", "where____x", "where__id__"] {
            assert_eq!(
                parse_filter_key(bad),
                Err(Error::MalformedFilterKey(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_operator_tokens_resolve() {
        let cases = [
            ("more_than", OperatorKind::Gt),
            ("less_than", OperatorKind::Lt),
            ("same_or_more_than", OperatorKind::Ge),
            ("same_or_less_than", OperatorKind::Le),
            ("i_like", OperatorKind::ILike),
            ("between", OperatorKind::Between),
            ("not", OperatorKind::Ne),
            ("in", OperatorKind::In),
        ];
        for (token, kind) in cases {
            assert_eq!(OperatorKind::from_token(token), Ok(kind));
            assert_eq!(kind.token(), Some(token));
        }
        assert_eq!(OperatorKind::Eq.token(), None);
        assert_eq!(OperatorKind::ALL.len(), 9);
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            OperatorKind::from_token("bogus"),
            Err(Error::UnknownOperator("bogus".to_string()))
        );
        assert!("MORE_THAN".parse::<OperatorKind>().is_err());
    }

    #[test]
    fn test_i_like_wraps_value() {
        let p = OperatorKind::ILike.build("title", "foo").unwrap();
        assert_eq!(p.values, vec!["%foo%".to_string()]);
        assert_eq!(p.value(), Some("%foo%"));
    }

    #[test]
    fn test_single_value_keeps_commas() {
        let p = OperatorKind::Eq.build("title", "a,b").unwrap();
        assert_eq!(p.values, vec!["a,b".to_string()]);
    }

    #[test]
    fn test_between_needs_two_values() {
        let p = OperatorKind::Between.build("likeCount", "10, 20").unwrap();
        assert_eq!(p.values, vec!["10".to_string(), "20".to_string()]);

        for raw in ["10", "1,2,3", ""] {
            let err = OperatorKind::Between.build("likeCount", raw).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::InvalidValueShape {
                        operator: OperatorKind::Between,
                        expected: Arity::Exactly(2),
                        ..
                    }
                ),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn test_in_drops_empty_pieces() {
        let raw = format!("1{VALUE_SEPARATOR}{VALUE_SEPARATOR}3");
        let p = OperatorKind::In.build("id", &raw).unwrap();
        assert_eq!(p.values, vec!["1".to_string(), "3".to_string()]);

        let err = OperatorKind::In.build("id", ",").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidValueShape {
                operator: OperatorKind::In,
                expected: Arity::AtLeastOne,
                got: 0
            }
        );
        assert_eq!(err.to_string(), "operator in expects at least 1 value(s), got 0");
    }

    #[test]
    fn test_sort_dir_parse() {
        assert_eq!(SortDir::parse("asc"), Ok(SortDir::Asc));
        assert_eq!(SortDir::parse("DESC"), Ok(SortDir::Desc));
        assert_eq!(
            SortDir::parse("sideways"),
            Err(Error::InvalidOrderDirection("sideways".to_string()))
        );
        assert_eq!(SortDir::default(), SortDir::Asc);
    }

    #[test]
    fn test_order_by_set_and_tiebreaker() {
        let mut order = OrderBy::empty();
        order.set("createdAt", SortDir::Asc);
        order.set("title", SortDir::Desc);
        order.set("createdAt", SortDir::Desc);
        assert_eq!(order.len(), 2);
        assert_eq!(order.primary_dir(), SortDir::Desc);

        let order = order.ensure_tiebreaker("id", SortDir::Desc);
        assert_eq!(order.to_signed_tokens(), "-createdAt,-title,-id");

        let again = order.clone().ensure_tiebreaker("id", SortDir::Asc);
        assert_eq!(again, order);
    }

    #[test]
    fn test_request_defaults() {
        let r = PaginationRequest::new();
        assert_eq!(r.take(), DEFAULT_TAKE);
        assert_eq!(r.page(), None);
        assert!(r.is_cursor_mode());
        assert_eq!(r.order_created_at(), SortDir::Asc);
        assert_eq!(r.offset(), None);
    }

    #[test]
    fn test_request_offset() {
        let r = request(&[("page", "2"), ("take", "10")]);
        assert_eq!(r.offset(), Some(10));
        assert!(!r.is_cursor_mode());

        let r = PaginationRequest::new().with_page(1).with_take(0);
        assert_eq!(r.take(), 1);
        assert_eq!(r.offset(), Some(0));
    }

    #[test]
    fn test_request_rejects_bad_structural_values() {
        assert_eq!(
            PaginationRequest::from_pairs([("take", "0")]),
            Err(Error::InvalidTake("0".to_string()))
        );
        assert_eq!(
            PaginationRequest::from_pairs([("page", "-1")]),
            Err(Error::InvalidPage("-1".to_string()))
        );
        assert_eq!(
            PaginationRequest::from_pairs([("order__createdAt", "up")]),
            Err(Error::InvalidOrderDirection("up".to_string()))
        );
    }

    #[test]
    fn test_request_take_must_fit_a_signed_bigint() {
        let max = MAX_TAKE.to_string();
        assert_eq!(request(&[("take", max.as_str())]).take(), MAX_TAKE);

        let over = (MAX_TAKE + 1).to_string();
        assert_eq!(
            PaginationRequest::from_pairs([("take", over.as_str())]),
            Err(Error::InvalidTake(over.clone()))
        );
        assert_eq!(
            PaginationRequest::from_pairs([("take", "18446744073709551615")]),
            Err(Error::InvalidTake("18446744073709551615".to_string()))
        );
        assert_eq!(
            PaginationRequest::from_pairs([("take", "18446744073709551616")]),
            Err(Error::InvalidTake("18446744073709551616".to_string()))
        );
    }

    #[test]
    fn test_request_offset_must_fit_a_signed_bigint() {
        assert_eq!(
            PaginationRequest::from_pairs([("page", "999999999999999999"), ("take", "20")]),
            Err(Error::InvalidPage("999999999999999999".to_string()))
        );
        // take arriving after page is checked against it too
        assert_eq!(
            PaginationRequest::from_pairs([("take", "20"), ("page", "999999999999999999")]),
            Err(Error::InvalidPage("999999999999999999".to_string()))
        );

        let max = MAX_TAKE.to_string();
        let edge = request(&[("page", "2"), ("take", max.as_str())]);
        assert_eq!(edge.offset(), Some(MAX_OFFSET));
        assert_eq!(
            PaginationRequest::from_pairs([("page", "3"), ("take", max.as_str())]),
            Err(Error::InvalidPage("3".to_string()))
        );

        let built = PaginationRequest::new().with_take(u64::MAX).with_page(u64::MAX);
        assert_eq!(built.take(), MAX_TAKE);
        assert_eq!(built.offset(), Some(MAX_OFFSET));
    }

    #[test]
    fn test_request_empty_structural_values_are_absent() {
        let r = request(&[("page", ""), ("take", ""), ("order__createdAt", "")]);
        assert_eq!(r.page(), None);
        assert_eq!(r.take(), DEFAULT_TAKE);
        assert_eq!(r.order_created_at(), SortDir::Asc);
    }

    #[test]
    fn test_compose_where_and_order() {
        let r = request(&[
            ("take", "5"),
            ("where__title__i_like", "foo"),
            ("where__authorId", "7"),
            ("order__createdAt", "DESC"),
            ("order__title", "asc"),
            ("utm_source", "mail"),
        ]);
        let spec = compose_query(&r, &QueryOverride::default()).unwrap();

        assert_eq!(spec.limit, 5);
        assert_eq!(spec.offset, None);
        assert_eq!(spec.filters.len(), 2);
        assert_eq!(spec.filter("title").unwrap().operator, OperatorKind::ILike);
        assert_eq!(spec.filter("title").unwrap().value(), Some("%foo%"));
        assert_eq!(spec.filter("authorId"), Some(&FilterPredicate::eq("authorId", "7")));
        assert_eq!(spec.order.get("createdAt"), Some(SortDir::Desc));
        assert_eq!(spec.order.get("title"), Some(SortDir::Asc));
    }

    #[test]
    fn test_compose_always_orders_by_created_at() {
        let spec = compose_query(&PaginationRequest::new(), &QueryOverride::default()).unwrap();
        assert_eq!(spec.order.to_signed_tokens(), "+createdAt");
        assert_eq!(spec.limit, DEFAULT_TAKE);
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn test_compose_last_write_wins_per_field() {
        let r = request(&[("where__id__more_than", "3"), ("where__id__less_than", "9")]);
        let spec = compose_query(&r, &QueryOverride::default()).unwrap();
        assert_eq!(spec.filters.len(), 1);
        assert!(spec.filter("id").is_some());
    }

    #[test]
    fn test_compose_errors_abort() {
        let err = compose_query(&request(&[("where__a__b__c", "1")]), &QueryOverride::default());
        assert_eq!(err, Err(Error::MalformedFilterKey("where__a__b__c".to_string())));

        let err = compose_query(&request(&[("where__id__bogus", "1")]), &QueryOverride::default());
        assert_eq!(err, Err(Error::UnknownOperator("bogus".to_string())));

        let err = compose_query(&request(&[("order__title__x", "ASC")]), &QueryOverride::default());
        assert_eq!(err, Err(Error::MalformedFilterKey("order__title__x".to_string())));

        let err = compose_query(&request(&[("order__title", "up")]), &QueryOverride::default());
        assert_eq!(err, Err(Error::InvalidOrderDirection("up".to_string())));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let r = request(&[("where__authorId", "99"), ("order__title", "ASC")]);
        let overrides = QueryOverride::new()
            .pin(FilterPredicate::eq("authorId", "1"))
            .order_by("title", SortDir::Desc);
        let spec = compose_query(&r, &overrides).unwrap();

        assert_eq!(spec.filter("authorId").unwrap().value(), Some("1"));
        assert_eq!(spec.order.get("title"), Some(SortDir::Desc));
    }

    #[test]
    fn test_next_link_ascending() {
        let links = LinkConfig::new("http", "localhost:8087");
        let r = request(&[("take", "2"), ("where__id__more_than", "1")]);
        let next = links
            .next_link(&r, "posts", SortDir::Asc, Some(&42))
            .unwrap()
            .unwrap();
        assert_eq!(next, "http://localhost:8087/posts?take=2&where__id__more_than=42");
        assert!(!next.contains("where__id__less_than"));
    }

    #[test]
    fn test_next_link_descending_replaces_previous_boundary() {
        let links = LinkConfig::new("https", "api.example.com");
        let r = request(&[
            ("order__createdAt", "DESC"),
            ("where__id__less_than", "50"),
            ("where__title__i_like", "foo bar"),
        ]);
        let next = links
            .next_link(&r, "/posts", SortDir::Desc, Some("42"))
            .unwrap()
            .unwrap();
        assert_eq!(
            next,
            "https://api.example.com/posts?order__createdAt=DESC&where__title__i_like=foo+bar&where__id__less_than=42"
        );
        assert!(!next.contains("more_than"));
    }

    #[test]
    fn test_next_link_skips_empty_values() {
        let links = LinkConfig::new("http", "localhost");
        let r = request(&[("where__title", ""), ("take", "3")]);
        let next = links
            .next_link(&r, "posts", SortDir::Asc, Some(&7))
            .unwrap()
            .unwrap();
        assert_eq!(next, "http://localhost/posts?take=3&where__id__more_than=7");
    }

    #[test]
    fn test_next_link_none_without_last_id() {
        let links = LinkConfig::new("http", "localhost");
        let next = links
            .next_link::<i64>(&PaginationRequest::new(), "posts", SortDir::Asc, None)
            .unwrap();
        assert_eq!(next, None);
    }

    #[test]
    fn test_next_link_invalid_base() {
        let links = LinkConfig::new("http", "bad host");
        let err = links
            .next_link(&PaginationRequest::new(), "posts", SortDir::Asc, Some(&1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLinkBase(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "INVALID_LINK_BASE");
    }
}
