use posdesk::pagination::{Filter, ListQuery, PageMeta, PageParams, SortOrder, MAX_LIMIT};

fn query(page: Option<&str>, limit: Option<&str>) -> ListQuery {
    ListQuery {
        page: page.map(String::from),
        limit: limit.map(String::from),
        ..ListQuery::default()
    }
}

// ── Parameter clamping ──────────────────────────────────────────

#[test]
fn defaults_when_absent() {
    let params = PageParams::from_query(&ListQuery::default(), "created_at");
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 10);
    assert_eq!(params.offset, 0);
    assert_eq!(params.sort_by, "created_at");
    assert_eq!(params.sort_order, SortOrder::Desc);
}

#[test]
fn negative_page_and_oversized_limit_clamp() {
    let params = PageParams::from_query(&query(Some("-5"), Some("9999")), "created_at");
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, MAX_LIMIT);
    assert_eq!(params.offset, 0);
    assert_eq!(params.sort_by, "created_at");
    assert_eq!(params.sort_order, SortOrder::Desc);
}

#[test]
fn non_numeric_values_coerce_to_defaults() {
    let params = PageParams::from_query(&query(Some("abc"), Some("xyz")), "name");
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 10);
}

#[test]
fn zero_values_coerce_to_defaults() {
    let params = PageParams::from_query(&query(Some("0"), Some("0")), "name");
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 10);
}

#[test]
fn offset_is_derived_from_page_and_limit() {
    let params = PageParams::from_query(&query(Some("3"), Some("25")), "name");
    assert_eq!(params.page, 3);
    assert_eq!(params.limit, 25);
    assert_eq!(params.offset, 50);
}

#[test]
fn custom_cap_applies() {
    let params = PageParams::from_query_capped(&query(None, Some("50")), "name", 20);
    assert_eq!(params.limit, 20);
}

#[test]
fn sort_order_accepts_only_literals() {
    let mut q = ListQuery::default();

    q.sort_order = Some("asc".to_string());
    assert_eq!(PageParams::from_query(&q, "id").sort_order, SortOrder::Asc);

    q.sort_order = Some("desc".to_string());
    assert_eq!(PageParams::from_query(&q, "id").sort_order, SortOrder::Desc);

    q.sort_order = Some("ASCENDING".to_string());
    assert_eq!(PageParams::from_query(&q, "id").sort_order, SortOrder::Desc);
}

#[test]
fn sort_by_falls_back_to_default() {
    let mut q = ListQuery::default();
    q.sort_by = Some("  ".to_string());
    assert_eq!(PageParams::from_query(&q, "created_at").sort_by, "created_at");

    q.sort_by = Some("name".to_string());
    assert_eq!(PageParams::from_query(&q, "created_at").sort_by, "name");
}

#[test]
fn search_term_is_trimmed_and_empty_is_none() {
    let mut q = ListQuery::default();
    assert_eq!(q.search_term(), None);

    q.search = Some("   ".to_string());
    assert_eq!(q.search_term(), None);

    q.search = Some("  blue ".to_string());
    assert_eq!(q.search_term(), Some("blue"));
}

// ── Filter rendering ────────────────────────────────────────────

#[test]
fn empty_filter_renders_nothing() {
    let (sql, binds) = Filter::new().to_sql(1);
    assert_eq!(sql, "");
    assert!(binds.is_empty());
}

#[test]
fn search_filter_ors_fields_on_one_bind() {
    let (sql, binds) = Filter::new().search(&["code", "name"], "blue").to_sql(1);
    assert_eq!(sql, " WHERE (code ILIKE $1 OR name ILIKE $1)");
    assert_eq!(binds, vec!["%blue%".to_string()]);
}

#[test]
fn clauses_compose_with_and_and_sequential_placeholders() {
    let (sql, binds) = Filter::new()
        .search(&["code", "name"], "blue")
        .eq("module", "sales")
        .to_sql(1);
    assert_eq!(
        sql,
        " WHERE (code ILIKE $1 OR name ILIKE $1) AND module = $2"
    );
    assert_eq!(binds, vec!["%blue%".to_string(), "sales".to_string()]);
}

#[test]
fn placeholder_numbering_starts_where_asked() {
    let (sql, binds) = Filter::new().eq("role", "admin").to_sql(3);
    assert_eq!(sql, " WHERE role = $3");
    assert_eq!(binds, vec!["admin".to_string()]);
}

// ── Result metadata ─────────────────────────────────────────────

#[test]
fn empty_result_metadata() {
    let meta = PageMeta::new(1, 10, 0);
    assert_eq!(
        meta,
        PageMeta {
            page: 1,
            limit: 10,
            total: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    );
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(PageMeta::new(1, 10, 35).total_pages, 4);
    assert_eq!(PageMeta::new(1, 10, 40).total_pages, 4);
    assert_eq!(PageMeta::new(1, 10, 41).total_pages, 5);
    assert_eq!(PageMeta::new(1, 10, 1).total_pages, 1);
}

#[test]
fn has_next_and_has_prev() {
    let middle = PageMeta::new(2, 10, 35);
    assert!(middle.has_next);
    assert!(middle.has_prev);

    let first = PageMeta::new(1, 10, 35);
    assert!(first.has_next);
    assert!(!first.has_prev);

    let last = PageMeta::new(4, 10, 35);
    assert!(!last.has_next);
    assert!(last.has_prev);

    // Past-the-end page still reports hasPrev correctly.
    let beyond = PageMeta::new(9, 10, 35);
    assert!(!beyond.has_next);
    assert!(beyond.has_prev);
}

#[test]
fn metadata_serializes_camel_case() {
    let value = serde_json::to_value(PageMeta::new(2, 10, 35)).unwrap();
    assert_eq!(value["totalPages"], 4);
    assert_eq!(value["hasNext"], true);
    assert_eq!(value["hasPrev"], true);
}
