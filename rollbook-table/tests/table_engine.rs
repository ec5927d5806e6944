use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rollbook_common::{ApiError, EnumOption, Record, SortOrder};
use rollbook_config::TableConfig;
use rollbook_fields::{FieldDescriptor, FieldType, FieldView, StaticOptions};
use rollbook_forms::{FormFieldDescriptor, InputKind};
use rollbook_table::{
    CacheEvent, Comparator, FilterDescriptor, QueryApi, QueryCache, QueryParams, SourceKey,
    StaticRows, TableEngine, TableError,
};
use serde_json::{json, Value};

/// Serves a fixed row set, counting calls and remembering the last params.
#[derive(Default)]
struct CountingQuery {
    rows: Vec<Record>,
    calls: AtomicUsize,
    last: Mutex<Option<QueryParams>>,
    fail: AtomicBool,
}

impl CountingQuery {
    fn new(rows: Value) -> Arc<Self> {
        let rows = match rows {
            Value::Array(rows) => rows,
            _ => Vec::new(),
        };
        Arc::new(Self {
            rows,
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl QueryApi for CountingQuery {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(params.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::with_status(500, "database unavailable"));
        }
        Ok(StaticRows::new(self.rows.clone()).select(params))
    }
}

fn class_groups() -> Arc<CountingQuery> {
    CountingQuery::new(json!([
        {"id": 1, "classGroupName": "6A", "grade": 6, "status": "ACTIVE", "students": [1, 2]},
        {"id": 2, "classGroupName": "7A", "grade": 7, "status": "INACTIVE", "students": []},
        {"id": 3, "classGroupName": "7B", "grade": 7, "status": "ACTIVE", "students": [4, 5, 6]},
    ]))
}

fn columns() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("classGroupName", "Class", FieldType::Text),
        FieldDescriptor::new("status", "Status", FieldType::BadgeApi).with_api_action(Arc::new(
            StaticOptions::new(vec![
                EnumOption::new("ACTIVE", "Active").with_color("green"),
                EnumOption::new("INACTIVE", "Inactive").with_color("red"),
            ]),
        )),
        FieldDescriptor::new("students", "Students", FieldType::Length),
    ]
}

fn table(query: Arc<CountingQuery>, cache: QueryCache) -> TableEngine {
    TableEngine::builder("class-groups", query, cache)
        .columns(columns())
        .filter(FilterDescriptor::new(
            FormFieldDescriptor::new("classGroupName", "Class", InputKind::Text),
            Comparator::Like,
        ))
        .build()
}

#[tokio::test]
async fn renders_newest_first_with_enrichment() {
    let query = class_groups();
    let table = table(query.clone(), QueryCache::new());

    let view = table.render(1).await.unwrap();
    assert_eq!(view.total, 3);
    assert_eq!(view.columns[1].title, "Status");
    assert_eq!(view.rows[0].cells[1].view, FieldView::Loading);

    let grid = view.resolve_text().await;
    assert_eq!(
        grid,
        vec![
            vec!["7B", "Active", "3"],
            vec!["7A", "Inactive", "0"],
            vec!["6A", "Active", "2"],
        ]
    );
}

#[tokio::test]
async fn cached_rows_are_reused_until_invalidated() {
    let query = class_groups();
    let table = table(query.clone(), QueryCache::new());

    table.render(1).await.unwrap();
    table.render(1).await.unwrap();
    assert_eq!(query.calls(), 1);

    table.invalidate();
    table.render(1).await.unwrap();
    assert_eq!(query.calls(), 2);
}

#[tokio::test]
async fn engines_sharing_a_key_see_the_same_invalidation() {
    let cache = QueryCache::new();
    let list_query = class_groups();
    let summary_query = class_groups();
    let list = table(list_query.clone(), cache.clone());
    let summary = table(summary_query.clone(), cache.clone());
    let mut events = cache.subscribe();

    list.render(1).await.unwrap();
    summary.render(1).await.unwrap();
    assert_eq!(summary_query.calls(), 0);

    cache.invalidate(&SourceKey::from("class-groups"));
    assert_eq!(
        events.recv().await.unwrap(),
        CacheEvent::Updated(SourceKey::from("class-groups"))
    );
    assert!(matches!(events.recv().await.unwrap(), CacheEvent::Invalidated(_)));

    summary.render(1).await.unwrap();
    assert_eq!(summary_query.calls(), 1);
    list.render(1).await.unwrap();
    assert_eq!(list_query.calls(), 1);
}

#[tokio::test]
async fn filter_change_forces_refetch_with_condition() {
    let query = class_groups();
    let table = table(query.clone(), QueryCache::new());
    table.render(1).await.unwrap();

    table.set_filter("classGroupName", json!("7")).unwrap();
    let view = table.render(1).await.unwrap();
    assert_eq!(query.calls(), 2);
    assert_eq!(view.total, 2);

    let params = query.last.lock().unwrap().clone().unwrap();
    assert_eq!(params.filters.len(), 1);
    assert_eq!(params.filters[0].comparator, Comparator::Like);
    assert_eq!(params.filters[0].value, json!("7"));

    assert!(matches!(
        table.set_filter("teacher", json!(1)),
        Err(TableError::UnknownFilter { .. })
    ));
}

#[tokio::test]
async fn column_sort_overrides_default() {
    let query = class_groups();
    let mut cols = columns();
    cols[0] = cols[0].clone().sorted(SortOrder::Asc);
    let table: TableEngine = TableEngine::builder("class-groups", query.clone(), QueryCache::new())
        .columns(cols)
        .build();

    let params = table.params();
    assert_eq!(params.sort_field.as_deref(), Some("classGroupName"));
    assert_eq!(params.sort_order, SortOrder::Asc);
    let grid = table.render(1).await.unwrap().resolve_text().await;
    assert_eq!(grid[0][0], "6A");
}

#[tokio::test]
async fn pages_client_side() {
    let query = class_groups();
    let table: TableEngine = TableEngine::builder("class-groups", query, QueryCache::new())
        .columns(columns())
        .config(TableConfig {
            page_size: 2,
            ..TableConfig::default()
        })
        .build();

    let first = table.render(1).await.unwrap();
    assert_eq!((first.page, first.page_count, first.rows.len()), (1, 2, 2));
    let last = table.render(9).await.unwrap();
    assert_eq!((last.page, last.rows.len()), (2, 1));
    assert_eq!(last.rows[0].record["classGroupName"], "6A");
}

#[test_log::test(tokio::test)]
async fn failed_fetch_keeps_previous_rows() {
    let query = class_groups();
    let cache = QueryCache::new();
    let table = table(query.clone(), cache.clone());
    table.render(1).await.unwrap();

    query.fail.store(true, Ordering::SeqCst);
    table.invalidate();
    let err = table.render(1).await.unwrap_err();
    assert_eq!(err.api_error().and_then(|e| e.status), Some(500));
    assert_eq!(
        cache.rows(table.source_key()).map(|rows| rows.len()),
        Some(3)
    );
    assert!(cache.is_stale(table.source_key()));
}

#[tokio::test]
async fn action_column_is_built_per_row() {
    let table = TableEngine::builder("class-groups", class_groups(), QueryCache::new())
        .columns(columns())
        .action_column(|record| format!("edit-{}", record["id"]))
        .build();
    let view = table.render(1).await.unwrap();
    let actions: Vec<_> = view.rows.iter().filter_map(|r| r.actions.clone()).collect();
    assert_eq!(actions, ["edit-3", "edit-2", "edit-1"]);
}
