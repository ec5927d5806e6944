//! End-to-end page behaviour over an in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rollbook::common::{ApiError, NotificationLevel, Record};
use rollbook::fields::{FieldDescriptor, FieldType, StaticOptions};
use rollbook::forms::{
    FnSubmit, FormEngine, FormFieldDescriptor, InputKind, Rule, ValidationSchema,
};
use rollbook::overlay::{ConfirmAction, FnAction};
use rollbook::table::{
    Comparator, FilterDescriptor, FnQuery, QueryApi, QueryCache, QueryParams, StaticRows,
};
use rollbook::{PageEvent, PageParams, ResourcePage};
use serde_json::{json, Value};

#[derive(Default)]
struct Store {
    rows: Mutex<Vec<Record>>,
    queries: AtomicUsize,
}

impl Store {
    fn seeded() -> Arc<Self> {
        let store = Self::default();
        *store.rows.lock().unwrap() = vec![
            json!({"id": 1, "classGroupName": "6A", "status": "ACTIVE"}),
            json!({"id": 2, "classGroupName": "7A", "status": "INACTIVE"}),
        ];
        Arc::new(store)
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn insert(&self, mut row: Value) -> Value {
        let mut rows = self.rows.lock().unwrap();
        row["id"] = json!(rows.len() as i64 + 10);
        rows.push(row.clone());
        row
    }

    fn remove(&self, id: &Value) {
        self.rows.lock().unwrap().retain(|r| &r["id"] != id);
    }
}

#[async_trait::async_trait]
impl QueryApi for Store {
    async fn query(&self, params: &QueryParams) -> Result<Vec<Record>, ApiError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap().clone();
        Ok(StaticRows::new(rows).select(params))
    }
}

fn class_group_form(store: &Arc<Store>) -> FormEngine {
    let store = Arc::clone(store);
    FormEngine::builder(FnSubmit(move |values: Value| {
        let saved = store.insert(values);
        async move { Ok::<_, ApiError>(saved) }
    }))
    .field(FormFieldDescriptor::new("classGroupName", "Class group name", InputKind::Text))
    .schema(ValidationSchema::new().rule("classGroupName", Rule::string().required()))
    .defaults(json!({"classGroupName": "", "status": "ACTIVE"}))
    .build()
}

fn page(store: &Arc<Store>, cache: QueryCache) -> ResourcePage {
    let delete_store = Arc::clone(store);
    ResourcePage::builder("class group", "class-groups", store.clone(), cache)
        .columns([
            FieldDescriptor::new("classGroupName", "Class", FieldType::Text),
            FieldDescriptor::new("status", "Status", FieldType::BadgeApi).with_api_action(
                Arc::new(StaticOptions::new(vec![
                    rollbook::common::EnumOption::new("ACTIVE", "Active"),
                    rollbook::common::EnumOption::new("INACTIVE", "Inactive"),
                ])),
            ),
        ])
        .filter(FilterDescriptor::new(
            FormFieldDescriptor::new("classGroupName", "Class", InputKind::Text),
            Comparator::Like,
        ))
        .create_form("Create", class_group_form(store))
        .edit_form(|record| {
            let name = record["classGroupName"].clone();
            FormEngine::builder(FnSubmit(|_values: Value| async {
                Err::<Value, _>(ApiError::with_status(500, "Update failed"))
            }))
            .defaults(json!({"classGroupName": name}))
            .build()
        })
        .delete_action(Some("Delete this class group?".into()), move |record| {
            let store = Arc::clone(&delete_store);
            let id = record["id"].clone();
            Arc::new(FnAction(move || {
                store.remove(&id);
                std::future::ready(Ok::<_, ApiError>(Value::Null))
            })) as Arc<dyn ConfirmAction>
        })
        .build()
}

#[tokio::test]
async fn create_closes_modal_and_refetches() {
    let store = Store::seeded();
    let page = page(&store, QueryCache::new());
    assert_eq!(page.render(1).await.unwrap().total, 2);

    let create = page.create().unwrap();
    create.open();
    assert!(create.overlay().is_open());

    let event = create.submit().await;
    assert!(matches!(event, PageEvent::Invalid(ref errors) if errors.contains_key("classGroupName")));
    assert!(create.overlay().is_open());

    create.form().set_value("classGroupName", json!("8B"));
    let event = create.submit().await;
    assert_eq!(
        event.notification().map(|n| n.level),
        Some(NotificationLevel::Success)
    );
    assert!(!create.overlay().is_open());

    let view = page.render(1).await.unwrap();
    assert_eq!(store.queries(), 2);
    assert_eq!(view.total, 3);
    let grid = view.resolve_text().await;
    assert_eq!(grid[0], vec!["8B", "Active"]);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let store = Store::seeded();
    let page = page(&store, QueryCache::new());
    let view = page.render(1).await.unwrap();
    let newest = view.rows[0].actions.as_ref().unwrap();
    let delete = newest.delete.as_ref().unwrap();

    assert_eq!(
        delete.trigger().await,
        PageEvent::AwaitingConfirmation("Delete this class group?".into())
    );
    assert_eq!(delete.decline(), PageEvent::Declined);
    assert_eq!(page.render(1).await.unwrap().total, 2);
    assert_eq!(store.queries(), 1);

    delete.trigger().await;
    assert!(matches!(delete.confirm().await, PageEvent::Saved(_)));
    let view = page.render(1).await.unwrap();
    assert_eq!(view.total, 1);
    assert_eq!(view.rows[0].record["classGroupName"], "6A");
}

#[test_log::test(tokio::test)]
async fn failed_edit_keeps_modal_open() {
    let store = Store::seeded();
    let page = page(&store, QueryCache::new());
    let view = page.render(1).await.unwrap();
    let edit = view.rows[1].actions.as_ref().unwrap().edit.as_ref().unwrap();

    assert_eq!(edit.form().value("classGroupName"), Some(json!("6A")));
    edit.open();
    let event = edit.submit().await;
    let notification = event.notification().unwrap();
    assert!(notification.is_error());
    assert_eq!(notification.message, "Update failed");
    assert!(edit.overlay().is_open());

    page.render(1).await.unwrap();
    assert_eq!(store.queries(), 1);
}

#[tokio::test]
async fn unmounted_modal_discards_response() {
    let store = Store::seeded();
    let page = page(&store, QueryCache::new());
    assert_eq!(page.render(1).await.unwrap().total, 2);

    let create = page.create().unwrap();
    create.open();
    create.form().set_value("classGroupName", json!("9A"));
    create.overlay().unmount();

    assert_eq!(create.submit().await, PageEvent::Discarded);
    assert!(page.table().cache().is_stale(page.source_key()));

    let view = page.render(1).await.unwrap();
    assert_eq!(store.queries(), 2);
    assert_eq!(view.total, 3);
    assert_eq!(view.rows[0].record["classGroupName"], "9A");
}

#[tokio::test]
async fn filters_narrow_the_listing() {
    let store = Store::seeded();
    let page = page(&store, QueryCache::new());
    page.set_filter("classGroupName", json!("7")).unwrap();
    let view = page.render(1).await.unwrap();
    assert_eq!(view.total, 1);
    assert_eq!(view.rows[0].record["id"], 2);
}

#[tokio::test]
async fn dependent_filters_drive_page_params() {
    let cache = QueryCache::new();
    let params = PageParams::with_defaults(json!({"month": 1}));

    let source = params.clone();
    let query = FnQuery(move |_q: QueryParams| {
        let month = source.get("month").unwrap_or(Value::Null);
        async move { Ok::<_, ApiError>(vec![json!({"studentName": "Pham E", "month": month})]) }
    });

    let month_filter = FormFieldDescriptor::new("month", "Month", InputKind::SelectApiOption)
        .on_change_extra(params.hook("month", cache.clone(), "violation-top".into()));
    let filters = FormEngine::builder(FnSubmit(|v: Value| async move { Ok::<_, ApiError>(v) }))
        .field(month_filter)
        .build();

    let page = ResourcePage::builder("top student", "violation-top", Arc::new(query), cache)
        .columns([FieldDescriptor::new("month", "Month", FieldType::Text)])
        .build();

    let first = page.render(1).await.unwrap().resolve_text().await;
    assert_eq!(first[0][0], "1");

    filters.set_value("month", json!(4));
    let second = page.render(1).await.unwrap().resolve_text().await;
    assert_eq!(second[0][0], "4");
}
