use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rollbook_common::{ApiError, EnumOption, NotificationLevel};
use rollbook_fields::StaticOptions;
use rollbook_forms::{
    FieldProps, FnOptions, FnSubmit, FormEngine, FormFieldDescriptor, InputKind, Rule,
    SubmitAction, SubmitOutcome, ValidationSchema,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Records every value set it receives; accepts or rejects all of them.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Value>>>,
    reject: bool,
}

impl Recorder {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SubmitAction for Recorder {
    async fn submit(&self, values: Value) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(values.clone());
        if self.reject {
            Err(ApiError::with_status(400, "Class group name already exists"))
        } else {
            Ok(json!({"id": 12}))
        }
    }
}

fn class_group_form(action: Recorder) -> FormEngine {
    FormEngine::builder(action)
        .field(FormFieldDescriptor::new(
            "classGroupName",
            "Class group name",
            InputKind::Text,
        ))
        .field(
            FormFieldDescriptor::new("status", "Status", InputKind::SelectApiOption).with_props(
                FieldProps::with_source(StaticOptions::new(vec![
                    EnumOption::new("ACTIVE", "Active"),
                    EnumOption::new("INACTIVE", "Inactive"),
                ])),
            ),
        )
        .schema(
            ValidationSchema::new()
                .rule("classGroupName", Rule::string().required())
                .rule("status", Rule::string().required()),
        )
        .defaults(json!({"classGroupName": "", "status": "ACTIVE", "schoolYearId": 3}))
        .build()
}

#[tokio::test]
async fn required_field_blocks_submission() {
    let action = Recorder::default();
    let form = class_group_form(action.clone());

    let outcome = form.submit().await;
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation errors, got {outcome:?}");
    };
    assert_eq!(errors["classGroupName"], "Class group name is required");
    assert_eq!(form.errors().len(), 1);
    assert!(action.calls().is_empty());
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn valid_form_submits_full_value_set() {
    let action = Recorder::default();
    let form = class_group_form(action.clone());

    form.set_value("classGroupName", json!("7A"));
    let outcome = form.submit().await;

    assert_eq!(outcome, SubmitOutcome::Succeeded(json!({"id": 12})));
    assert_eq!(
        action.calls(),
        vec![json!({"classGroupName": "7A", "status": "ACTIVE", "schoolYearId": 3})]
    );
    assert!(form.errors().is_empty());
}

#[test_log::test(tokio::test)]
async fn rejection_keeps_values_and_unlocks() {
    let action = Recorder::rejecting();
    let form = class_group_form(action.clone());
    form.set_value("classGroupName", json!("7A"));

    let outcome = form.submit().await;
    assert!(matches!(&outcome, SubmitOutcome::Failed(err) if err.status == Some(400)));
    assert!(!outcome.is_success());
    let notification = outcome.notification("Created").unwrap();
    assert_eq!(notification.level, NotificationLevel::Warning);
    assert_eq!(notification.message, "Class group name already exists");

    assert_eq!(form.value("classGroupName"), Some(json!("7A")));
    assert!(!form.is_submitting());
    assert!(matches!(form.submit().await, SubmitOutcome::Failed(_)));
    assert_eq!(action.calls().len(), 2);
}

#[tokio::test]
async fn second_submit_while_pending_is_ignored() {
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());

    let counter = Arc::clone(&calls);
    let gate = Arc::clone(&release);
    let form = FormEngine::builder(FnSubmit(move |values: Value| {
        counter.fetch_add(1, Ordering::SeqCst);
        let gate = Arc::clone(&gate);
        async move {
            gate.notified().await;
            Ok::<_, ApiError>(values)
        }
    }))
    .defaults(json!({"name": "Nguyen Van A"}))
    .build();

    let first = form.submit();
    let second = async {
        tokio::task::yield_now().await;
        let outcome = form.submit().await;
        release.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_success());
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn static_source_filters_by_search() {
    let form = class_group_form(Recorder::default());
    let options = form.load_options("status", "inact").await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, json!("INACTIVE"));
}

#[test_log::test(tokio::test)]
async fn failing_option_source_degrades_to_empty() {
    let form = FormEngine::builder(Recorder::default())
        .field(
            FormFieldDescriptor::new("teacherId", "Teacher", InputKind::SelectApiOption)
                .with_props(FieldProps::with_source(FnOptions(|_search: String| async {
                    Err::<Vec<EnumOption>, _>(ApiError::with_status(503, "unavailable"))
                }))),
        )
        .build();
    assert_eq!(form.load_options("teacherId", "").await, Ok(vec![]));
}

#[tokio::test]
async fn option_source_receives_search_text() {
    let searches = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&searches);
    let form = FormEngine::builder(Recorder::default())
        .field(
            FormFieldDescriptor::new("studentId", "Student", InputKind::MultiSelectApiOption)
                .with_props(FieldProps::with_source(FnOptions(move |search: String| {
                    seen.lock().unwrap().push(search.clone());
                    async move { Ok::<_, ApiError>(vec![EnumOption::new(31, format!("{search} (10A)"))]) }
                }))),
        )
        .build();

    let options = form.load_options("studentId", "Tran").await.unwrap();
    assert_eq!(options[0].label, "Tran (10A)");
    assert_eq!(*searches.lock().unwrap(), vec!["Tran".to_string()]);
}

#[tokio::test]
async fn change_hook_drives_dependent_state() {
    let week_filter = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&week_filter);
    let form = FormEngine::builder(Recorder::default())
        .field(
            FormFieldDescriptor::new("weekNumber", "Week", InputKind::SelectApiOption)
                .with_props(FieldProps::with_source(StaticOptions::weeks(4)))
                .on_change_extra(move |v| *sink.lock().unwrap() = v.as_i64()),
        )
        .build();

    form.set_value("weekNumber", json!(2));
    assert_eq!(*week_filter.lock().unwrap(), Some(2));
}
