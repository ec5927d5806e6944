//! Field renderer behaviour across kinds, formatters and enrichment lookups

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rollbook_common::{ApiError, EnumOption};
use rollbook_config::DisplayConfig;
use rollbook_fields::{
    Badge, Enriched, EnrichmentSource, FieldDescriptor, FieldRenderer, FieldType, FieldView,
    FnSource, StaticOptions,
};
use serde_json::{json, Value};

fn statuses() -> Arc<dyn EnrichmentSource> {
    Arc::new(StaticOptions::new(vec![
        EnumOption::new("ACTIVE", "Active").with_color("green"),
        EnumOption::new("INACTIVE", "Inactive").with_color("red"),
    ]))
}

#[test]
fn time_date_scenario() {
    let renderer = FieldRenderer::default();
    let view = renderer
        .render_value(&FieldType::TimeDate, json!("2024-03-01T10:00:00Z"), None, None)
        .view;
    assert_eq!(view, FieldView::Time { text: "01/03/2024".into() });
}

#[test]
fn time_patterns_come_from_config() {
    let renderer = FieldRenderer::new(DisplayConfig {
        time_date: "%Y-%m-%d".into(),
        utc_offset_minutes: 7 * 60,
        ..DisplayConfig::default()
    });
    let view = renderer
        .render_value(&FieldType::TimeDate, json!("2024-03-01T20:00:00Z"), None, None)
        .view;
    assert_eq!(view.plain_text(), "2024-03-02");
}

#[test]
fn bad_time_pattern_falls_back_to_raw_value() {
    let renderer = FieldRenderer::new(DisplayConfig {
        time_date: "%Q".into(),
        utc_offset_minutes: i32::MAX,
        ..DisplayConfig::default()
    });
    let view = renderer
        .render_value(&FieldType::TimeDate, json!("2024-03-01T10:00:00Z"), None, None)
        .view;
    assert_eq!(view.plain_text(), "2024-03-01T10:00:00Z");
}

#[test]
fn length_column_scenario() {
    let renderer = FieldRenderer::default();
    let column = FieldDescriptor::new("length", "Count", FieldType::Length);
    assert_eq!(
        renderer.render_cell(&column, &json!({"length": [1, 2, 3]})).view.plain_text(),
        "3"
    );
    assert_eq!(renderer.render_cell(&column, &json!({})).view.plain_text(), "0");
}

#[test]
fn every_kind_renders_every_value() {
    let renderer = FieldRenderer::default();
    let values = [
        json!(null),
        json!(true),
        json!(-3),
        json!(2.5),
        json!(""),
        json!("2024-03-01T10:00:00Z"),
        json!([1, "two", null]),
        json!({"length": 2, "address": "x"}),
    ];
    let mut kinds: Vec<FieldType> = FieldType::KNOWN.to_vec();
    kinds.push(FieldType::Unknown("sparkline".into()));

    for kind in &kinds {
        for value in &values {
            let rendered = renderer.render_value(kind, value.clone(), None, None);
            assert!(!rendered.is_pending(), "{kind} pending without a source");
            let _ = rendered.view.plain_text();
        }
    }
}

#[test]
fn unknown_kind_renders_raw_value() {
    let renderer = FieldRenderer::default();
    let kind: FieldType = serde_json::from_value(json!("hologram")).unwrap();
    let view = renderer.render_value(&kind, json!(42), None, None).view;
    assert_eq!(view, FieldView::raw("42"));
}

#[test]
fn formatter_runs_before_dispatch() {
    let renderer = FieldRenderer::default();
    let f = |v: Value| match v {
        Value::String(s) => Value::String(s.to_uppercase()),
        Value::Number(n) => json!(n.as_f64().unwrap_or_default() * 2.0),
        other => json!([other]),
    };
    let values = [json!("2024-03-01t10:00:00z"), json!(21), json!(null), json!("abc")];

    for kind in FieldType::KNOWN.iter() {
        let field = FieldDescriptor::new("v", "V", kind.clone()).with_formatter(f);
        for value in &values {
            let with_formatter = renderer.render(&field, value.clone()).view;
            let pre_formatted = renderer
                .render_value(kind, f(value.clone()), None, None)
                .view;
            assert_eq!(with_formatter, pre_formatted, "kind {kind}");
        }
    }
}

#[tokio::test]
async fn badge_resolves_from_loading() {
    let renderer = FieldRenderer::default();
    let column =
        FieldDescriptor::new("status", "Status", FieldType::BadgeApi).with_api_action(statuses());

    let rendered = renderer.render_cell(&column, &json!({"status": "INACTIVE"}));
    assert_eq!(rendered.view, FieldView::Loading);
    assert!(rendered.is_pending());

    let view = rendered.resolve().await;
    assert_eq!(
        view,
        FieldView::Badge(Badge {
            label: "Inactive".into(),
            color: Some("red".into()),
        })
    );
}

#[tokio::test]
async fn multi_badge_keeps_only_matches() {
    let renderer = FieldRenderer::default();
    let column = FieldDescriptor::new("statuses", "Statuses", FieldType::MultiBadgeApi)
        .with_api_action(statuses());
    let view = renderer
        .render_cell(&column, &json!({"statuses": ["ACTIVE", "ARCHIVED", "INACTIVE"]}))
        .resolve()
        .await;
    assert_eq!(view.plain_text(), "Active, Inactive");
}

#[test_log::test(tokio::test)]
async fn failed_lookup_degrades_to_empty() {
    let renderer = FieldRenderer::default();
    let failing: Arc<dyn EnrichmentSource> = Arc::new(FnSource(|_v: Value| async {
        Err::<Enriched, _>(ApiError::with_status(500, "teacher service down"))
    }));

    let badge = FieldDescriptor::new("teacherId", "Teacher", FieldType::BadgeApi)
        .with_api_action(Arc::clone(&failing));
    let view = renderer.render_cell(&badge, &json!({"teacherId": 7})).resolve().await;
    assert_eq!(view, FieldView::Badge(Badge::plain("7")));

    let multi = FieldDescriptor::new("teacherIds", "Teachers", FieldType::MultiBadgeApi)
        .with_api_action(failing);
    let view = renderer
        .render_cell(&multi, &json!({"teacherIds": [7, 8]}))
        .resolve()
        .await;
    assert_eq!(view, FieldView::Badges { badges: vec![] });
}

#[tokio::test]
async fn link_uses_lookup_label() {
    let renderer = FieldRenderer::default();
    let source: Arc<dyn EnrichmentSource> = Arc::new(FnSource(|v: Value| async move {
        Ok::<_, ApiError>(Enriched::One(EnumOption::new(v, "Nguyen Van C")))
    }));
    let column =
        FieldDescriptor::new("studentId", "Student", FieldType::Link).with_api_action(source);
    let view = renderer.render_cell(&column, &json!({"studentId": 31})).resolve().await;
    assert_eq!(
        view,
        FieldView::Link {
            href: "31".into(),
            label: "Nguyen Van C".into(),
        }
    );
}

#[tokio::test]
async fn custom_delegates_to_action_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source: Arc<dyn EnrichmentSource> = Arc::new(FnSource(move |v: Value| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, ApiError>(Enriched::Value(json!({"stars": v}))) }
    }));

    let renderer = FieldRenderer::default();
    let custom = FieldDescriptor::new("rating", "Rating", FieldType::Custom).with_api_action(source);
    let view = renderer.render_cell(&custom, &json!({"rating": 4})).resolve().await;
    assert_eq!(view, FieldView::Custom { value: json!({"stars": 4}) });
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let plain = FieldDescriptor::new("rating", "Rating", FieldType::Custom);
    let view = renderer.render_cell(&plain, &json!({"rating": 4})).view;
    assert_eq!(view, FieldView::raw("4"));
}
