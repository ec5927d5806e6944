//! Resource pages: a table with create, edit and delete overlays.
//!
//! Every successful mutation invalidates the page's source key and closes the
//! overlay it came from; the caller receives a [`PageEvent`] carrying the
//! notification to show.

use std::sync::Arc;

use rollbook_common::{Notification, Record};
use rollbook_config::RollbookConfig;
use rollbook_fields::FieldDescriptor;
use rollbook_forms::{FieldErrors, FormEngine, SubmitOutcome};
use rollbook_overlay::{ConfirmAction, Cta, CtaOutcome, CtaTrigger, Overlay};
use rollbook_table::{
    FilterDescriptor, QueryApi, QueryCache, SourceKey, TableEngine, TableError, TableView,
};
use serde_json::Value;
use tracing::{debug, info};

/// What a page interaction produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A mutation succeeded; the table will refetch.
    Saved(Notification),
    /// The collaborator rejected the request.
    Failed(Notification),
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// Show this confirmation message before continuing.
    AwaitingConfirmation(String),
    Declined,
    /// A request was already in flight.
    Ignored,
    /// The overlay was unmounted before the response arrived.
    Discarded,
}

impl PageEvent {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            PageEvent::Saved(n) | PageEvent::Failed(n) => Some(n),
            _ => None,
        }
    }
}

/// Success messages for each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMessages {
    pub created: String,
    pub updated: String,
    pub deleted: String,
}

impl Default for PageMessages {
    fn default() -> Self {
        Self {
            created: "Created successfully".into(),
            updated: "Updated successfully".into(),
            deleted: "Deleted successfully".into(),
        }
    }
}

/// A form hosted in a modal or drawer.
pub struct ModalForm {
    overlay: Overlay,
    form: FormEngine,
    cache: QueryCache,
    key: SourceKey,
    success_message: String,
}

impl ModalForm {
    pub fn new(
        overlay: Overlay,
        form: FormEngine,
        cache: QueryCache,
        key: SourceKey,
        success_message: impl Into<String>,
    ) -> Self {
        Self {
            overlay,
            form,
            cache,
            key,
            success_message: success_message.into(),
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn form(&self) -> &FormEngine {
        &self.form
    }

    pub fn open(&self) {
        self.overlay.open();
    }

    /// Submit the form. Success invalidates the page and closes the overlay.
    ///
    /// If the overlay was unmounted while the request was in flight, the
    /// outcome is discarded, but a committed save still invalidates the page.
    pub async fn submit(&self) -> PageEvent {
        let outcome = self.form.submit().await;
        if outcome.is_success() {
            self.cache.invalidate(&self.key);
        }
        if !self.overlay.is_mounted() {
            debug!(title = self.overlay.title(), "overlay unmounted, discarding outcome");
            return PageEvent::Discarded;
        }
        match outcome {
            SubmitOutcome::Succeeded(_) => {
                self.overlay.close();
                info!(title = self.overlay.title(), "saved");
                PageEvent::Saved(Notification::success(&self.success_message))
            }
            SubmitOutcome::Failed(err) => PageEvent::Failed(Notification::from_error(&err)),
            SubmitOutcome::Invalid(errors) => PageEvent::Invalid(errors),
            SubmitOutcome::Ignored => PageEvent::Ignored,
        }
    }
}

impl std::fmt::Debug for ModalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalForm")
            .field("overlay", &self.overlay)
            .field("key", &self.key)
            .finish()
    }
}

/// A row's delete button.
#[derive(Debug)]
pub struct RowDelete {
    cta: Cta,
    cache: QueryCache,
    key: SourceKey,
    success_message: String,
}

impl RowDelete {
    pub fn new(cta: Cta, cache: QueryCache, key: SourceKey, success_message: impl Into<String>) -> Self {
        Self {
            cta,
            cache,
            key,
            success_message: success_message.into(),
        }
    }

    pub fn cta(&self) -> &Cta {
        &self.cta
    }

    pub async fn trigger(&self) -> PageEvent {
        match self.cta.trigger().await {
            CtaTrigger::NeedsConfirmation(message) => PageEvent::AwaitingConfirmation(message),
            CtaTrigger::Completed(outcome) => self.finish(outcome),
        }
    }

    pub async fn confirm(&self) -> PageEvent {
        match self.cta.confirm().await {
            Ok(outcome) => self.finish(outcome),
            Err(err) => {
                debug!(error = %err, "confirm without a pending confirmation");
                PageEvent::Ignored
            }
        }
    }

    pub fn decline(&self) -> PageEvent {
        self.finish(self.cta.decline())
    }

    fn finish(&self, outcome: CtaOutcome) -> PageEvent {
        match outcome {
            CtaOutcome::Succeeded(_) => {
                self.cache.invalidate(&self.key);
                PageEvent::Saved(Notification::success(&self.success_message))
            }
            CtaOutcome::Failed(err) => PageEvent::Failed(Notification::from_error(&err)),
            CtaOutcome::Declined => PageEvent::Declined,
            CtaOutcome::Ignored => PageEvent::Ignored,
        }
    }
}

/// The action cell of one row.
#[derive(Debug, Default)]
pub struct RowActions {
    pub edit: Option<ModalForm>,
    pub delete: Option<RowDelete>,
}

type EditFn = Arc<dyn Fn(&Record) -> FormEngine + Send + Sync>;
type DeleteFn = Arc<dyn Fn(&Record) -> Arc<dyn ConfirmAction> + Send + Sync>;

/// Builds a [`ResourcePage`].
pub struct ResourcePageBuilder {
    title: String,
    key: SourceKey,
    query: Arc<dyn QueryApi>,
    cache: QueryCache,
    columns: Vec<FieldDescriptor>,
    filters: Vec<FilterDescriptor>,
    config: RollbookConfig,
    messages: PageMessages,
    create: Option<(String, FormEngine)>,
    edit: Option<EditFn>,
    delete: Option<(Option<String>, DeleteFn)>,
}

impl ResourcePageBuilder {
    pub fn columns(mut self, columns: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn config(mut self, config: RollbookConfig) -> Self {
        self.config = config;
        self
    }

    pub fn messages(mut self, messages: PageMessages) -> Self {
        self.messages = messages;
        self
    }

    /// A create button labelled `trigger_label` opening `form` in a modal.
    pub fn create_form(mut self, trigger_label: impl Into<String>, form: FormEngine) -> Self {
        self.create = Some((trigger_label.into(), form));
        self
    }

    /// An edit modal per row, with a form built from the row.
    pub fn edit_form<F>(mut self, build: F) -> Self
    where
        F: Fn(&Record) -> FormEngine + Send + Sync + 'static,
    {
        self.edit = Some(Arc::new(build));
        self
    }

    /// A delete button per row. With a message, the button asks for
    /// confirmation first.
    pub fn delete_action<F>(mut self, confirm_message: Option<String>, build: F) -> Self
    where
        F: Fn(&Record) -> Arc<dyn ConfirmAction> + Send + Sync + 'static,
    {
        self.delete = Some((confirm_message, Arc::new(build)));
        self
    }

    pub fn build(self) -> ResourcePage {
        let Self {
            title,
            key,
            query,
            cache,
            columns,
            filters,
            config,
            messages,
            create,
            edit,
            delete,
        } = self;

        let create = create.map(|(label, form)| {
            ModalForm::new(
                Overlay::modal(format!("Create {title}"), label),
                form,
                cache.clone(),
                key.clone(),
                messages.created.clone(),
            )
        });

        let row_cache = cache.clone();
        let row_key = key.clone();
        let row_messages = messages.clone();
        let row_title = title.clone();
        let actions = move |record: &Record| RowActions {
            edit: edit.as_ref().map(|build| {
                ModalForm::new(
                    Overlay::modal(format!("Edit {row_title}"), "Edit"),
                    build(record),
                    row_cache.clone(),
                    row_key.clone(),
                    row_messages.updated.clone(),
                )
            }),
            delete: delete.as_ref().map(|(confirm, build)| {
                let cta = Cta::with_action("Delete", build(record));
                let cta = match confirm {
                    Some(message) => cta.confirm_with(message.clone()),
                    None => cta,
                };
                RowDelete::new(
                    cta,
                    row_cache.clone(),
                    row_key.clone(),
                    row_messages.deleted.clone(),
                )
            }),
        };

        let mut table = TableEngine::builder(key.clone(), query, cache.clone())
            .columns(columns)
            .display(config.display.clone())
            .config(config.table.clone())
            .action_column(actions);
        for filter in filters {
            table = table.filter(filter);
        }

        ResourcePage {
            title,
            key,
            cache,
            table: table.build(),
            create,
        }
    }
}

/// A resource listing with its create, edit and delete overlays.
pub struct ResourcePage {
    title: String,
    key: SourceKey,
    cache: QueryCache,
    table: TableEngine<RowActions>,
    create: Option<ModalForm>,
}

impl ResourcePage {
    pub fn builder(
        title: impl Into<String>,
        key: impl Into<SourceKey>,
        query: Arc<dyn QueryApi>,
        cache: QueryCache,
    ) -> ResourcePageBuilder {
        ResourcePageBuilder {
            title: title.into(),
            key: key.into(),
            query,
            cache,
            columns: Vec::new(),
            filters: Vec::new(),
            config: RollbookConfig::default(),
            messages: PageMessages::default(),
            create: None,
            edit: None,
            delete: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_key(&self) -> &SourceKey {
        &self.key
    }

    pub fn table(&self) -> &TableEngine<RowActions> {
        &self.table
    }

    pub fn create(&self) -> Option<&ModalForm> {
        self.create.as_ref()
    }

    pub async fn render(&self, page: usize) -> Result<TableView<RowActions>, TableError> {
        self.table.render(page).await
    }

    /// Like [`ResourcePage::render`], turning a failure into an error event.
    pub async fn render_or_event(&self, page: usize) -> Result<TableView<RowActions>, PageEvent> {
        self.table
            .render(page)
            .await
            .map_err(|err| PageEvent::Failed(Notification::from_error(&err)))
    }

    pub fn set_filter(&self, name: &str, value: Value) -> Result<(), TableError> {
        self.table.set_filter(name, value)
    }

    pub fn refresh(&self) {
        self.cache.invalidate(&self.key);
    }
}

impl std::fmt::Debug for ResourcePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePage")
            .field("title", &self.title)
            .field("key", &self.key)
            .field("table", &self.table)
            .finish()
    }
}
