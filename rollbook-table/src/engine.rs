//! The table engine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rollbook_common::{Pretty, Record, SortOrder};
use rollbook_config::{DisplayConfig, TableConfig};
use rollbook_fields::{FieldDescriptor, FieldRenderer, Rendered};
use rollbook_forms::FormFieldDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::cache::{CacheEvent, QueryCache, SourceKey};
use crate::error::{Result, TableError};
use crate::filter::{FilterDescriptor, QueryParams};
use crate::query::QueryApi;

type ActionFn<A> = Arc<dyn Fn(&Record) -> A + Send + Sync>;

/// Column heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub key: String,
    pub title: String,
}

/// One rendered row. `actions` holds the row's action cell when the table has
/// an action column.
#[derive(Debug)]
pub struct TableRow<A> {
    pub record: Record,
    pub cells: Vec<Rendered>,
    pub actions: Option<A>,
}

/// One page of a rendered table.
#[derive(Debug)]
pub struct TableView<A> {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<TableRow<A>>,
    /// 1-based
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<A> TableView<A> {
    /// Wait for every cell's enrichment and return the final plain text grid.
    pub async fn resolve_text(self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            let mut line = Vec::with_capacity(row.cells.len());
            for cell in row.cells {
                line.push(cell.resolve().await.plain_text());
            }
            grid.push(line);
        }
        grid
    }
}

/// Builds a [`TableEngine`].
pub struct TableBuilder<A> {
    source_key: SourceKey,
    query: Arc<dyn QueryApi>,
    cache: QueryCache,
    columns: Vec<FieldDescriptor>,
    filters: Vec<FilterDescriptor>,
    actions: Option<ActionFn<A>>,
    renderer: FieldRenderer,
    config: TableConfig,
}

impl<A> TableBuilder<A> {
    pub fn column(mut self, column: FieldDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an action column built per row.
    pub fn action_column<F>(mut self, build: F) -> Self
    where
        F: Fn(&Record) -> A + Send + Sync + 'static,
    {
        self.actions = Some(Arc::new(build));
        self
    }

    pub fn display(mut self, display: DisplayConfig) -> Self {
        self.renderer = FieldRenderer::new(display);
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TableEngine<A> {
        TableEngine {
            source_key: self.source_key,
            query: self.query,
            cache: self.cache,
            columns: self.columns,
            filters: self.filters,
            filter_values: Mutex::new(Map::new()),
            actions: self.actions,
            renderer: self.renderer,
            config: self.config,
        }
    }
}

/// Fetches, caches, filters, renders and pages one dataset.
pub struct TableEngine<A = ()> {
    source_key: SourceKey,
    query: Arc<dyn QueryApi>,
    cache: QueryCache,
    columns: Vec<FieldDescriptor>,
    filters: Vec<FilterDescriptor>,
    filter_values: Mutex<Map<String, Value>>,
    actions: Option<ActionFn<A>>,
    renderer: FieldRenderer,
    config: TableConfig,
}

impl<A> TableEngine<A> {
    pub fn builder(
        source_key: impl Into<SourceKey>,
        query: Arc<dyn QueryApi>,
        cache: QueryCache,
    ) -> TableBuilder<A> {
        TableBuilder {
            source_key: source_key.into(),
            query,
            cache,
            columns: Vec::new(),
            filters: Vec::new(),
            actions: None,
            renderer: FieldRenderer::default(),
            config: TableConfig::default(),
        }
    }

    fn filter_values(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.filter_values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn source_key(&self) -> &SourceKey {
        &self.source_key
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn columns(&self) -> &[FieldDescriptor] {
        &self.columns
    }

    /// Inputs for the embedded filter controls.
    pub fn filter_inputs(&self) -> Vec<&FormFieldDescriptor> {
        self.filters.iter().map(|f| &f.input).collect()
    }

    pub fn filter_value(&self, name: &str) -> Option<Value> {
        self.filter_values().get(name).cloned()
    }

    /// Change a filter and invalidate the table's key, forcing a refetch.
    pub fn set_filter(&self, name: &str, value: Value) -> Result<()> {
        let filter = self
            .filters
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| TableError::unknown_filter(name))?;
        self.filter_values().insert(name.to_string(), value.clone());
        if let Some(hook) = &filter.input.on_change_extra {
            hook(&value);
        }
        self.invalidate();
        Ok(())
    }

    pub fn clear_filters(&self) {
        self.filter_values().clear();
        self.invalidate();
    }

    pub fn invalidate(&self) {
        self.cache.invalidate(&self.source_key);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// Parameters for the next fetch.
    ///
    /// Sorting follows the first column that declares an order, else the
    /// configured default (newest first).
    pub fn params(&self) -> QueryParams {
        let values = self.filter_values();
        let filters = self
            .filters
            .iter()
            .filter_map(|f| values.get(f.name()).and_then(|v| f.condition(v)))
            .collect();
        let (sort_field, sort_order) = self
            .columns
            .iter()
            .find_map(|c| c.sort.map(|order| (Some(c.key.clone()), order)))
            .unwrap_or((None, self.config.default_sort_order));
        QueryParams {
            filters,
            sort_field,
            sort_order,
        }
    }

    /// Current rows: cached if fresh, otherwise fetched.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn fetch(&self) -> Result<Vec<Record>> {
        let params = self.params();
        if let Some(rows) = self.cache.fresh(&self.source_key, &params) {
            return Ok(rows);
        }

        let ticket = self.cache.begin_fetch(&self.source_key);
        debug!(key = %self.source_key, params = %Pretty(&params), "fetching rows");
        let rows = self.query.query(&params).await.map_err(|err| {
            warn!(key = %self.source_key, error = %err, "query failed");
            TableError::query(self.source_key.clone(), err)
        })?;
        debug!(key = %self.source_key, count = rows.len(), "fetched rows");

        self.cache
            .store(&self.source_key, ticket, params, rows.clone());
        Ok(rows)
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size.max(1)
    }

    /// Render one page (1-based, clamped to the available pages).
    pub async fn render(&self, page: usize) -> Result<TableView<A>> {
        let rows = self.fetch().await?;
        let total = rows.len();
        let size = self.page_size();
        let page_count = total.div_ceil(size).max(1);
        let page = page.clamp(1, page_count);

        let rows = rows
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .map(|record| self.render_row(record))
            .collect();

        Ok(TableView {
            columns: self
                .columns
                .iter()
                .map(|c| ColumnHeader {
                    key: c.key.clone(),
                    title: c.title.clone(),
                })
                .collect(),
            rows,
            page,
            page_count,
            total,
        })
    }

    fn render_row(&self, record: Record) -> TableRow<A> {
        let cells = self
            .columns
            .iter()
            .map(|column| self.renderer.render_cell(column, &record))
            .collect();
        let actions = self.actions.as_ref().map(|build| build(&record));
        TableRow {
            record,
            cells,
            actions,
        }
    }

    pub fn default_sort_order(&self) -> SortOrder {
        self.config.default_sort_order
    }
}

impl<A> std::fmt::Debug for TableEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEngine")
            .field("source_key", &self.source_key)
            .field("columns", &self.columns.len())
            .field("filters", &self.filters.len())
            .field("page_size", &self.config.page_size)
            .finish()
    }
}
