//! Listing query construction.
//!
//! `build_query` turns a page's settings and the walked parent ids into a
//! store-agnostic `ListingQuery`. `ListingQueryBuilder` renders that query
//! to PostgreSQL with SeaQuery:
//! - parent membership filter
//! - exact type or type-or-subtype filter
//! - sort on a column or a JSONB field
//! - LIMIT/OFFSET page window

use sea_query::{
    Alias, Asterisk, Expr, ExprTrait, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr,
};
use tracing::debug;

use super::types::{ListingQuery, PageWindow, SortClause};
use crate::config::ListingDefaults;
use crate::content::TypeRegistry;
use crate::models::{ListingConfig, NodeColumn, SortDirection};

/// Build the listing query for one render.
///
/// `descendant_ids` come from the tree walk; the source node itself is
/// always added as an accepted parent. `page` is zero-based.
pub fn build_query(
    registry: &TypeRegistry,
    defaults: &ListingDefaults,
    root_id: i64,
    descendant_ids: &[i64],
    config: &ListingConfig,
    page: u32,
) -> ListingQuery {
    let mut parent_ids = Vec::with_capacity(descendant_ids.len() + 1);
    for id in descendant_ids.iter().copied().chain(std::iter::once(root_id)) {
        if !parent_ids.contains(&id) {
            parent_ids.push(id);
        }
    }

    let list_type = config.list_type_or(&defaults.list_type).to_string();

    let type_names = if config.strict_type {
        vec![list_type.clone()]
    } else {
        registry.subtypes_of(&list_type)
    };

    let sort = SortClause::new(
        validated_sort_field(registry, &list_type, &config.sort_by, &defaults.sort_field),
        config.sort_dir,
    );

    ListingQuery {
        parent_ids,
        list_type,
        type_names,
        strict: config.strict_type,
        sort,
        window: PageWindow::for_page(page, config.per_page),
    }
}

/// Configured sort field if the type knows it, otherwise the default.
fn validated_sort_field<'a>(
    registry: &TypeRegistry,
    list_type: &str,
    configured: &'a str,
    default: &'a str,
) -> &'a str {
    if configured.is_empty() {
        return default;
    }
    if registry.is_selectable(list_type, configured) {
        configured
    } else {
        debug!(
            list_type = %list_type,
            sort_by = %configured,
            fallback = %default,
            "unknown sort field, using default"
        );
        default
    }
}

const NODE_TABLE: &str = "node";

/// Renders a `ListingQuery` as PostgreSQL against the `node` table.
pub struct ListingQueryBuilder<'a> {
    query: &'a ListingQuery,
}

impl<'a> ListingQueryBuilder<'a> {
    pub fn new(query: &'a ListingQuery) -> Self {
        Self { query }
    }

    /// Build the main SELECT with sort and page window.
    pub fn build(&self) -> String {
        let mut query = Query::select();

        query.column((Alias::new(NODE_TABLE), Asterisk));
        query.from(Alias::new(NODE_TABLE));

        self.add_filters(&mut query);
        self.add_sort(&mut query);

        if let Some(window) = self.query.window {
            query.limit(window.limit);
            query.offset(window.offset);
        }

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over every match (no window).
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(NODE_TABLE));

        self.add_filters(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    fn column(&self, name: &str) -> Expr {
        Expr::col((Alias::new(NODE_TABLE), Alias::new(name)))
    }

    /// Parent membership and type filters.
    fn add_filters(&self, query: &mut SelectStatement) {
        query.and_where(
            self.column("parent_id")
                .is_in(self.query.parent_ids.iter().copied()),
        );

        if self.query.strict {
            query.and_where(self.column("type").eq(self.query.list_type.as_str()));
        } else {
            query.and_where(
                self.column("type")
                    .is_in(self.query.type_names.iter().map(String::as_str)),
            );
        }
    }

    /// ORDER BY the validated sort field.
    fn add_sort(&self, query: &mut SelectStatement) {
        let order = match self.query.sort.direction {
            SortDirection::Ascending => Order::Asc,
            SortDirection::Descending => Order::Desc,
        };

        query.order_by_expr(self.sort_expr(&self.query.sort.field), order);
    }

    /// Expression for a schema field: a column, or `fields->>'Name'`, which
    /// orders as text.
    fn sort_expr(&self, field: &str) -> SimpleExpr {
        match NodeColumn::for_field(field) {
            NodeColumn::Field(name) if is_safe_field_name(&name) => {
                Expr::cust(format!("\"{NODE_TABLE}\".fields->>'{name}'"))
            }
            NodeColumn::Field(name) => {
                debug!(field = %name, "refusing unsafe sort field name, sorting by title");
                self.column("title").into()
            }
            column => {
                let name = column.column_name().unwrap_or("title");
                self.column(name).into()
            }
        }
    }
}

/// Field names accepted inside a JSONB path expression.
fn is_safe_field_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
