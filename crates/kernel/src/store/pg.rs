//! PostgreSQL content store.
//!
//! Reads the `node`, `listing_page` and `listing_template` tables. Listing
//! queries are rendered by `ListingQueryBuilder` and run inside a short
//! transaction with a statement timeout. Schema management is left to the
//! host application.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use super::{ContentStore, ListingPageStore};
use crate::listing::{ListingQuery, ListingQueryBuilder};
use crate::models::{
    ContentNode, ListingConfig, ListingPage, ListingStyle, ListingTemplate, SortDirection,
};

const NODE_COLUMNS: &str = "id, parent_id, type, title, status, created, changed, fields";

const PAGE_SELECT: &str = r#"
    SELECT n.id, n.parent_id, n.type, n.title, n.status, n.created, n.changed, n.fields,
           p.content, p.per_page, p.style, p.sort_by, p.sort_dir, p.list_type,
           p.listing_source_id, p.depth, p.clear_source, p.strict_type,
           p.listing_template_id
    FROM node n
    INNER JOIN listing_page p ON p.id = n.id
"#;

/// Content store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to database")?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn fetch_by_id(&self, id: i64) -> Result<Option<ContentNode>> {
        let node = sqlx::query_as::<_, ContentNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node by id")?;

        Ok(node)
    }

    async fn children_of(&self, parent_id: i64) -> Result<Vec<ContentNode>> {
        let nodes = sqlx::query_as::<_, ContentNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM node WHERE parent_id = $1 AND id <> $1 ORDER BY id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch node children")?;

        Ok(nodes)
    }

    async fn query(&self, query: &ListingQuery) -> Result<Vec<ContentNode>> {
        let sql = ListingQueryBuilder::new(query).build();
        debug!(sql = %sql, "listing query");

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query("SET LOCAL statement_timeout = '10s'")
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let nodes = sqlx::query_as::<_, ContentNode>(&sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute listing query")?;

        tx.commit()
            .await
            .context("failed to commit listing query transaction")?;

        Ok(nodes)
    }

    async fn count(&self, query: &ListingQuery) -> Result<u64> {
        let sql = ListingQueryBuilder::new(query).build_count();
        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .context("failed to execute listing count query")?;

        Ok(u64::try_from(total).unwrap_or(0))
    }
}

/// Joined `node` + `listing_page` row.
#[derive(sqlx::FromRow)]
struct ListingPageRow {
    id: i64,
    parent_id: i64,
    #[sqlx(rename = "type")]
    node_type: String,
    title: String,
    status: i16,
    created: i64,
    changed: i64,
    fields: serde_json::Value,
    content: String,
    per_page: i32,
    style: String,
    sort_by: String,
    sort_dir: String,
    list_type: String,
    listing_source_id: i64,
    depth: i32,
    clear_source: bool,
    strict_type: bool,
    listing_template_id: Option<i64>,
}

impl From<ListingPageRow> for ListingPage {
    fn from(row: ListingPageRow) -> Self {
        ListingPage {
            node: ContentNode {
                id: row.id,
                parent_id: row.parent_id,
                node_type: row.node_type,
                title: row.title,
                status: row.status,
                created: row.created,
                changed: row.changed,
                fields: row.fields,
            },
            content: row.content,
            config: ListingConfig {
                per_page: u32::try_from(row.per_page).unwrap_or(0),
                style: ListingStyle::from(row.style),
                sort_by: row.sort_by,
                sort_dir: SortDirection::parse(&row.sort_dir),
                list_type: row.list_type,
                strict_type: row.strict_type,
                listing_source_id: row.listing_source_id,
                depth: u32::try_from(row.depth).unwrap_or(0),
                clear_source: row.clear_source,
                listing_template_id: row.listing_template_id,
            },
        }
    }
}

fn sort_dir_label(dir: SortDirection) -> &'static str {
    match dir {
        SortDirection::Ascending => "Ascending",
        SortDirection::Descending => "Descending",
    }
}

#[async_trait]
impl ListingPageStore for PgContentStore {
    async fn fetch_page(&self, id: i64) -> Result<Option<ListingPage>> {
        let row = sqlx::query_as::<_, ListingPageRow>(&format!("{PAGE_SELECT} WHERE n.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch listing page")?;

        Ok(row.map(ListingPage::from))
    }

    async fn list_pages(&self) -> Result<Vec<ListingPage>> {
        let rows = sqlx::query_as::<_, ListingPageRow>(&format!("{PAGE_SELECT} ORDER BY n.id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list listing pages")?;

        Ok(rows.into_iter().map(ListingPage::from).collect())
    }

    async fn save_page(&self, page: &ListingPage) -> Result<()> {
        let config = &page.config;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start transaction")?;

        sqlx::query("UPDATE node SET title = $1, changed = $2 WHERE id = $3")
            .bind(&page.node.title)
            .bind(page.node.changed)
            .bind(page.node.id)
            .execute(&mut *tx)
            .await
            .context("failed to update listing page node")?;

        sqlx::query(
            r#"
            INSERT INTO listing_page (id, content, per_page, style, sort_by, sort_dir, list_type,
                                      listing_source_id, depth, clear_source, strict_type,
                                      listing_template_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                per_page = EXCLUDED.per_page,
                style = EXCLUDED.style,
                sort_by = EXCLUDED.sort_by,
                sort_dir = EXCLUDED.sort_dir,
                list_type = EXCLUDED.list_type,
                listing_source_id = EXCLUDED.listing_source_id,
                depth = EXCLUDED.depth,
                clear_source = EXCLUDED.clear_source,
                strict_type = EXCLUDED.strict_type,
                listing_template_id = EXCLUDED.listing_template_id
            "#,
        )
        .bind(page.node.id)
        .bind(&page.content)
        .bind(i32::try_from(config.per_page).unwrap_or(i32::MAX))
        .bind(config.style.label())
        .bind(&config.sort_by)
        .bind(sort_dir_label(config.sort_dir))
        .bind(&config.list_type)
        .bind(config.listing_source_id)
        .bind(i32::try_from(config.depth).unwrap_or(i32::MAX))
        .bind(config.clear_source)
        .bind(config.strict_type)
        .bind(config.listing_template_id)
        .execute(&mut *tx)
        .await
        .context("failed to upsert listing page settings")?;

        tx.commit().await.context("failed to commit transaction")?;
        Ok(())
    }

    async fn fetch_template(&self, id: i64) -> Result<Option<ListingTemplate>> {
        let template = sqlx::query_as::<_, ListingTemplate>(
            "SELECT id, title, item_template FROM listing_template WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch listing template")?;

        Ok(template)
    }

    async fn list_templates(&self) -> Result<Vec<ListingTemplate>> {
        let templates = sqlx::query_as::<_, ListingTemplate>(
            "SELECT id, title, item_template FROM listing_template ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list listing templates")?;

        Ok(templates)
    }
}
