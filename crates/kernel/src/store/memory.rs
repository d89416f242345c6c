//! In-memory content store.
//!
//! Holds nodes, listing pages and templates in DashMaps. Used by the CLI
//! with YAML site fixtures and by the test suite.

use std::cmp::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{ContentStore, ListingPageStore};
use crate::listing::ListingQuery;
use crate::models::{ContentNode, ListingPage, ListingTemplate, NodeColumn, SortDirection};

/// Content store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    nodes: DashMap<i64, ContentNode>,
    pages: DashMap<i64, ListingPage>,
    templates: DashMap<i64, ListingTemplate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, node: ContentNode) {
        self.nodes.insert(node.id, node);
    }

    /// Insert or replace a listing page; its node joins the tree too.
    pub fn insert_page(&self, page: ListingPage) {
        self.nodes.insert(page.node.id, page.node.clone());
        self.pages.insert(page.node.id, page);
    }

    /// Insert or replace a listing template.
    pub fn insert_template(&self, template: ListingTemplate) {
        self.templates.insert(template.id, template);
    }

    /// Remove a template (pages referencing it are left untouched).
    pub fn remove_template(&self, id: i64) -> Option<ListingTemplate> {
        self.templates.remove(&id).map(|(_, t)| t)
    }

    /// Number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every match of a query, sorted, before windowing.
    fn matching(&self, query: &ListingQuery) -> Vec<ContentNode> {
        let mut matches: Vec<ContentNode> = self
            .nodes
            .iter()
            .filter(|r| query.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();

        // Deterministic tie order before the stable field sort.
        matches.sort_by_key(|n| n.id);

        let field = query.sort.field.as_str();
        let dynamic = matches!(NodeColumn::for_field(field), NodeColumn::Field(_));
        matches.sort_by(|a, b| {
            let (x, y) = (a.value_of(field), b.value_of(field));
            let ord = if dynamic {
                compare_as_text(&x, &y)
            } else {
                compare_values(&x, &y)
            };
            match query.sort.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        matches
    }
}

/// Order JSON values the way the SQL backend orders columns; NULL sorts last
/// when ascending.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Order dynamic field values the way `fields->>'Name'` does: by their text
/// form, so 10 sorts before 2. Missing values sort last when ascending.
fn compare_as_text(a: &Value, b: &Value) -> Ordering {
    match (as_text(a), as_text(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_by_id(&self, id: i64) -> Result<Option<ContentNode>> {
        Ok(self.nodes.get(&id).map(|r| r.value().clone()))
    }

    async fn children_of(&self, parent_id: i64) -> Result<Vec<ContentNode>> {
        let mut children: Vec<ContentNode> = self
            .nodes
            .iter()
            .filter(|r| r.value().parent_id == parent_id && r.value().id != parent_id)
            .map(|r| r.value().clone())
            .collect();
        children.sort_by_key(|n| n.id);
        Ok(children)
    }

    async fn query(&self, query: &ListingQuery) -> Result<Vec<ContentNode>> {
        let matches = self.matching(query);
        let Some(window) = query.window else {
            return Ok(matches);
        };
        let (start, end) = window.bounds(matches.len());
        Ok(matches[start..end].to_vec())
    }

    async fn count(&self, query: &ListingQuery) -> Result<u64> {
        let total = self
            .nodes
            .iter()
            .filter(|r| query.matches(r.value()))
            .count();
        Ok(total as u64)
    }
}

#[async_trait]
impl ListingPageStore for MemoryStore {
    async fn fetch_page(&self, id: i64) -> Result<Option<ListingPage>> {
        Ok(self.pages.get(&id).map(|r| r.value().clone()))
    }

    async fn save_page(&self, page: &ListingPage) -> Result<()> {
        self.insert_page(page.clone());
        Ok(())
    }

    async fn list_pages(&self) -> Result<Vec<ListingPage>> {
        let mut pages: Vec<ListingPage> = self.pages.iter().map(|r| r.value().clone()).collect();
        pages.sort_by_key(|p| p.id());
        Ok(pages)
    }

    async fn fetch_template(&self, id: i64) -> Result<Option<ListingTemplate>> {
        Ok(self.templates.get(&id).map(|r| r.value().clone()))
    }

    async fn list_templates(&self) -> Result<Vec<ListingTemplate>> {
        let mut templates: Vec<ListingTemplate> =
            self.templates.iter().map(|r| r.value().clone()).collect();
        templates.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(templates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::{PageWindow, SortClause};
    use serde_json::json;

    fn query(field: &str, direction: SortDirection, window: Option<PageWindow>) -> ListingQuery {
        ListingQuery {
            parent_ids: vec![1],
            list_type: "Page".to_string(),
            type_names: vec!["Page".to_string()],
            strict: false,
            sort: SortClause::new(field, direction),
            window,
        }
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_node(ContentNode::new(1, 0, "Page", "Root"));
        store.insert_node(ContentNode::new(2, 1, "Page", "Bravo").with_field("Rank", json!(3)));
        store.insert_node(ContentNode::new(3, 1, "Page", "Alpha").with_field("Rank", json!(1)));
        store.insert_node(ContentNode::new(4, 1, "Page", "Charlie"));
        store.insert_node(ContentNode::new(5, 1, "Photo", "Delta"));
        store
    }

    #[tokio::test]
    async fn query_sorts_and_filters() {
        let items = store()
            .query(&query("Title", SortDirection::Ascending, None))
            .await
            .unwrap();
        let titles: Vec<&str> = items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[tokio::test]
    async fn missing_field_sorts_last_ascending() {
        let items = store()
            .query(&query("Rank", SortDirection::Ascending, None))
            .await
            .unwrap();
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 4]);

        let items = store()
            .query(&query("Rank", SortDirection::Descending, None))
            .await
            .unwrap();
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![4, 2, 3]);
    }

    #[tokio::test]
    async fn dynamic_fields_sort_as_text() {
        let s = store();
        s.insert_node(ContentNode::new(6, 1, "Page", "Echo").with_field("Rank", json!(10)));
        let items = s
            .query(&query("Rank", SortDirection::Ascending, None))
            .await
            .unwrap();
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 6, 2, 4]);

        // Metadata columns stay numeric.
        let items = s
            .query(&query("ID", SortDirection::Descending, None))
            .await
            .unwrap();
        let ids: Vec<i64> = items.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![6, 4, 3, 2]);
    }

    #[tokio::test]
    async fn window_slices_after_sort() {
        let s = store();
        let items = s
            .query(&query("Title", SortDirection::Ascending, PageWindow::for_page(1, 2)))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Charlie");

        let beyond = s
            .query(&query("Title", SortDirection::Ascending, PageWindow::for_page(9, 2)))
            .await
            .unwrap();
        assert!(beyond.is_empty());

        let total = s
            .count(&query("Title", SortDirection::Ascending, PageWindow::for_page(1, 2)))
            .await
            .unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn children_in_id_order() {
        let kids = store().children_of(1).await.unwrap();
        let ids: Vec<i64> = kids.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn templates_listed_by_title() {
        let s = MemoryStore::new();
        s.insert_template(ListingTemplate::new(1, "Zeta"));
        s.insert_template(ListingTemplate::new(2, "Alpha"));
        let titles: Vec<String> = s
            .list_templates()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn pages_listed_by_id() {
        let s = MemoryStore::new();
        for id in [30, 10, 20] {
            s.insert_page(ListingPage::new(
                ContentNode::new(id, 0, "ListingPage", "Listing"),
                "$Listing",
            ));
        }
        s.insert_node(ContentNode::new(40, 0, "Page", "Plain"));

        let ids: Vec<i64> = s.list_pages().await.unwrap().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn text_ordering() {
        assert_eq!(compare_as_text(&json!(10), &json!(2)), Ordering::Less);
        assert_eq!(compare_as_text(&json!("b"), &json!(2)), Ordering::Greater);
        assert_eq!(compare_as_text(&Value::Null, &json!("a")), Ordering::Greater);
    }

    #[test]
    fn value_ordering() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Greater);
    }
}
