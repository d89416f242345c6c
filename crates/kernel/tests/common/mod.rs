#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds a small site in the memory store and wires the real listing
//! service and admin pipeline on top of it.
//!
//! Tree:
//!
//! ```text
//! 1 Home (Page)
//! ├── 10 News (ListingPage)
//! │   ├── 11 Alpha (Page)
//! │   │   └── 21 Delta (Article)
//! │   │       └── 31 Foxtrot (Article)
//! │   ├── 12 Bravo (Article)
//! │   │   └── 22 Echo (Article)
//! │   └── 13 Charlie (Photo)
//! ├── 40 Articles (ListingPage)
//! │   ├── 41 Kilo (Article)
//! │   ├── 42 Lima (Article)
//! │   └── 43 Mike (Photo)
//! └── 50 Archive (ListingPage)
//!     └── 51..=57 Item 1..Item 7 (Article, created 100..700)
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use listing_kernel::admin::ListingAdmin;
use listing_kernel::config::ListingDefaults;
use listing_kernel::content::{TypeDescriptor, TypeRegistry};
use listing_kernel::listing::ListingService;
use listing_kernel::models::{ContentNode, ListingConfig, ListingPage, ListingTemplate};
use listing_kernel::store::MemoryStore;

/// Template printing bracketed titles, easy to assert on.
pub const BRACKET_TEMPLATE_ID: i64 = 2;

/// Template using the stock item body.
pub const DEFAULT_TEMPLATE_ID: i64 = 1;

pub struct TestSite {
    pub store: Arc<MemoryStore>,
    pub registry: TypeRegistry,
}

impl TestSite {
    pub fn new() -> Self {
        let registry = TypeRegistry::from_descriptors([
            TypeDescriptor::new("Page")
                .hierarchical()
                .fields(&["Title", "Content"]),
            TypeDescriptor::new("Article")
                .parent("Page")
                .fields(&["Author", "Summary"]),
            TypeDescriptor::new("Photo").parent("Page").fields(&["Caption"]),
            TypeDescriptor::new("ListingPage").parent("Page"),
            TypeDescriptor::new("File").hierarchical(),
            TypeDescriptor::new("Folder").parent("File"),
        ])
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        store.insert_template(ListingTemplate::new(DEFAULT_TEMPLATE_ID, "Titles"));
        store.insert_template(
            ListingTemplate::new(BRACKET_TEMPLATE_ID, "Brackets")
                .with_body("{% for item in Items %}[{{ item.Title }}]{% endfor %}"),
        );

        store.insert_node(ContentNode::new(1, 0, "Page", "Home"));

        store.insert_node(ContentNode::new(11, 10, "Page", "Alpha"));
        store.insert_node(ContentNode::new(12, 10, "Article", "Bravo"));
        store.insert_node(ContentNode::new(13, 10, "Photo", "Charlie"));
        store.insert_node(ContentNode::new(21, 11, "Article", "Delta"));
        store.insert_node(ContentNode::new(22, 12, "Article", "Echo"));
        store.insert_node(ContentNode::new(31, 21, "Article", "Foxtrot"));

        store.insert_node(
            ContentNode::new(41, 40, "Article", "Kilo").with_field("Author", json!("Zed")),
        );
        store.insert_node(
            ContentNode::new(42, 40, "Article", "Lima").with_field("Author", json!("Amy")),
        );
        store.insert_node(ContentNode::new(43, 40, "Photo", "Mike"));

        for n in 1..=7 {
            let created = n * 100;
            store.insert_node(
                ContentNode::new(50 + n, 50, "Article", &format!("Item {n}"))
                    .with_timestamps(created, created),
            );
        }

        let site = Self { store, registry };
        site.add_page(10, "News", "<p>$Listing</p>", ListingConfig::default());
        site.add_page(40, "Articles", "<p>$Listing</p>", ListingConfig::default());
        site.add_page(50, "Archive", "<p>$Listing</p>", ListingConfig::default());
        site
    }

    /// Insert or replace a listing page under Home.
    pub fn add_page(&self, id: i64, title: &str, content: &str, config: ListingConfig) -> ListingPage {
        let page = ListingPage::new(ContentNode::new(id, 1, "ListingPage", title), content)
            .with_config(config);
        self.store.insert_page(page.clone());
        page
    }

    pub fn service(&self) -> ListingService {
        ListingService::new(
            self.store.clone(),
            self.store.clone(),
            self.registry.clone(),
            ListingDefaults::default(),
        )
    }

    pub fn admin(&self) -> ListingAdmin {
        ListingAdmin::new(
            self.store.clone(),
            self.registry.clone(),
            ListingDefaults::default(),
            5,
        )
    }
}

/// Listing settings with the bracket template selected.
pub fn config(list_type: &str) -> ListingConfig {
    ListingConfig {
        list_type: list_type.to_string(),
        listing_template_id: Some(BRACKET_TEMPLATE_ID),
        ..Default::default()
    }
}

/// IDs of a list of nodes, in order.
pub fn ids(nodes: &[ContentNode]) -> Vec<i64> {
    nodes.iter().map(|n| n.id).collect()
}
