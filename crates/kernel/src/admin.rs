//! Listing page administration.
//!
//! Save pipeline and the choice lists an edit form needs. Everything a
//! viewer would silently fall back on is reported here as a `ListingError`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ListingDefaults;
use crate::content::TypeRegistry;
use crate::error::{ListingError, ListingResult};
use crate::listing::{
    ListingItems, Pagination, TemplateRenderer, TeraRenderer, build_query, listing_context,
};
use crate::models::{ListingPage, ListingStyle, ListingTemplate};
use crate::store::ListingPageStore;

/// Choices offered when editing a listing page.
#[derive(Debug, Clone, Serialize)]
pub struct ListingFormOptions {
    /// Registered content types.
    pub list_types: Vec<String>,

    /// Sortable fields of the page's list type.
    pub sort_fields: Vec<String>,

    /// Allowed depth values, 1 through the configured maximum. Empty when the
    /// list type has no hierarchy.
    pub depths: Vec<u32>,

    /// Type whose tree the listing source is picked from. None when the list
    /// type has no hierarchy.
    pub source_type: Option<String>,

    /// Style labels.
    pub styles: Vec<&'static str>,

    /// Available item templates, ordered by title.
    pub templates: Vec<ListingTemplate>,
}

/// Administrative operations on listing pages.
pub struct ListingAdmin {
    pages: Arc<dyn ListingPageStore>,
    registry: TypeRegistry,
    renderer: Arc<dyn TemplateRenderer>,
    defaults: ListingDefaults,
    max_depth: u32,
}

impl ListingAdmin {
    pub fn new(
        pages: Arc<dyn ListingPageStore>,
        registry: TypeRegistry,
        defaults: ListingDefaults,
        max_depth: u32,
    ) -> Self {
        Self {
            pages,
            registry,
            renderer: Arc::new(TeraRenderer::new()),
            defaults,
            max_depth,
        }
    }

    /// Replace the renderer used to check templates compile.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validate and persist a listing page.
    ///
    /// A pending clear-source request is consumed first, so the stored page
    /// never carries it. Returns the page as stored.
    pub async fn save(&self, page: ListingPage) -> ListingResult<ListingPage> {
        let mut page = page;
        let clearing = page.config.clear_source;
        page.config = page.config.apply_pending_reset();
        if clearing {
            debug!(page_id = page.id(), "listing source cleared");
        }

        self.validate(&page).await?;

        page.node.changed = chrono::Utc::now().timestamp();
        self.pages.save_page(&page).await?;

        info!(page_id = page.id(), title = %page.node.title, "listing page saved");
        Ok(page)
    }

    /// Check a page's settings without saving it.
    pub async fn validate(&self, page: &ListingPage) -> ListingResult<()> {
        let config = &page.config;

        if config.depth > self.max_depth {
            return Err(ListingError::InvalidDepth {
                depth: config.depth,
                max: self.max_depth,
            });
        }

        if !config.list_type.is_empty() && !self.registry.exists(&config.list_type) {
            return Err(ListingError::UnknownListType(config.list_type.clone()));
        }

        let template_id = config
            .listing_template_id
            .ok_or(ListingError::MissingTemplate { page_id: page.id() })?;

        let template = self
            .pages
            .fetch_template(template_id)
            .await?
            .ok_or(ListingError::TemplateNotFound(template_id))?;

        self.check_template(page, &template)
    }

    /// Render the template against an empty listing to catch syntax errors.
    fn check_template(&self, page: &ListingPage, template: &ListingTemplate) -> ListingResult<()> {
        let query = build_query(&self.registry, &self.defaults, page.id(), &[], &page.config, 0);
        let preview = ListingItems {
            items: Vec::new(),
            pagination: Pagination::new(
                Pagination::param_name_for(&self.defaults.page_param_prefix, page.id()),
                0,
                page.config.per_page,
                0,
            ),
            source_id: page.id(),
            query,
        };

        self.renderer
            .render(&template.item_template, &listing_context(page, &preview))
            .map(|_| ())
            .map_err(|e| ListingError::InvalidTemplate {
                template_id: template.id,
                reason: format!("{e:#}"),
            })
    }

    /// Choice lists for editing `page`.
    pub async fn form_options(&self, page: &ListingPage) -> ListingResult<ListingFormOptions> {
        let list_type = page.config.list_type_or(&self.defaults.list_type);

        let (depths, source_type) = if self.registry.has_hierarchy(list_type) {
            (
                (1..=self.max_depth).collect(),
                Some(self.registry.source_type_for(list_type)),
            )
        } else {
            (Vec::new(), None)
        };

        Ok(ListingFormOptions {
            list_types: self.registry.type_names(),
            sort_fields: self.registry.selectable_fields(list_type),
            depths,
            source_type,
            styles: vec![ListingStyle::Standard.label(), ListingStyle::AToZ.label()],
            templates: self.pages.list_templates().await?,
        })
    }
}
