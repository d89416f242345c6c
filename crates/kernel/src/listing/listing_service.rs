//! Listing service.
//!
//! Composes the listing pipeline for one render:
//! source resolution -> tree walk -> query -> store fetch -> visibility ->
//! pagination -> item template -> body substitution.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use super::pager::{Pagination, page_number_from_query};
use super::query_builder::build_query;
use super::render::{TemplateRenderer, TeraRenderer, listing_context, substitute_listing};
use super::source::source_or_page;
use super::types::ListingItems;
use super::visibility::{AccessCheck, StatusAccess, Viewer, filter_visible};
use super::walker::collect_descendant_ids;
use crate::config::ListingDefaults;
use crate::content::TypeRegistry;
use crate::models::ListingPage;
use crate::store::{ContentStore, ListingPageStore};

/// Service rendering listing pages.
pub struct ListingService {
    store: Arc<dyn ContentStore>,
    pages: Arc<dyn ListingPageStore>,
    registry: TypeRegistry,
    access: Arc<dyn AccessCheck>,
    renderer: Arc<dyn TemplateRenderer>,
    defaults: ListingDefaults,
}

impl ListingService {
    /// Create a service with the default access rule and Tera renderer.
    pub fn new(
        store: Arc<dyn ContentStore>,
        pages: Arc<dyn ListingPageStore>,
        registry: TypeRegistry,
        defaults: ListingDefaults,
    ) -> Self {
        Self {
            store,
            pages,
            registry,
            access: Arc::new(StatusAccess),
            renderer: Arc::new(TeraRenderer::new()),
            defaults,
        }
    }

    /// Replace the viewer access check.
    pub fn with_access(mut self, access: Arc<dyn AccessCheck>) -> Self {
        self.access = access;
        self
    }

    /// Replace the template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Query parameter carrying this page's page number.
    pub fn page_param(&self, page: &ListingPage) -> String {
        Pagination::param_name_for(&self.defaults.page_param_prefix, page.id())
    }

    /// Visible items of one page of the listing.
    ///
    /// `page_number` is zero-based and comes from the caller's request.
    pub async fn listing_items(
        &self,
        page: &ListingPage,
        viewer: &Viewer,
        page_number: u32,
    ) -> Result<ListingItems> {
        let source = source_or_page(self.store.as_ref(), &self.registry, page).await?;
        let descendants =
            collect_descendant_ids(self.store.as_ref(), source.id, page.config.depth).await?;

        let query = build_query(
            &self.registry,
            &self.defaults,
            source.id,
            &descendants,
            &page.config,
            page_number,
        );
        debug!(
            page_id = page.id(),
            source_id = source.id,
            parents = query.parent_ids.len(),
            sort = %query.sort,
            "listing query built"
        );

        let total = self.store.count(&query).await?;
        let fetched = self.store.query(&query).await?;
        let items = filter_visible(self.access.as_ref(), fetched, viewer).await?;

        let pagination = Pagination::new(
            self.page_param(page),
            page_number,
            page.config.per_page,
            total,
        );

        Ok(ListingItems {
            items,
            pagination,
            source_id: source.id,
            query,
        })
    }

    /// Render the listing fragment for a page.
    ///
    /// A missing or broken template renders as an empty fragment; the
    /// admin save pipeline is where those are reported.
    pub async fn render_fragment(
        &self,
        page: &ListingPage,
        viewer: &Viewer,
        page_number: u32,
    ) -> Result<String> {
        let Some(template_id) = page.config.listing_template_id else {
            warn!(page_id = page.id(), "listing page has no template");
            return Ok(String::new());
        };
        let Some(template) = self.pages.fetch_template(template_id).await? else {
            warn!(page_id = page.id(), template_id, "listing template not found");
            return Ok(String::new());
        };

        let listing = self.listing_items(page, viewer, page_number).await?;
        let context = listing_context(page, &listing);

        match self.renderer.render(&template.item_template, &context) {
            Ok(fragment) => Ok(fragment),
            Err(e) => {
                warn!(page_id = page.id(), template_id, error = %e, "item template failed to render");
                Ok(String::new())
            }
        }
    }

    /// Render a page body with its listing spliced in.
    pub async fn render(
        &self,
        page: &ListingPage,
        viewer: &Viewer,
        page_number: u32,
    ) -> Result<String> {
        let fragment = self.render_fragment(page, viewer, page_number).await?;
        Ok(substitute_listing(&page.content, &fragment))
    }

    /// Look up a page and render it for a raw request query string.
    ///
    /// Returns None when no listing page has this ID.
    pub async fn render_page(
        &self,
        page_id: i64,
        viewer: &Viewer,
        query_string: &str,
    ) -> Result<Option<String>> {
        let Some(page) = self.pages.fetch_page(page_id).await? else {
            return Ok(None);
        };
        let page_number = page_number_from_query(query_string, &self.page_param(&page));
        self.render(&page, viewer, page_number).await.map(Some)
    }
}
