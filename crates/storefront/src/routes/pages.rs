//! Home and menu pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use juicequ_core::CategoryId;

use crate::backend::{Product, ProductQuery, ProductSort};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Products shown on the home page.
const FEATURED_COUNT: u32 = 6;

/// Product card data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub orderable: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.display_price(),
            image_url: product.image_url.clone(),
            orderable: product.is_orderable(),
        }
    }
}

/// Category filter option for templates.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Sort option for templates.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Menu URL for `page`, keeping the active filters.
fn menu_page_url(
    search: Option<&str>,
    category_id: Option<CategoryId>,
    sort: Option<ProductSort>,
    page: u32,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(search) = search {
        query.append_pair("search", search);
    }
    if let Some(id) = category_id {
        query.append_pair("category_id", &id.to_string());
    }
    if let Some(sort) = sort {
        query.append_pair("sort", sort.as_query());
    }
    query.append_pair("page", &page.to_string());
    format!("/menu?{}", query.finish())
}

fn sort_options(current: Option<ProductSort>) -> Vec<SortOption> {
    [
        (ProductSort::Popular, "Most popular"),
        (ProductSort::PriceAsc, "Price: low to high"),
        (ProductSort::PriceDesc, "Price: high to low"),
        (ProductSort::NameAsc, "Name"),
    ]
    .into_iter()
    .map(|(sort, label)| SortOption {
        value: sort.as_query(),
        label,
        selected: current == Some(sort),
    })
    .collect()
}

/// Menu query parameters.
///
/// `category` is a name, as produced by voice filters the catalog could not
/// resolve to an ID.
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category: Option<String>,
    pub sort: Option<ProductSort>,
    pub page: Option<u32>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCard>,
    pub user: Option<CurrentUser>,
    pub assistant_enabled: bool,
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub products: Vec<ProductCard>,
    pub categories: Vec<CategoryOption>,
    pub sort_options: Vec<SortOption>,
    pub search: String,
    pub current_page: u32,
    pub next_page_url: Option<String>,
    pub notice: Option<String>,
    pub user: Option<CurrentUser>,
    pub assistant_enabled: bool,
}

/// Display the home page.
#[instrument(skip(state, auth))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
    let query = ProductQuery {
        sort: Some(ProductSort::Popular),
        page_size: Some(FEATURED_COUNT),
        ..ProductQuery::default()
    };

    let featured = match state.backend().list_products(&query).await {
        Ok(page) => page.items.iter().map(ProductCard::from).collect(),
        Err(e) => {
            warn!("Failed to fetch featured products: {e}");
            Vec::new()
        }
    };

    HomeTemplate {
        featured,
        user: auth.map(|a| a.user),
        assistant_enabled: state.config().voice.assistant_enabled,
    }
}

/// Display the menu, optionally searched, filtered and sorted.
#[instrument(skip(state, auth))]
pub async fn menu(
    State(state): State<AppState>,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<MenuQuery>,
) -> impl IntoResponse {
    let backend = state.backend();
    let mut notice = None;

    let categories = match backend.list_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            warn!("Failed to fetch categories: {e}");
            Vec::new()
        }
    };

    let mut category_id = query.category_id;
    if category_id.is_none()
        && let Some(name) = query.category.as_deref().filter(|n| !n.trim().is_empty())
    {
        match backend.find_category(name).await {
            Ok(Some(category)) => category_id = Some(category.id),
            Ok(None) => notice = Some(format!("We don't have a \"{name}\" category")),
            Err(e) => warn!("Failed to resolve category {name}: {e}"),
        }
    }

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    let current_page = query.page.unwrap_or(1).max(1);
    let listing = ProductQuery {
        search: search.clone(),
        category_id,
        sort: query.sort,
        page: Some(current_page),
        page_size: None,
    };

    let (products, has_more_pages) = match backend.list_products(&listing).await {
        Ok(page) => {
            let shown = page.page.saturating_mul(page.page_size);
            (
                page.items.iter().map(ProductCard::from).collect::<Vec<_>>(),
                shown < page.total,
            )
        }
        Err(e) => {
            warn!("Failed to fetch products: {e}");
            notice = Some("The menu is unavailable right now, please try again".to_string());
            (Vec::new(), false)
        }
    };

    if products.is_empty() && notice.is_none() && search.is_some() {
        notice = Some("No juices match your search".to_string());
    }

    let next_page_url = has_more_pages.then(|| {
        menu_page_url(search.as_deref(), category_id, query.sort, current_page + 1)
    });

    MenuTemplate {
        products,
        categories: categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id.to_string(),
                name: c.name.clone(),
                selected: category_id == Some(c.id),
            })
            .collect(),
        sort_options: sort_options(query.sort),
        search: search.unwrap_or_default(),
        current_page,
        next_page_url,
        notice,
        user: auth.map(|a| a.user),
        assistant_enabled: state.config().voice.assistant_enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_options_mark_current() {
        let options = sort_options(Some(ProductSort::PriceDesc));
        assert_eq!(options.len(), 4);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|o| o.value), Some("price_desc"));

        assert!(sort_options(None).iter().all(|o| !o.selected));
    }

    #[test]
    fn test_menu_page_url_keeps_filters() {
        assert_eq!(menu_page_url(None, None, None, 2), "/menu?page=2");
        assert_eq!(
            menu_page_url(
                Some("mango jus"),
                Some(CategoryId::new(3)),
                Some(ProductSort::PriceAsc),
                4
            ),
            "/menu?search=mango+jus&category_id=3&sort=price_asc&page=4"
        );
    }
}
