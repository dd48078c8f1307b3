//! Multi-page print layout for catalogue export.
//!
//! The document is a cover, an introduction, product pages in sort order and
//! a back cover. Cover, introduction and back cover can be switched off in the
//! `layout` settings section.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::settings::{BRANDING_KEY, CONTACT_KEY, CatalogueStyle},
    models::{Catalogue, Category, PriceDisplay, Product},
};

pub const PRICE_ON_REQUEST: &str = "Price on request";

#[derive(Debug, Serialize, ToSchema)]
pub struct PrintLayout {
    pub catalogue_id: Uuid,
    pub theme: String,
    pub page_count: usize,
    pub style: CatalogueStyle,
    pub pages: Vec<LayoutPage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LayoutPage {
    /// 1-based page number within the document.
    pub number: usize,
    #[serde(flatten)]
    pub content: PageContent,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Cover {
        title: String,
        subtitle: Option<String>,
        logo_url: Option<String>,
    },
    Intro {
        description: Option<String>,
        categories: Vec<String>,
        #[schema(value_type = Object)]
        contact: Value,
    },
    Products {
        items: Vec<LayoutItem>,
    },
    BackCover {
        #[schema(value_type = Object)]
        contact: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LayoutItem {
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub category_color: Option<String>,
    pub price_label: Option<String>,
    pub image_url: Option<String>,
}

pub fn build_layout(
    catalogue: &Catalogue,
    categories: &[Category],
    products: &[Product],
    style: &CatalogueStyle,
) -> PrintLayout {
    let contact = catalogue
        .settings
        .get(CONTACT_KEY)
        .cloned()
        .unwrap_or(Value::Null);
    let logo_url = catalogue
        .settings
        .get(BRANDING_KEY)
        .and_then(|b| b.get("logo_url"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let by_id: HashMap<Uuid, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    let mut ordered: Vec<&Product> = products.iter().collect();
    ordered.sort_by_key(|p| p.sort_order);

    let mut contents = Vec::new();
    if style.layout.show_cover {
        contents.push(PageContent::Cover {
            title: catalogue.name.clone(),
            subtitle: catalogue.description.clone(),
            logo_url,
        });
    }
    if style.layout.show_intro {
        contents.push(PageContent::Intro {
            description: catalogue.description.clone(),
            categories: categories.iter().map(|c| c.name.clone()).collect(),
            contact: contact.clone(),
        });
    }
    for chunk in ordered.chunks(style.layout.products_per_page()) {
        let items = chunk
            .iter()
            .map(|product| layout_item(product, &by_id))
            .collect();
        contents.push(PageContent::Products { items });
    }
    if style.layout.show_back_cover {
        contents.push(PageContent::BackCover { contact });
    }

    let pages: Vec<LayoutPage> = contents
        .into_iter()
        .enumerate()
        .map(|(index, content)| LayoutPage {
            number: index + 1,
            content,
        })
        .collect();

    PrintLayout {
        catalogue_id: catalogue.id,
        theme: catalogue.theme.clone(),
        page_count: pages.len(),
        style: style.clone(),
        pages,
    }
}

fn layout_item(product: &Product, categories: &HashMap<Uuid, &Category>) -> LayoutItem {
    let category = product.category_id.and_then(|id| categories.get(&id));
    LayoutItem {
        product_id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        category: category.map(|c| c.name.clone()),
        category_color: category.and_then(|c| c.color.clone()),
        price_label: price_label(product),
        image_url: product.image_urls.first().cloned(),
    }
}

pub fn price_label(product: &Product) -> Option<String> {
    match product.price_display {
        PriceDisplay::Show => Some(format!("{:.2}", product.price)),
        PriceDisplay::Hide => None,
        PriceDisplay::Contact => Some(PRICE_ON_REQUEST.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::resolve_style;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn catalogue(settings: Value) -> Catalogue {
        Catalogue {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Spring Collection".into(),
            description: Some("Fresh arrivals".into()),
            is_public: false,
            theme: "classic".into(),
            settings,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(catalogue_id: Uuid, sort_order: i32, display: PriceDisplay) -> Product {
        Product {
            id: Uuid::new_v4(),
            catalogue_id,
            category_id: None,
            name: format!("Product {sort_order}"),
            description: None,
            price: Decimal::new(1250, 2),
            price_display: display,
            image_urls: vec![format!("https://img.example.com/{sort_order}.jpg")],
            sort_order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn paginates_products_in_sort_order() {
        let cat = catalogue(json!({ "layout": { "products_per_page": 2 } }));
        let products: Vec<Product> = [4, 0, 3, 1, 2]
            .into_iter()
            .map(|pos| product(cat.id, pos, PriceDisplay::Show))
            .collect();
        let style = resolve_style(&cat.settings);

        let layout = build_layout(&cat, &[], &products, &style);

        // cover + intro + 3 product pages + back cover
        assert_eq!(layout.page_count, 6);
        let numbers: Vec<usize> = layout.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);

        let names: Vec<String> = layout
            .pages
            .iter()
            .filter_map(|p| match &p.content {
                PageContent::Products { items } => Some(items.clone()),
                _ => None,
            })
            .flatten()
            .map(|item| item.name)
            .collect();
        assert_eq!(
            names,
            vec!["Product 0", "Product 1", "Product 2", "Product 3", "Product 4"]
        );
    }

    #[test]
    fn optional_pages_can_be_disabled() {
        let cat = catalogue(json!({
            "layout": { "show_cover": false, "show_intro": false, "show_back_cover": false }
        }));
        let products = vec![product(cat.id, 0, PriceDisplay::Show)];
        let layout = build_layout(&cat, &[], &products, &resolve_style(&cat.settings));

        assert_eq!(layout.page_count, 1);
        assert!(matches!(layout.pages[0].content, PageContent::Products { .. }));
    }

    #[test]
    fn price_labels_follow_display_mode() {
        let id = Uuid::new_v4();
        assert_eq!(
            price_label(&product(id, 0, PriceDisplay::Show)).as_deref(),
            Some("12.50")
        );
        assert_eq!(price_label(&product(id, 0, PriceDisplay::Hide)), None);
        assert_eq!(
            price_label(&product(id, 0, PriceDisplay::Contact)).as_deref(),
            Some(PRICE_ON_REQUEST)
        );
    }

    #[test]
    fn items_carry_category_and_contact_blocks() {
        let cat = catalogue(json!({
            "contact": { "email": "sales@example.com" },
            "branding": { "logo_url": "https://img.example.com/logo.png" }
        }));
        let category = Category {
            id: Uuid::new_v4(),
            catalogue_id: cat.id,
            name: "Shoes".into(),
            description: None,
            color: Some("#ff8800".into()),
            created_at: Utc::now(),
        };
        let mut item = product(cat.id, 0, PriceDisplay::Show);
        item.category_id = Some(category.id);

        let layout = build_layout(&cat, &[category], &[item], &resolve_style(&cat.settings));

        match &layout.pages[0].content {
            PageContent::Cover { logo_url, .. } => {
                assert_eq!(logo_url.as_deref(), Some("https://img.example.com/logo.png"))
            }
            other => panic!("expected cover, got {other:?}"),
        }
        match &layout.pages[2].content {
            PageContent::Products { items } => {
                assert_eq!(items[0].category.as_deref(), Some("Shoes"));
                assert_eq!(items[0].category_color.as_deref(), Some("#ff8800"));
            }
            other => panic!("expected products, got {other:?}"),
        }
        match &layout.pages[3].content {
            PageContent::BackCover { contact } => {
                assert_eq!(contact["email"], "sales@example.com")
            }
            other => panic!("expected back cover, got {other:?}"),
        }
    }
}
