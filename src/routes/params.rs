use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

fn normalize(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1).saturating_mul(per_page);
    (page, per_page, offset)
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogueSortBy {
    CreatedAt,
    UpdatedAt,
    Name,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogueQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive name filter.
    pub q: Option<String>,
    pub sort_by: Option<CatalogueSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl CatalogueQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        normalize(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminUserQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive email filter.
    pub q: Option<String>,
}

impl AdminUserQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        normalize(self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(AdminUserQuery::default().normalize(), (1, 20, 0));
        let q = AdminUserQuery {
            page: Some(3),
            per_page: Some(500),
            q: None,
        };
        assert_eq!(q.normalize(), (3, 100, 200));
        let q = AdminUserQuery {
            page: Some(-4),
            per_page: Some(0),
            q: None,
        };
        assert_eq!(q.normalize(), (1, 1, 0));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let q = CatalogueQuery {
            page: Some(i64::MAX),
            per_page: Some(2),
            ..Default::default()
        };
        let (page, per_page, offset) = q.normalize();
        assert_eq!((page, per_page), (i64::MAX, 2));
        assert_eq!(offset, i64::MAX);
    }
}
