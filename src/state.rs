use std::sync::Arc;

use crate::{
    billing::BillingGateway,
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub billing: BillingGateway,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let billing = BillingGateway::from_config(config.stripe.as_ref());
        Self {
            orm: orm_from_pool(&pool),
            pool,
            config: Arc::new(config),
            billing,
        }
    }
}
