//! Shared application state for all routes.

use crate::connector::Connector;
use crate::models::{Order, Topping};
use crate::repository::Repository;
use crate::services::CustomerService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub toppings: Repository<Topping>,
    pub orders: Repository<Order>,
    pub customers: Arc<dyn CustomerService>,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connector>, customers: Arc<dyn CustomerService>) -> Self {
        AppState {
            toppings: Repository::new(Arc::clone(&connector)),
            orders: Repository::new(connector),
            customers,
        }
    }
}
