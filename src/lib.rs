//! Pizza-ordering REST backend: entity models, a connector-backed repository,
//! a remote customer-service proxy, and the HTTP surface tying them together.

pub mod config;
pub mod connector;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod sql;
pub mod state;
pub mod validation;

pub use config::{datasource_by_name, load_datasources, ConnectorKind, DatasourceConfig};
pub use connector::{connect, Connector, MemoryConnector, PostgresConnector};
pub use error::{AppError, ConfigError};
pub use filter::{Filter, Where};
pub use models::{Customer, Model, Order, OrderItem, Topping};
pub use repository::Repository;
pub use routes::{common_routes, entity_routes};
pub use services::{CustomerService, RestCustomerService};
pub use state::AppState;
pub use validation::RequestValidator;
