//! Service proxies for remote microservices.

mod customer;

pub use customer::{CustomerService, RestCustomerService};
