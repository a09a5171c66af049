pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::subscription_routes;
pub use services::aggregator::SubscriptionAggregator;
