pub mod analytics_route;
pub mod insights_request;
pub mod insights_route;
