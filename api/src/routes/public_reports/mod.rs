pub mod public_reports_query;
pub mod public_reports_response;
pub mod public_reports_route;
