pub mod list_organizations_route;
pub mod org_reports_query;
pub mod org_reports_route;
