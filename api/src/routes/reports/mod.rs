pub mod report_status_route;
pub mod submit_report_request;
pub mod submit_report_route;
pub mod update_status_request;
pub mod update_status_route;
