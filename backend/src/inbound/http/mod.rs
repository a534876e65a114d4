//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod assignments;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod timetable;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register extractor error handlers and every `/api/v1` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::me)
                .service(catalog::list_subjects)
                .service(catalog::create_subject)
                .service(catalog::list_staff)
                .service(catalog::create_staff)
                .service(catalog::list_venues)
                .service(catalog::create_venue)
                .service(timetable::create_slot)
                .service(timetable::get_slot)
                .service(timetable::slots_for_day)
                .service(timetable::slots_in_range)
                .service(timetable::export_calendar)
                .service(assignments::list_assignments)
                .service(assignments::create_assignment)
                .service(assignments::get_assignment)
                .service(assignments::update_assignment)
                .service(assignments::update_status)
                .service(assignments::delete_assignment),
        );
}
