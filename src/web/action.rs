use axum::Router;

use crate::web::action::questionnaires::questionnaire_actions;
use crate::web::action::responses::response_actions;
use crate::web::action::statistics::statistics_actions;
use crate::web::context::AppState;
use crate::web_route_merge;

pub mod questionnaires;
pub mod responses;
pub mod statistics;

pub fn all_actions() -> Vec<Router<AppState>> {
    web_route_merge!(questionnaire_actions(), response_actions(), statistics_actions())
}
