use axum::routing::get;
use axum::Router;

use crate::web::context::AppState;

pub fn statistics_actions() -> Vec<Router<AppState>> {
    use action::*;
    vec![Router::new().route("/questionnaires/{id}/stats", get(questionnaire)).route("/statistics", get(overview))]
}

pub(crate) mod action {
    use axum::extract::{Path, State};
    use chrono::Utc;

    use crate::service::statistics::{Overview, QuestionnaireStats};
    use crate::web::api::{Out, OutResult};
    use crate::web::context::AppState;

    pub async fn questionnaire(State(state): State<AppState>, Path(id): Path<String>) -> OutResult<QuestionnaireStats> {
        Ok(Out::ok(state.services.statistics.questionnaire(&id, Utc::now()).await?))
    }

    pub async fn overview(State(state): State<AppState>) -> OutResult<Overview> {
        Ok(Out::ok(state.services.statistics.overview(Utc::now()).await?))
    }
}
