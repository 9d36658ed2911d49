use axum::routing::get;
use axum::Router;

use crate::web::context::AppState;

pub fn response_actions() -> Vec<Router<AppState>> {
    use action::*;
    vec![Router::new().route("/questionnaires/{id}/responses", get(list).post(submit))]
}

pub(crate) mod action {
    use axum::extract::rejection::JsonRejection;
    use axum::extract::{Path, Query, State};
    use axum::Json;

    use super::{request, responses};
    use crate::erx::Erx;
    use crate::model::types::{ResponseRecord, ResponseSubmission};
    use crate::web::api::{Out, OutResult};
    use crate::web::context::AppState;

    pub async fn submit(
        State(state): State<AppState>, Path(id): Path<String>, payload: Result<Json<ResponseSubmission>, JsonRejection>,
    ) -> OutResult<ResponseRecord> {
        let Json(submission) = payload?;
        Ok(Out::created(state.services.questionnaires.submit(&id, &submission).await?))
    }

    /// all responses newest first, or the one named by `?responseId=`
    pub async fn list(
        State(state): State<AppState>, Path(id): Path<String>, Query(query): Query<request::ResponseQuery>,
    ) -> OutResult<responses::Responses> {
        let questionnaires = &state.services.questionnaires;
        match query.response_id.filter(|r| !r.is_empty()) {
            Some(response_id) => {
                let response = questionnaires.response(&response_id).await?;
                if response.questionnaire_id != id {
                    return Err(Erx::not_found("Response not found").into());
                }
                Ok(Out::ok(responses::Responses::One(response)))
            },
            None => Ok(Out::ok(responses::Responses::Many(questionnaires.responses(&id).await?))),
        }
    }
}

pub(crate) mod request {
    #[derive(serde::Deserialize, Clone, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseQuery {
        pub response_id: Option<String>,
    }
}

pub(crate) mod responses {
    use crate::model::types::ResponseRecord;

    #[derive(serde::Serialize, Clone, Debug)]
    #[serde(untagged)]
    pub enum Responses {
        Many(Vec<ResponseRecord>),
        One(ResponseRecord),
    }
}
