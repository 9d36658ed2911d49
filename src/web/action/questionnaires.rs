use axum::routing::get;
use axum::Router;

use crate::web::context::AppState;

pub fn questionnaire_actions() -> Vec<Router<AppState>> {
    use action::*;
    vec![Router::new()
        .route("/questionnaires", get(list).post(create))
        .route("/questionnaires/{id}", get(detail).put(replace).delete(remove))]
}

pub(crate) mod action {
    use axum::extract::rejection::{JsonRejection, QueryRejection};
    use axum::extract::{Path, Query, State};
    use axum::Json;
    use tracing::debug;

    use crate::model::types::{ListingItem, QuestionnaireDetail, QuestionnaireDraft};
    use crate::web::api::{Out, OutResult, Success};
    use crate::web::context::AppState;
    use crate::web::messages::pagination::{ListingPage, PageQuery};

    /// `GET /questionnaires?cursor=&limit=&sortBy=&sortOrder=`
    pub async fn list(State(state): State<AppState>, query: Result<Query<PageQuery>, QueryRejection>) -> OutResult<ListingPage<ListingItem>> {
        let Query(query) = query?;
        let request = query.into_request(state.default_limit)?;
        debug!("listing request {:?}", request);
        Ok(Out::ok(state.services.listing.listing(&request).await?))
    }

    pub async fn create(State(state): State<AppState>, payload: Result<Json<QuestionnaireDraft>, JsonRejection>) -> OutResult<QuestionnaireDetail> {
        let Json(draft) = payload?;
        Ok(Out::created(state.services.questionnaires.create(&draft).await?))
    }

    pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> OutResult<QuestionnaireDetail> {
        Ok(Out::ok(state.services.questionnaires.get(&id).await?))
    }

    pub async fn replace(
        State(state): State<AppState>, Path(id): Path<String>, payload: Result<Json<QuestionnaireDraft>, JsonRejection>,
    ) -> OutResult<QuestionnaireDetail> {
        let Json(draft) = payload?;
        Ok(Out::ok(state.services.questionnaires.replace(&id, &draft).await?))
    }

    pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> OutResult<Success> {
        state.services.questionnaires.delete(&id).await?;
        Ok(Out::success())
    }
}
