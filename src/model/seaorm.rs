use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use std::collections::HashMap;

use crate::erx::{self, Erx, ResultE};
use crate::model::entity::{answer, question, question_option, questionnaire, response};
use crate::model::results::{Many, One};
use crate::model::store::{Boundary, SortKey, Store};
use crate::model::types::{
    questions_from_draft, AnswerRecord, ListingItem, OptionDetail, QuestionDetail, QuestionType, QuestionnaireDetail, QuestionnaireDraft,
    ResponseHeader, ResponseRecord, ResponseSubmission, Snapshot,
};
use crate::web::messages::pagination::{Sort, SortBy, SortOrder};

/// sea-orm backed store for Postgres and SQLite
#[derive(Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn sort_column(by: SortBy) -> questionnaire::Column {
    match by {
        SortBy::CreatedAt => questionnaire::Column::CreatedAt,
        SortBy::Name => questionnaire::Column::Name,
        SortBy::QuestionCount => questionnaire::Column::QuestionCount,
        SortBy::ResponseCount => questionnaire::Column::ResponseCount,
    }
}

fn sort_value(key: &SortKey) -> sea_orm::Value {
    match key {
        SortKey::CreatedAt(at) => (*at).into(),
        SortKey::Name(name) => name.clone().into(),
        SortKey::Count(n) => (*n).into(),
    }
}

fn order_of(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

/// `primary past boundary OR (primary = boundary AND id > boundary id)`
fn after_condition(sort: Sort, boundary: &Boundary) -> ResultE<Condition> {
    if !boundary.key.fits(sort.by) {
        return Err(Erx::validation("cursor does not match the requested sort"));
    }

    let column = sort_column(sort.by);
    let value = sort_value(&boundary.key);
    let past = match sort.order {
        SortOrder::Asc => column.gt(value.clone()),
        SortOrder::Desc => column.lt(value.clone()),
    };

    Ok(Condition::any()
        .add(past)
        .add(Condition::all().add(column.eq(value)).add(questionnaire::Column::Id.gt(boundary.id.clone()))))
}

fn listing_item(model: questionnaire::Model) -> ListingItem {
    ListingItem {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
        question_count: model.question_count,
        response_count: model.response_count,
    }
}

async fn load_questions<C: ConnectionTrait>(db: &C, questionnaire_id: &str) -> Many<QuestionDetail> {
    let questions = question::Entity::find()
        .filter(question::Column::QuestionnaireId.eq(questionnaire_id))
        .order_by(question::Column::Position, Order::Asc)
        .order_by(question::Column::Id, Order::Asc)
        .all(db)
        .await?;

    let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
    let mut options: HashMap<String, Vec<OptionDetail>> = HashMap::new();
    if !ids.is_empty() {
        let rows = question_option::Entity::find()
            .filter(question_option::Column::QuestionId.is_in(ids))
            .order_by(question_option::Column::Position, Order::Asc)
            .order_by(question_option::Column::Id, Order::Asc)
            .all(db)
            .await?;
        for row in rows {
            options.entry(row.question_id.clone()).or_default().push(OptionDetail { id: row.id, text: row.text, order: row.position });
        }
    }

    questions
        .into_iter()
        .map(|q| {
            Ok(QuestionDetail {
                question_type: q.question_type.parse::<QuestionType>()?,
                options: options.remove(&q.id).unwrap_or_default(),
                id: q.id,
                question_text: q.question_text,
                order: q.position,
                image: q.image,
            })
        })
        .collect()
}

async fn load_detail<C: ConnectionTrait>(db: &C, id: &str) -> One<QuestionnaireDetail> {
    let Some(model) = questionnaire::Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };

    let questions = load_questions(db, id).await?;
    Ok(Some(QuestionnaireDetail {
        id: model.id,
        name: model.name,
        description: model.description,
        created_at: model.created_at,
        updated_at: model.updated_at,
        response_count: model.response_count,
        questions,
    }))
}

async fn insert_questions<C: ConnectionTrait>(db: &C, questionnaire_id: &str, questions: &[QuestionDetail]) -> ResultE<()> {
    for q in questions {
        insert_row(
            db,
            question::ActiveModel {
                id: Set(q.id.clone()),
                questionnaire_id: Set(questionnaire_id.to_string()),
                question_text: Set(q.question_text.clone()),
                question_type: Set(q.question_type.as_str().to_string()),
                position: Set(q.order),
                image: Set(q.image.clone()),
            },
        )
        .await?;

        for o in &q.options {
            insert_row(
                db,
                question_option::ActiveModel {
                    id: Set(o.id.clone()),
                    question_id: Set(q.id.clone()),
                    text: Set(o.text.clone()),
                    position: Set(o.order),
                },
            )
            .await?;
        }
    }
    Ok(())
}

async fn delete_questions<C: ConnectionTrait>(db: &C, questionnaire_id: &str) -> ResultE<()> {
    let ids: Vec<String> = question::Entity::find()
        .filter(question::Column::QuestionnaireId.eq(questionnaire_id))
        .all(db)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();

    if !ids.is_empty() {
        question_option::Entity::delete_many().filter(question_option::Column::QuestionId.is_in(ids)).exec(db).await?;
    }
    question::Entity::delete_many().filter(question::Column::QuestionnaireId.eq(questionnaire_id)).exec(db).await?;
    Ok(())
}

async fn insert_questionnaire<C: ConnectionTrait>(db: &C, detail: &QuestionnaireDetail) -> ResultE<()> {
    insert_row(
        db,
        questionnaire::ActiveModel {
            id: Set(detail.id.clone()),
            name: Set(detail.name.clone()),
            description: Set(detail.description.clone()),
            question_count: Set(detail.questions.len() as i64),
            response_count: Set(detail.response_count),
            created_at: Set(detail.created_at),
            updated_at: Set(detail.updated_at),
        },
    )
    .await?;

    insert_questions(db, &detail.id, &detail.questions).await
}

async fn attach_answers<C: ConnectionTrait>(db: &C, responses: Vec<response::Model>) -> Many<ResponseRecord> {
    let ids: Vec<String> = responses.iter().map(|r| r.id.clone()).collect();
    let mut answers: HashMap<String, Vec<AnswerRecord>> = HashMap::new();
    if !ids.is_empty() {
        let rows = answer::Entity::find().filter(answer::Column::ResponseId.is_in(ids)).order_by(answer::Column::Id, Order::Asc).all(db).await?;
        for row in rows {
            let selected_options: Vec<String> = serde_json::from_value(row.selected_options).map_err(erx::amp("selected options"))?;
            answers.entry(row.response_id.clone()).or_default().push(AnswerRecord {
                id: row.id,
                question_id: row.question_id,
                text_answer: row.text_answer,
                single_option_id: row.single_option_id,
                selected_options,
                image_answer: row.image_answer,
            });
        }
    }

    Ok(responses
        .into_iter()
        .map(|r| ResponseRecord {
            answers: answers.remove(&r.id).unwrap_or_default(),
            id: r.id,
            questionnaire_id: r.questionnaire_id,
            start_time: r.start_time,
            end_time: r.end_time,
            completion_time: r.completion_time,
            created_at: r.created_at,
        })
        .collect())
}

/// insert without reading the row back, ids are always assigned client side
async fn insert_row<A, C>(db: &C, model: A) -> ResultE<()>
where
    A: ActiveModelTrait + Send,
    C: ConnectionTrait,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    <A::Entity as EntityTrait>::insert(model).exec_without_returning(db).await?;
    Ok(())
}

#[async_trait]
impl Store for SeaStore {
    async fn find_page(&self, sort: Sort, after: Option<&Boundary>, take: u64) -> Many<ListingItem> {
        let mut select = questionnaire::Entity::find();
        if let Some(boundary) = after {
            select = select.filter(after_condition(sort, boundary)?);
        }

        let rows = select
            .order_by(sort_column(sort.by), order_of(sort.order))
            .order_by(questionnaire::Column::Id, Order::Asc)
            .limit(take)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(listing_item).collect())
    }

    async fn boundary_of(&self, id: &str, sort: Sort) -> One<Boundary> {
        let row = questionnaire::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(row.map(|model| Boundary::of(&listing_item(model), sort.by)))
    }

    async fn create(&self, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail> {
        let detail = QuestionnaireDetail::from_draft(draft, Utc::now());
        let txn = self.db.begin().await?;
        insert_questionnaire(&txn, &detail).await?;
        txn.commit().await?;
        Ok(detail)
    }

    async fn detail(&self, id: &str) -> One<QuestionnaireDetail> {
        load_detail(&self.db, id).await
    }

    async fn replace(&self, id: &str, draft: &QuestionnaireDraft) -> One<QuestionnaireDetail> {
        let txn = self.db.begin().await?;
        if questionnaire::Entity::find_by_id(id.to_string()).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let questions = questions_from_draft(draft);
        questionnaire::Entity::update_many()
            .col_expr(questionnaire::Column::Name, Expr::value(draft.name.clone()))
            .col_expr(questionnaire::Column::Description, Expr::value(draft.description.clone()))
            .col_expr(questionnaire::Column::QuestionCount, Expr::value(questions.len() as i64))
            .col_expr(questionnaire::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(questionnaire::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        delete_questions(&txn, id).await?;
        insert_questions(&txn, id, &questions).await?;

        let detail = load_detail(&txn, id).await?;
        txn.commit().await?;
        Ok(detail)
    }

    async fn remove(&self, id: &str) -> ResultE<bool> {
        let txn = self.db.begin().await?;
        if questionnaire::Entity::find_by_id(id.to_string()).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let response_ids: Vec<String> = response::Entity::find()
            .filter(response::Column::QuestionnaireId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if !response_ids.is_empty() {
            answer::Entity::delete_many().filter(answer::Column::ResponseId.is_in(response_ids)).exec(&txn).await?;
        }
        response::Entity::delete_many().filter(response::Column::QuestionnaireId.eq(id)).exec(&txn).await?;
        delete_questions(&txn, id).await?;
        questionnaire::Entity::delete_by_id(id.to_string()).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn submit(&self, questionnaire_id: &str, submission: &ResponseSubmission) -> One<ResponseRecord> {
        let txn = self.db.begin().await?;
        if questionnaire::Entity::find_by_id(questionnaire_id.to_string()).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let record = ResponseRecord::from_submission(questionnaire_id, submission, Utc::now());
        insert_row(
            &txn,
            response::ActiveModel {
                id: Set(record.id.clone()),
                questionnaire_id: Set(record.questionnaire_id.clone()),
                start_time: Set(record.start_time),
                end_time: Set(record.end_time),
                completion_time: Set(record.completion_time),
                created_at: Set(record.created_at),
            },
        )
        .await?;

        for a in &record.answers {
            insert_row(
                &txn,
                answer::ActiveModel {
                    id: Set(a.id.clone()),
                    response_id: Set(record.id.clone()),
                    question_id: Set(a.question_id.clone()),
                    text_answer: Set(a.text_answer.clone()),
                    single_option_id: Set(a.single_option_id.clone()),
                    selected_options: Set(serde_json::json!(a.selected_options)),
                    image_answer: Set(a.image_answer.clone()),
                },
            )
            .await?;
        }

        questionnaire::Entity::update_many()
            .col_expr(questionnaire::Column::ResponseCount, Expr::col(questionnaire::Column::ResponseCount).add(1))
            .filter(questionnaire::Column::Id.eq(questionnaire_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(record))
    }

    async fn responses(&self, questionnaire_id: &str) -> Many<ResponseRecord> {
        let rows = response::Entity::find()
            .filter(response::Column::QuestionnaireId.eq(questionnaire_id))
            .order_by(response::Column::CreatedAt, Order::Desc)
            .order_by(response::Column::Id, Order::Asc)
            .all(&self.db)
            .await?;
        attach_answers(&self.db, rows).await
    }

    async fn response(&self, response_id: &str) -> One<ResponseRecord> {
        let Some(row) = response::Entity::find_by_id(response_id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(attach_answers(&self.db, vec![row]).await?.pop())
    }

    async fn snapshot(&self) -> ResultE<Snapshot> {
        let questionnaires = questionnaire::Entity::find().all(&self.db).await?.into_iter().map(listing_item).collect();

        let question_types = question::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|q| q.question_type.parse::<QuestionType>())
            .collect::<ResultE<Vec<_>>>()?;

        let responses = response::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| ResponseHeader { id: r.id, questionnaire_id: r.questionnaire_id, completion_time: r.completion_time, created_at: r.created_at })
            .collect();

        Ok(Snapshot { questionnaires, question_types, responses })
    }

    async fn import(&self, detail: QuestionnaireDetail) -> ResultE<()> {
        let txn = self.db.begin().await?;
        insert_questionnaire(&txn, &detail).await?;
        txn.commit().await?;
        Ok(())
    }
}
