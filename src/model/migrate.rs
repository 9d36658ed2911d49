use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(Migration)]
    }
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000001_questioneer_schema"
    }
}

fn define_questionnaire_table() -> TableCreateStatement {
    Table::create()
        .table(Questionnaire::Table)
        .if_not_exists()
        .col(ColumnDef::new(Questionnaire::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Questionnaire::Name).string().not_null())
        .col(ColumnDef::new(Questionnaire::Description).text().not_null())
        .col(ColumnDef::new(Questionnaire::QuestionCount).big_integer().not_null().default(0))
        .col(ColumnDef::new(Questionnaire::ResponseCount).big_integer().not_null().default(0))
        .col(ColumnDef::new(Questionnaire::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Questionnaire::UpdatedAt).timestamp_with_time_zone().not_null())
        .to_owned()
}

fn define_question_table() -> TableCreateStatement {
    Table::create()
        .table(Question::Table)
        .if_not_exists()
        .col(ColumnDef::new(Question::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Question::QuestionnaireId).string().not_null())
        .col(ColumnDef::new(Question::QuestionText).text().not_null())
        .col(ColumnDef::new(Question::QuestionType).string().not_null())
        .col(ColumnDef::new(Question::Position).integer().not_null())
        .col(ColumnDef::new(Question::Image).string().null())
        .to_owned()
}

fn define_option_table() -> TableCreateStatement {
    Table::create()
        .table(QuestionOption::Table)
        .if_not_exists()
        .col(ColumnDef::new(QuestionOption::Id).string().not_null().primary_key())
        .col(ColumnDef::new(QuestionOption::QuestionId).string().not_null())
        .col(ColumnDef::new(QuestionOption::Text).string().not_null())
        .col(ColumnDef::new(QuestionOption::Position).integer().not_null())
        .to_owned()
}

fn define_response_table() -> TableCreateStatement {
    Table::create()
        .table(Response::Table)
        .if_not_exists()
        .col(ColumnDef::new(Response::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Response::QuestionnaireId).string().not_null())
        .col(ColumnDef::new(Response::StartTime).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Response::EndTime).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Response::CompletionTime).big_integer().null())
        .col(ColumnDef::new(Response::CreatedAt).timestamp_with_time_zone().not_null())
        .to_owned()
}

fn define_answer_table() -> TableCreateStatement {
    Table::create()
        .table(Answer::Table)
        .if_not_exists()
        .col(ColumnDef::new(Answer::Id).string().not_null().primary_key())
        .col(ColumnDef::new(Answer::ResponseId).string().not_null())
        .col(ColumnDef::new(Answer::QuestionId).string().not_null())
        .col(ColumnDef::new(Answer::TextAnswer).text().null())
        .col(ColumnDef::new(Answer::SingleOptionId).string().null())
        .col(ColumnDef::new(Answer::SelectedOptions).json().not_null())
        .col(ColumnDef::new(Answer::ImageAnswer).string().null())
        .to_owned()
}

/// keyset indexes, one per listing sort, each ending with the id tie-break
fn define_listing_indexes() -> Vec<IndexCreateStatement> {
    let sorts = [
        ("idx_questionnaire_created_at_id", Questionnaire::CreatedAt),
        ("idx_questionnaire_name_id", Questionnaire::Name),
        ("idx_questionnaire_question_count_id", Questionnaire::QuestionCount),
        ("idx_questionnaire_response_count_id", Questionnaire::ResponseCount),
    ];

    let mut indexes: Vec<IndexCreateStatement> = sorts
        .into_iter()
        .map(|(name, column)| Index::create().if_not_exists().name(name).table(Questionnaire::Table).col(column).col(Questionnaire::Id).to_owned())
        .collect();

    indexes.push(Index::create().if_not_exists().name("idx_question_questionnaire_id").table(Question::Table).col(Question::QuestionnaireId).to_owned());
    indexes.push(Index::create().if_not_exists().name("idx_question_option_question_id").table(QuestionOption::Table).col(QuestionOption::QuestionId).to_owned());
    indexes.push(Index::create().if_not_exists().name("idx_response_questionnaire_id").table(Response::Table).col(Response::QuestionnaireId).to_owned());
    indexes.push(Index::create().if_not_exists().name("idx_answer_response_id").table(Answer::Table).col(Answer::ResponseId).to_owned());
    indexes
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [define_questionnaire_table(), define_question_table(), define_option_table(), define_response_table(), define_answer_table()] {
            if let Err(e) = manager.create_table(table).await {
                tracing::error!("{:#?}", e);
                return Err(e);
            }
        }

        for index in define_listing_indexes() {
            manager.create_index(index).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Answer::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Response::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(QuestionOption::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Question::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Questionnaire::Table).to_owned()).await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum Questionnaire {
    Table,
    Id,
    Name,
    Description,
    QuestionCount,
    ResponseCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Question {
    Table,
    Id,
    QuestionnaireId,
    QuestionText,
    QuestionType,
    Position,
    Image,
}

#[derive(Iden)]
pub enum QuestionOption {
    Table,
    Id,
    QuestionId,
    Text,
    Position,
}

#[derive(Iden)]
pub enum Response {
    Table,
    Id,
    QuestionnaireId,
    StartTime,
    EndTime,
    CompletionTime,
    CreatedAt,
}

#[derive(Iden)]
pub enum Answer {
    Table,
    Id,
    ResponseId,
    QuestionId,
    TextAnswer,
    SingleOptionId,
    SelectedOptions,
    ImageAnswer,
}
