use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::erx::{Erx, ResultE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Text,
    SingleChoice,
    MultipleChoice,
    Image,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [QuestionType::Text, QuestionType::SingleChoice, QuestionType::MultipleChoice, QuestionType::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "TEXT",
            QuestionType::SingleChoice => "SINGLE_CHOICE",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::Image => "IMAGE",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = Erx;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL.into_iter().find(|t| t.as_str() == s).ok_or_else(|| Erx::store(&format!("unknown question type '{}'", s)))
    }
}

/// questionnaire row as shown in the listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub question_count: i64,
    pub response_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDetail {
    pub id: String,
    pub text: String,
    pub order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub order: i32,
    pub image: Option<String>,
    pub options: Vec<OptionDetail>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub response_count: i64,
    pub questions: Vec<QuestionDetail>,
}

impl QuestionnaireDetail {
    /// build a fresh questionnaire from a draft, ids are UUIDv7
    pub fn from_draft(draft: &QuestionnaireDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at: now,
            updated_at: now,
            response_count: 0,
            questions: questions_from_draft(draft),
        }
    }

    pub fn listing_item(&self) -> ListingItem {
        ListingItem {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            question_count: self.questions.len() as i64,
            response_count: self.response_count,
        }
    }

    pub fn question(&self, id: &str) -> Option<&QuestionDetail> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Questions of a draft with fresh ids and positions renumbered from 0.
/// Only choice questions keep options.
pub fn questions_from_draft(draft: &QuestionnaireDraft) -> Vec<QuestionDetail> {
    draft
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| QuestionDetail {
            id: new_id(),
            question_text: q.question_text.clone(),
            question_type: q.question_type,
            order: index as i32,
            image: q.image.clone().filter(|i| !i.is_empty()),
            options: if q.question_type.is_choice() {
                q.options.iter().enumerate().map(|(i, o)| OptionDetail { id: new_id(), text: o.text.clone(), order: i as i32 }).collect()
            } else {
                vec![]
            },
        })
        .collect()
}

pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: String,
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_option_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_answer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    pub questionnaire_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub completion_time: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<AnswerRecord>,
}

impl ResponseRecord {
    pub fn from_submission(questionnaire_id: &str, submission: &ResponseSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            questionnaire_id: questionnaire_id.to_string(),
            start_time: submission.start_time,
            end_time: submission.end_time,
            completion_time: submission.completion_time,
            created_at: now,
            answers: submission.answers.iter().map(AnswerInput::record).collect(),
        }
    }

    pub fn header(&self) -> ResponseHeader {
        ResponseHeader {
            id: self.id.clone(),
            questionnaire_id: self.questionnaire_id.clone(),
            completion_time: self.completion_time,
            created_at: self.created_at,
        }
    }
}

/// response without answers, used by the global overview
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    pub id: String,
    pub questionnaire_id: String,
    pub completion_time: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// fully materialised store content for the global overview
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub questionnaires: Vec<ListingItem>,
    pub question_types: Vec<QuestionType>,
    pub responses: Vec<ResponseHeader>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OptionDraft {
    #[validate(length(min = 1, message = "Option text is required"))]
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[validate(length(min = 3, message = "Question text must be at least 3 characters"))]
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionDraft>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDraft {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "At least one question is required"), nested)]
    pub questions: Vec<QuestionDraft>,
}

impl QuestionnaireDraft {
    /// field rules plus "choice questions need at least 2 options"
    pub fn check(&self) -> ResultE<()> {
        self.validate()?;

        let lacking: Vec<String> = self
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.question_type.is_choice() && q.options.len() < 2)
            .map(|(i, _)| format!("questions[{}].options: Choice questions must have at least 2 options", i))
            .collect();

        if !lacking.is_empty() {
            return Err(Erx::validation(&lacking.join("; ")));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: String,
    pub text_answer: Option<String>,
    pub single_option_id: Option<String>,
    pub selected_options: Option<Vec<String>>,
    pub image_answer: Option<String>,
}

impl AnswerInput {
    /// keep only the first answer kind present: text, single option, selected options, image
    pub fn record(&self) -> AnswerRecord {
        let mut record = AnswerRecord { id: new_id(), question_id: self.question_id.clone(), ..Default::default() };
        if let Some(text) = &self.text_answer {
            record.text_answer = Some(text.clone());
        } else if let Some(option) = &self.single_option_id {
            record.single_option_id = Some(option.clone());
        } else if let Some(selected) = &self.selected_options {
            record.selected_options = selected.clone();
        } else if let Some(image) = &self.image_answer {
            record.image_answer = Some(image.clone());
        }
        record
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub completion_time: Option<i64>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionType, options: &[&str]) -> QuestionDraft {
        QuestionDraft {
            question_text: "How are you?".into(),
            question_type: kind,
            options: options.iter().map(|t| OptionDraft { text: t.to_string() }).collect(),
            image: None,
        }
    }

    fn draft(questions: Vec<QuestionDraft>) -> QuestionnaireDraft {
        QuestionnaireDraft { name: "Survey".into(), description: "A long enough description".into(), questions }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft(vec![question(QuestionType::Text, &[]), question(QuestionType::SingleChoice, &["a", "b"])]).check().is_ok());
    }

    #[test]
    fn short_name_and_no_questions_are_rejected() {
        let mut d = draft(vec![]);
        d.name = "ab".into();
        let err = d.check().unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("name"));
        assert!(err.message().contains("questions"));
    }

    #[test]
    fn choice_question_needs_two_options() {
        let err = draft(vec![question(QuestionType::MultipleChoice, &["only"])]).check().unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("at least 2 options"));
    }

    #[test]
    fn empty_option_text_is_rejected() {
        let err = draft(vec![question(QuestionType::SingleChoice, &["a", ""])]).check().unwrap_err();
        assert!(err.message().contains("Option text is required"), "{}", err.message());
    }

    #[test]
    fn non_choice_questions_drop_options() {
        let d = draft(vec![question(QuestionType::Text, &["ignored", "too"]), question(QuestionType::SingleChoice, &["a", "b"])]);
        let questions = questions_from_draft(&d);
        assert!(questions[0].options.is_empty());
        assert_eq!(questions[1].options.iter().map(|o| o.order).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(questions[1].order, 1);
    }

    #[test]
    fn answer_keeps_first_kind() {
        let input = AnswerInput {
            question_id: "q".into(),
            text_answer: None,
            single_option_id: Some("o1".into()),
            selected_options: Some(vec!["o2".into()]),
            image_answer: None,
        };
        let record = input.record();
        assert_eq!(record.single_option_id.as_deref(), Some("o1"));
        assert!(record.selected_options.is_empty());
    }

    #[test]
    fn question_type_wire_names() {
        assert_eq!(serde_json::to_string(&QuestionType::MultipleChoice).unwrap(), "\"MULTIPLE_CHOICE\"");
        assert_eq!("IMAGE".parse::<QuestionType>().unwrap(), QuestionType::Image);
    }
}
