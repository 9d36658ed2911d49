use chrono::{Duration, Utc};
use std::sync::Arc;

use questioneer::conf::{Backend, BackendKind};
use questioneer::model::memory::MemoryStore;
use questioneer::model::types::{
    AnswerInput, AnswerRecord, OptionDraft, QuestionDraft, QuestionType, QuestionnaireDraft, ResponseSubmission,
};
use questioneer::model::{open_store, SharedStore};

async fn stores() -> Vec<(&'static str, SharedStore)> {
    let backend = Backend { kind: BackendKind::Sqlite, connect: "sqlite::memory:".into(), migrate: true };
    vec![("memory", Arc::new(MemoryStore::new()) as SharedStore), ("sqlite", open_store(&backend).await.unwrap())]
}

fn options(texts: &[&str]) -> Vec<OptionDraft> {
    texts.iter().map(|t| OptionDraft { text: t.to_string() }).collect()
}

fn survey() -> QuestionnaireDraft {
    QuestionnaireDraft {
        name: "Lunch survey".into(),
        description: "What the office eats".into(),
        questions: vec![
            QuestionDraft {
                question_text: "Favourite dish?".into(),
                question_type: QuestionType::SingleChoice,
                options: options(&["Soup", "Salad"]),
                image: None,
            },
            QuestionDraft {
                question_text: "Which sides?".into(),
                question_type: QuestionType::MultipleChoice,
                options: options(&["Fries", "Rice", "Bread"]),
                image: Some("sides.png".into()),
            },
            QuestionDraft {
                question_text: "Show us your plate".into(),
                question_type: QuestionType::Image,
                options: vec![],
                image: None,
            },
        ],
    }
}

fn by_question(mut answers: Vec<AnswerRecord>) -> Vec<AnswerRecord> {
    answers.sort_by(|a, b| a.question_id.cmp(&b.question_id));
    answers
}

#[tokio::test]
async fn questionnaire_round_trip() {
    for (name, store) in stores().await {
        let created = store.create(&survey()).await.unwrap();
        assert_eq!(created.questions.len(), 3, "{}", name);
        assert_eq!(created.questions[1].options.len(), 3, "{}", name);
        assert_eq!(created.questions[1].image.as_deref(), Some("sides.png"), "{}", name);

        let fetched = store.detail(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created), "{}", name);
        assert_eq!(store.detail("missing").await.unwrap(), None, "{}", name);
    }
}

#[tokio::test]
async fn submitted_answers_come_back_unchanged() {
    for (name, store) in stores().await {
        let created = store.create(&survey()).await.unwrap();
        let dish = &created.questions[0];
        let sides = &created.questions[1];
        let plate = &created.questions[2];

        let start = Utc::now() - Duration::seconds(90);
        let submission = ResponseSubmission {
            start_time: start,
            end_time: start + Duration::seconds(75),
            completion_time: Some(75),
            answers: vec![
                AnswerInput { question_id: dish.id.clone(), single_option_id: Some(dish.options[1].id.clone()), ..Default::default() },
                AnswerInput {
                    question_id: sides.id.clone(),
                    selected_options: Some(vec![sides.options[2].id.clone(), sides.options[0].id.clone()]),
                    ..Default::default()
                },
                AnswerInput { question_id: plate.id.clone(), image_answer: Some("data:image/png;base64,iVBORw0".into()), ..Default::default() },
            ],
        };

        let record = store.submit(&created.id, &submission).await.unwrap().unwrap();
        let loaded = store.response(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id, "{}", name);
        assert_eq!(loaded.completion_time, Some(75), "{}", name);
        assert_eq!(loaded.start_time, record.start_time, "{}", name);
        assert_eq!(by_question(loaded.answers), by_question(record.answers.clone()), "{}", name);

        let selected = record.answers.iter().find(|a| a.question_id == sides.id).unwrap();
        assert_eq!(selected.selected_options, vec![sides.options[2].id.clone(), sides.options[0].id.clone()], "{}", name);

        let listed = store.responses(&created.id).await.unwrap();
        assert_eq!(listed.len(), 1, "{}", name);
        assert_eq!(store.detail(&created.id).await.unwrap().unwrap().response_count, 1, "{}", name);

        assert!(store.submit("missing", &submission).await.unwrap().is_none(), "{}", name);
    }
}

#[tokio::test]
async fn replace_recounts_questions_and_keeps_responses() {
    for (name, store) in stores().await {
        let created = store.create(&survey()).await.unwrap();
        let start = Utc::now() - Duration::seconds(30);
        let submission = ResponseSubmission { start_time: start, end_time: start + Duration::seconds(20), completion_time: Some(20), answers: vec![] };
        store.submit(&created.id, &submission).await.unwrap().unwrap();

        let mut draft = survey();
        draft.name = "Dinner survey".into();
        draft.questions.truncate(1);
        let replaced = store.replace(&created.id, &draft).await.unwrap().unwrap();
        assert_eq!(replaced.name, "Dinner survey", "{}", name);
        assert_eq!(replaced.questions.len(), 1, "{}", name);
        assert_eq!(replaced.questions[0].options.len(), 2, "{}", name);
        assert_ne!(replaced.questions[0].id, created.questions[0].id, "{}", name);

        let snapshot = store.snapshot().await.unwrap();
        let item = snapshot.questionnaires.iter().find(|q| q.id == created.id).unwrap();
        assert_eq!(item.question_count, 1, "{}", name);
        assert_eq!(item.response_count, 1, "{}", name);
        assert_eq!(snapshot.question_types, vec![QuestionType::SingleChoice], "{}", name);

        assert!(store.replace("missing", &draft).await.unwrap().is_none(), "{}", name);
    }
}

#[tokio::test]
async fn remove_cascades_to_responses() {
    for (name, store) in stores().await {
        let kept = store.create(&survey()).await.unwrap();
        let created = store.create(&survey()).await.unwrap();
        let start = Utc::now() - Duration::seconds(10);
        let submission = ResponseSubmission { start_time: start, end_time: start, completion_time: None, answers: vec![] };
        let record = store.submit(&created.id, &submission).await.unwrap().unwrap();

        assert!(store.remove(&created.id).await.unwrap(), "{}", name);
        assert!(!store.remove(&created.id).await.unwrap(), "{}", name);
        assert_eq!(store.response(&record.id).await.unwrap(), None, "{}", name);
        assert!(store.responses(&created.id).await.unwrap().is_empty(), "{}", name);

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.questionnaires.len(), 1, "{}", name);
        assert_eq!(snapshot.questionnaires[0].id, kept.id, "{}", name);
        assert!(snapshot.responses.is_empty(), "{}", name);
        assert_eq!(snapshot.question_types.len(), 3, "{}", name);
    }
}
