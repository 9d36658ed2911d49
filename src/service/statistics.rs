use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::erx::{Erx, ResultE};
use crate::model::types::{AnswerRecord, QuestionDetail, QuestionType, QuestionnaireDetail, ResponseRecord, Snapshot};
use crate::model::SharedStore;

const DAILY_BUCKETS: i64 = 30;
const WEEKLY_BUCKETS: i64 = 12;
const MONTHLY_BUCKETS: u32 = 6;
const TEXT_TOP: usize = 10;
const TOP_QUESTIONNAIRES: usize = 5;
const LATEST_RESPONSES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateCount {
    pub date: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCount {
    pub week: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub label: String,
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub answer_distribution: Vec<Distribution>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireStats {
    pub total_responses: i64,
    pub average_completion_time: f64,
    pub daily_completions: Vec<DateCount>,
    pub weekly_completions: Vec<WeekCount>,
    pub monthly_completions: Vec<MonthCount>,
    pub question_stats: Vec<QuestionStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopQuestionnaire {
    pub id: String,
    pub name: String,
    pub response_count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestResponse {
    pub id: String,
    pub questionnaire_id: String,
    pub questionnaire_name: String,
    pub completion_time: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_questionnaires: i64,
    pub total_responses: i64,
    pub total_questions: i64,
    pub average_completion_time: f64,
    pub top_questionnaires: Vec<TopQuestionnaire>,
    pub question_type_distribution: Vec<TypeCount>,
    pub daily_activity: Vec<DateCount>,
    pub latest_responses: Vec<LatestResponse>,
}

/// mean over the values present, 0 when there are none
fn average(values: impl Iterator<Item = Option<i64>>) -> f64 {
    let (sum, n) = values.flatten().fold((0i64, 0i64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

fn per_day<'a>(dates: impl Iterator<Item = &'a DateTime<Utc>>) -> HashMap<NaiveDate, i64> {
    let mut days = HashMap::new();
    for at in dates {
        *days.entry(at.date_naive()).or_insert(0) += 1;
    }
    days
}

fn daily(days: &HashMap<NaiveDate, i64>, today: NaiveDate) -> Vec<DateCount> {
    (0..DAILY_BUCKETS)
        .map(|i| today - Duration::days(i))
        .map(|day| DateCount { date: day_key(day), count: days.get(&day).copied().unwrap_or(0) })
        .collect()
}

fn weekly(days: &HashMap<NaiveDate, i64>, today: NaiveDate) -> Vec<WeekCount> {
    (0..WEEKLY_BUCKETS)
        .map(|i| week_start(today - Duration::days(7 * i)))
        .map(|start| {
            let end = start + Duration::days(7);
            let count = days.iter().filter(|(day, _)| **day >= start && **day < end).map(|(_, n)| n).sum();
            WeekCount { week: day_key(start), count }
        })
        .collect()
}

fn monthly(days: &HashMap<NaiveDate, i64>, today: NaiveDate) -> Vec<MonthCount> {
    let Some(this_month) = today.with_day(1) else {
        return vec![];
    };

    (0..MONTHLY_BUCKETS)
        .filter_map(|i| this_month.checked_sub_months(Months::new(i)))
        .map(|start| {
            let count = days.iter().filter(|(day, _)| day.year() == start.year() && day.month() == start.month()).map(|(_, n)| n).sum();
            MonthCount { month: start.format("%Y-%m").to_string(), count }
        })
        .collect()
}

fn distribution(label: &str, value: i64) -> Distribution {
    Distribution { label: label.to_string(), value }
}

fn question_stats(question: &QuestionDetail, answers: &[&AnswerRecord], total_responses: i64) -> QuestionStats {
    let answer_distribution = match question.question_type {
        QuestionType::SingleChoice => question
            .options
            .iter()
            .map(|option| {
                let count = answers.iter().filter(|a| a.single_option_id.as_deref() == Some(option.id.as_str())).count();
                distribution(&option.text, count as i64)
            })
            .collect(),
        QuestionType::MultipleChoice => question
            .options
            .iter()
            .map(|option| {
                let count = answers.iter().filter(|a| a.selected_options.contains(&option.id)).count();
                distribution(&option.text, count as i64)
            })
            .collect(),
        QuestionType::Text => {
            let mut frequency: HashMap<String, i64> = HashMap::new();
            for text in answers.iter().filter_map(|a| a.text_answer.as_deref()) {
                let text = text.trim().to_lowercase();
                if !text.is_empty() {
                    *frequency.entry(text).or_insert(0) += 1;
                }
            }

            let mut repeated: Vec<Distribution> =
                frequency.into_iter().filter(|(_, count)| *count > 1).map(|(label, value)| Distribution { label, value }).collect();
            repeated.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
            repeated.truncate(TEXT_TOP);
            repeated
        },
        QuestionType::Image => {
            let submitted = answers.iter().filter(|a| a.image_answer.is_some()).count() as i64;
            vec![distribution("Images submitted", submitted), distribution("No image", (total_responses - submitted).max(0))]
        },
    };

    QuestionStats {
        question_id: question.id.clone(),
        question_text: question.question_text.clone(),
        question_type: question.question_type,
        answer_distribution,
    }
}

/// Statistics of one questionnaire over all of its responses.
///
/// Buckets are UTC calendar days, Sunday-start weeks and calendar months, newest first.
pub fn questionnaire_stats(detail: &QuestionnaireDetail, responses: &[ResponseRecord], now: DateTime<Utc>) -> QuestionnaireStats {
    let today = now.date_naive();
    let total_responses = responses.len() as i64;
    let days = per_day(responses.iter().map(|r| &r.created_at));

    let question_stats = detail
        .questions
        .iter()
        .map(|question| {
            let answers: Vec<&AnswerRecord> = responses.iter().flat_map(|r| r.answers.iter()).filter(|a| a.question_id == question.id).collect();
            question_stats(question, &answers, total_responses)
        })
        .collect();

    QuestionnaireStats {
        total_responses,
        average_completion_time: average(responses.iter().map(|r| r.completion_time)),
        daily_completions: daily(&days, today),
        weekly_completions: weekly(&days, today),
        monthly_completions: monthly(&days, today),
        question_stats,
    }
}

/// global overview across every questionnaire
pub fn overview(snapshot: &Snapshot, now: DateTime<Utc>) -> Overview {
    let mut top: Vec<TopQuestionnaire> = snapshot
        .questionnaires
        .iter()
        .map(|q| TopQuestionnaire { id: q.id.clone(), name: q.name.clone(), response_count: q.response_count })
        .collect();
    top.sort_by(|a, b| b.response_count.cmp(&a.response_count).then_with(|| a.id.cmp(&b.id)));
    top.truncate(TOP_QUESTIONNAIRES);

    let question_type_distribution = QuestionType::ALL
        .into_iter()
        .map(|question_type| TypeCount { question_type, count: snapshot.question_types.iter().filter(|t| **t == question_type).count() as i64 })
        .filter(|t| t.count > 0)
        .collect();

    let days = per_day(snapshot.responses.iter().map(|r| &r.created_at));
    let mut daily_activity = daily(&days, now.date_naive());
    daily_activity.reverse();

    let names: HashMap<&str, &str> = snapshot.questionnaires.iter().map(|q| (q.id.as_str(), q.name.as_str())).collect();
    let mut latest: Vec<_> = snapshot.responses.iter().collect();
    latest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    let latest_responses = latest
        .into_iter()
        .take(LATEST_RESPONSES)
        .map(|r| LatestResponse {
            id: r.id.clone(),
            questionnaire_id: r.questionnaire_id.clone(),
            questionnaire_name: names.get(r.questionnaire_id.as_str()).map(|n| n.to_string()).unwrap_or_default(),
            completion_time: r.completion_time,
            created_at: r.created_at,
        })
        .collect();

    Overview {
        total_questionnaires: snapshot.questionnaires.len() as i64,
        total_responses: snapshot.responses.len() as i64,
        total_questions: snapshot.question_types.len() as i64,
        average_completion_time: average(snapshot.responses.iter().map(|r| r.completion_time)),
        top_questionnaires: top,
        question_type_distribution,
        daily_activity,
        latest_responses,
    }
}

/// statistics read side over a store
#[derive(Clone)]
pub struct Statistics {
    store: SharedStore,
}

impl Statistics {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn questionnaire(&self, id: &str, now: DateTime<Utc>) -> ResultE<QuestionnaireStats> {
        let detail = self.store.detail(id).await?.ok_or_else(|| Erx::not_found("Questionnaire not found"))?;
        let responses = self.store.responses(id).await?;
        Ok(questionnaire_stats(&detail, &responses, now))
    }

    pub async fn overview(&self, now: DateTime<Utc>) -> ResultE<Overview> {
        let snapshot = self.store.snapshot().await?;
        Ok(overview(&snapshot, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{ListingItem, OptionDetail, ResponseHeader};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn answer(question_id: &str) -> AnswerRecord {
        AnswerRecord { id: format!("a-{}", question_id), question_id: question_id.into(), ..Default::default() }
    }

    fn response(id: &str, created_at: DateTime<Utc>, completion_time: Option<i64>, answers: Vec<AnswerRecord>) -> ResponseRecord {
        ResponseRecord { id: id.into(), questionnaire_id: "q".into(), start_time: created_at, end_time: created_at, completion_time, created_at, answers }
    }

    fn question(id: &str, question_type: QuestionType, options: &[&str]) -> QuestionDetail {
        QuestionDetail {
            id: id.into(),
            question_text: format!("question {}", id),
            question_type,
            order: 0,
            image: None,
            options: options.iter().enumerate().map(|(i, o)| OptionDetail { id: o.to_string(), text: o.to_uppercase(), order: i as i32 }).collect(),
        }
    }

    fn detail(questions: Vec<QuestionDetail>) -> QuestionnaireDetail {
        let now = at(2025, 3, 1, 0);
        QuestionnaireDetail { id: "q".into(), name: "Q".into(), description: String::new(), created_at: now, updated_at: now, response_count: 0, questions }
    }

    #[test]
    fn buckets_are_newest_first() {
        // 2025-03-12 is a Wednesday
        let now = at(2025, 3, 12, 15);
        let responses =
            vec![response("1", at(2025, 3, 12, 1), Some(10), vec![]), response("2", at(2025, 3, 9, 8), None, vec![]), response("3", at(2025, 1, 20, 8), Some(20), vec![])];
        let stats = questionnaire_stats(&detail(vec![]), &responses, now);

        assert_eq!(stats.total_responses, 3);
        assert_eq!(stats.average_completion_time, 15.0);

        assert_eq!(stats.daily_completions.len(), 30);
        assert_eq!(stats.daily_completions[0], DateCount { date: "2025-03-12".into(), count: 1 });
        assert_eq!(stats.daily_completions[3], DateCount { date: "2025-03-09".into(), count: 1 });

        assert_eq!(stats.weekly_completions.len(), 12);
        assert_eq!(stats.weekly_completions[0], WeekCount { week: "2025-03-09".into(), count: 2 });

        assert_eq!(stats.monthly_completions.len(), 6);
        assert_eq!(stats.monthly_completions[0], MonthCount { month: "2025-03".into(), count: 2 });
        assert_eq!(stats.monthly_completions[1], MonthCount { month: "2025-02".into(), count: 0 });
        assert_eq!(stats.monthly_completions[2], MonthCount { month: "2025-01".into(), count: 1 });
    }

    #[test]
    fn choice_and_image_distributions() {
        let questions = vec![question("s", QuestionType::SingleChoice, &["x", "y"]), question("m", QuestionType::MultipleChoice, &["x", "y"]), question("i", QuestionType::Image, &[])];
        let responses = vec![
            response("1", at(2025, 3, 1, 1), None, vec![
                AnswerRecord { single_option_id: Some("x".into()), ..answer("s") },
                AnswerRecord { selected_options: vec!["x".into(), "y".into()], ..answer("m") },
                AnswerRecord { image_answer: Some("https://img/1.png".into()), ..answer("i") },
            ]),
            response("2", at(2025, 3, 1, 2), None, vec![AnswerRecord { single_option_id: Some("x".into()), ..answer("s") }, AnswerRecord {
                selected_options: vec!["y".into()],
                ..answer("m")
            }]),
        ];
        let stats = questionnaire_stats(&detail(questions), &responses, at(2025, 3, 2, 0));

        assert_eq!(stats.question_stats[0].answer_distribution, vec![distribution("X", 2), distribution("Y", 0)]);
        assert_eq!(stats.question_stats[1].answer_distribution, vec![distribution("X", 1), distribution("Y", 2)]);
        assert_eq!(stats.question_stats[2].answer_distribution, vec![distribution("Images submitted", 1), distribution("No image", 1)]);
    }

    #[test]
    fn text_keeps_only_repeated_answers() {
        let texts = ["Great", " great ", "GREAT", "ok", "Ok", "unique", ""];
        let responses: Vec<ResponseRecord> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| response(&i.to_string(), at(2025, 3, 1, 1), None, vec![AnswerRecord { text_answer: Some(t.to_string()), ..answer("t") }]))
            .collect();
        let stats = questionnaire_stats(&detail(vec![question("t", QuestionType::Text, &[])]), &responses, at(2025, 3, 2, 0));
        assert_eq!(stats.question_stats[0].answer_distribution, vec![distribution("great", 3), distribution("ok", 2)]);
    }

    #[test]
    fn no_responses_average_is_zero() {
        let stats = questionnaire_stats(&detail(vec![]), &[], at(2025, 3, 2, 0));
        assert_eq!(stats.total_responses, 0);
        assert_eq!(stats.average_completion_time, 0.0);
    }

    #[test]
    fn overview_totals_and_ordering() {
        let now = at(2025, 3, 12, 12);
        let item = |id: &str, responses: i64| ListingItem {
            id: id.into(),
            name: format!("name {}", id),
            description: String::new(),
            created_at: now,
            updated_at: now,
            question_count: 1,
            response_count: responses,
        };
        let header = |id: &str, qid: &str, created_at| ResponseHeader { id: id.into(), questionnaire_id: qid.into(), completion_time: Some(60), created_at };

        let snapshot = Snapshot {
            questionnaires: vec![item("a", 1), item("b", 2)],
            question_types: vec![QuestionType::Text, QuestionType::Text, QuestionType::Image],
            responses: vec![header("r1", "a", at(2025, 3, 10, 9)), header("r2", "b", at(2025, 3, 12, 9)), header("r3", "b", at(2025, 3, 11, 9))],
        };
        let overview = overview(&snapshot, now);

        assert_eq!((overview.total_questionnaires, overview.total_responses, overview.total_questions), (2, 3, 3));
        assert_eq!(overview.average_completion_time, 60.0);
        assert_eq!(overview.top_questionnaires.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(overview.question_type_distribution, vec![
            TypeCount { question_type: QuestionType::Text, count: 2 },
            TypeCount { question_type: QuestionType::Image, count: 1 }
        ]);
        assert_eq!(overview.daily_activity.len(), 30);
        assert_eq!(overview.daily_activity.last(), Some(&DateCount { date: "2025-03-12".into(), count: 1 }));
        assert_eq!(overview.latest_responses.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["r2", "r3", "r1"]);
        assert_eq!(overview.latest_responses[0].questionnaire_name, "name b");
    }
}
