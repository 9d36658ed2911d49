pub mod answer;
pub mod question;
pub mod question_option;
pub mod questionnaire;
pub mod response;
