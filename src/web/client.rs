pub mod feed;

use reqwest::Response;
use std::str::FromStr;
use std::time::Duration;

use crate::erx::{self, Erx, Layouted, ResultE, ResultEX};
use crate::model::types::{ListingItem, QuestionnaireDetail, QuestionnaireDraft};
use crate::web::client::feed::Feed;
use crate::web::except::ExceptBody;
use crate::web::messages::pagination::{ListingPage, PageRequest};

static DEFAULT_USER_AGENT: &str = concat!("Questioneer/", env!("CARGO_PKG_VERSION"));

pub struct ClientBuilder {
    base: String,
    headers: reqwest::header::HeaderMap,
    user_agent: Option<String>,
    timeout: Duration,
}

/// HTTP client of the questionnaire API
#[derive(Clone)]
pub struct Client {
    base: String,
    cli: reqwest::Client,
}

/// Join two url path
fn join(base: &str, other: &str) -> String {
    match (base.ends_with('/'), other.starts_with('/')) {
        (true, true) => format!("{}{}", base, &other[1..]),
        (false, false) => format!("{}/{}", base, other),
        _ => format!("{}{}", base, other),
    }
}

impl ClientBuilder {
    pub fn new(base: &str) -> ClientBuilder {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static("application/json"));
        ClientBuilder { base: base.to_string(), headers, user_agent: None, timeout: Duration::from_secs(10) }
    }

    pub fn set_user_agent(mut self, agent: &str) -> Self {
        self.user_agent = Some(agent.to_string());
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn add_header(mut self, key: &str, value: &str) -> ResultE<Self> {
        let key = reqwest::header::HeaderName::from_str(key).map_err(erx::smp)?;
        let value = reqwest::header::HeaderValue::from_str(value).map_err(erx::smp)?;
        self.headers.insert(key, value);
        Ok(self)
    }

    pub fn build(self) -> ResultE<Client> {
        let cli = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .default_headers(self.headers)
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(erx::amp("http client build failed"))?;

        Ok(Client { base: self.base, cli })
    }
}

impl Client {
    fn transport(error: reqwest::Error) -> Erx {
        Erx::with_code(Layouted::client("1000"), &error.to_string())
    }

    /// one listing page
    pub async fn fetch_page(&self, request: &PageRequest) -> ResultE<ListingPage<ListingItem>> {
        let response = self.cli.get(join(&self.base, "questionnaires")).query(&request.query_pairs()).send().await.map_err(Self::transport)?;
        Self::typed(response).await
    }

    /// Issue the next request of `feed` and apply its page.
    ///
    /// Returns `feed` unchanged once it has no more items.
    pub async fn load_more(&self, feed: &Feed) -> ResultE<Feed> {
        let Some((pending, ticket, request)) = feed.begin()? else {
            return Ok(feed.clone());
        };

        let page = self.fetch_page(&request).await?;
        Ok(pending.apply(ticket, page))
    }

    pub async fn get(&self, id: &str) -> ResultE<QuestionnaireDetail> {
        let response = self.cli.get(join(&self.base, &format!("questionnaires/{}", id))).send().await.map_err(Self::transport)?;
        Self::typed(response).await
    }

    pub async fn create(&self, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail> {
        let response = self.cli.post(join(&self.base, "questionnaires")).json(draft).send().await.map_err(Self::transport)?;
        Self::typed(response).await
    }

    pub async fn delete(&self, id: &str) -> ResultEX {
        let response = self.cli.delete(join(&self.base, &format!("questionnaires/{}", id))).send().await.map_err(Self::transport)?;
        Self::typed::<serde_json::Value>(response).await.map(|_| ())
    }

    /// delete on the server, then drop the item from `feed`
    pub async fn delete_from(&self, feed: &Feed, id: &str) -> ResultE<Feed> {
        self.delete(id).await?;
        Ok(feed.without(id))
    }

    /// decode a success body, or turn the `{ error, code }` body back into an Erx
    async fn typed<T>(response: Response) -> ResultE<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(Self::transport);
        }

        let body = response.text().await.map_err(Self::transport)?;
        match serde_json::from_str::<ExceptBody>(&body) {
            Ok(except) => Err(Erx::with_code(except.code.into(), &except.error)),
            Err(_) => Err(Erx::with_code(Layouted::client(&format!("{:04}", status.as_u16())), &body)),
        }
    }
}
