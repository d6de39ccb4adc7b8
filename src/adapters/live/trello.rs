//! Live adapter for the `BoardService` port using the Trello REST API.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::ports::{Board, BoardFuture, BoardService, Card, CheckItem, Checklist, List};

const TRELLO_API_URL: &str = "https://api.trello.com/1";

/// Errors from the Trello REST API.
#[derive(Debug, Error)]
pub enum TrelloError {
    /// The API answered with a non-success status.
    #[error("Trello API error ({status}) on {path}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Request path.
        path: String,
        /// Response body.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode Trello response from {path}: {source}")]
    Decode {
        /// Request path.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The request could not be sent or its body not read. The request URL
    /// is stripped from the source error.
    #[error("HTTP error on {path}: {source}")]
    Http {
        /// Request path.
        path: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },
}

impl TrelloError {
    fn http(path: &str, source: reqwest::Error) -> Self {
        Self::Http { path: path.to_string(), source: source.without_url() }
    }
}

/// Board service that talks to Trello over HTTPS.
///
/// Credentials travel in an OAuth `Authorization` header, never in the URL.
pub struct LiveTrello {
    client: Client,
    base_url: String,
    auth: AuthConfig,
}

impl LiveTrello {
    /// Creates a client for the public Trello API.
    #[must_use]
    pub fn new(auth: AuthConfig) -> Self {
        Self { client: Client::new(), base_url: TRELLO_API_URL.to_string(), auth }
    }

    /// Points the client at another API root, such as a local stub server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorization(&self) -> String {
        format!(
            r#"OAuth oauth_consumer_key="{}", oauth_token="{}""#,
            self.auth.appkey, self.auth.token
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        params: &[(&str, &str)],
    ) -> Result<T, TrelloError> {
        let response = self
            .client
            .request(method, self.url(&path))
            .header(AUTHORIZATION, self.authorization())
            .query(params)
            .send()
            .await
            .map_err(|e| TrelloError::http(&path, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TrelloError::http(&path, e))?;
        if !status.is_success() {
            return Err(TrelloError::Api { status: status.as_u16(), path, message: body });
        }
        decode(&path, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T, TrelloError> {
        self.send(Method::GET, path, &[]).await
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, TrelloError> {
    serde_json::from_str(body)
        .map_err(|source| TrelloError::Decode { path: path.to_string(), source })
}

#[derive(Debug, Deserialize)]
struct WireBoard {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireList {
    id: String,
    name: String,
    id_board: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCard {
    id: String,
    name: String,
    url: String,
    id_list: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireChecklist {
    id: String,
    name: String,
    id_card: String,
    #[serde(default)]
    check_items: Vec<WireCheckItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCheckItem {
    id: String,
    name: String,
    id_checklist: String,
    #[serde(default)]
    state: String,
}

impl From<WireBoard> for Board {
    fn from(wire: WireBoard) -> Self {
        Self { id: wire.id, name: wire.name }
    }
}

impl From<WireList> for List {
    fn from(wire: WireList) -> Self {
        Self { id: wire.id, name: wire.name, board_id: wire.id_board }
    }
}

impl From<WireCard> for Card {
    fn from(wire: WireCard) -> Self {
        Self { id: wire.id, title: wire.name, url: wire.url, list_id: wire.id_list }
    }
}

impl From<WireCheckItem> for CheckItem {
    fn from(wire: WireCheckItem) -> Self {
        Self {
            id: wire.id,
            label: wire.name,
            checklist_id: wire.id_checklist,
            checked: wire.state == "complete",
        }
    }
}

impl From<WireChecklist> for Checklist {
    fn from(wire: WireChecklist) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            card_id: wire.id_card,
            items: wire.check_items.into_iter().map(CheckItem::from).collect(),
        }
    }
}

fn convert<W, T: From<W>>(items: Vec<W>) -> Vec<T> {
    items.into_iter().map(T::from).collect()
}

impl BoardService for LiveTrello {
    fn fetch_board<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Board> {
        Box::pin(async move {
            let board: WireBoard = self.get(format!("/boards/{board_id}")).await?;
            Ok(board.into())
        })
    }

    fn fetch_lists<'a>(&'a self, board_id: &'a str) -> BoardFuture<'a, Vec<List>> {
        Box::pin(async move {
            let lists: Vec<WireList> = self.get(format!("/boards/{board_id}/lists")).await?;
            Ok(convert(lists))
        })
    }

    fn fetch_cards<'a>(&'a self, list_id: &'a str) -> BoardFuture<'a, Vec<Card>> {
        Box::pin(async move {
            let cards: Vec<WireCard> = self.get(format!("/lists/{list_id}/cards")).await?;
            Ok(convert(cards))
        })
    }

    fn fetch_checklists<'a>(&'a self, card_id: &'a str) -> BoardFuture<'a, Vec<Checklist>> {
        Box::pin(async move {
            let checklists: Vec<WireChecklist> =
                self.get(format!("/cards/{card_id}/checklists")).await?;
            Ok(convert(checklists))
        })
    }

    fn create_checklist<'a>(
        &'a self,
        card_id: &'a str,
        name: &'a str,
    ) -> BoardFuture<'a, Checklist> {
        Box::pin(async move {
            let checklist: WireChecklist = self
                .send(Method::POST, format!("/cards/{card_id}/checklists"), &[("name", name)])
                .await?;
            Ok(checklist.into())
        })
    }

    fn create_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        label: &'a str,
    ) -> BoardFuture<'a, CheckItem> {
        Box::pin(async move {
            let item: WireCheckItem = self
                .send(
                    Method::POST,
                    format!("/checklists/{checklist_id}/checkItems"),
                    &[("name", label)],
                )
                .await?;
            Ok(item.into())
        })
    }

    fn delete_check_item<'a>(
        &'a self,
        checklist_id: &'a str,
        item_id: &'a str,
    ) -> BoardFuture<'a, ()> {
        Box::pin(async move {
            let _: serde_json::Value = self
                .send(
                    Method::DELETE,
                    format!("/checklists/{checklist_id}/checkItems/{item_id}"),
                    &[],
                )
                .await?;
            Ok(())
        })
    }
}
