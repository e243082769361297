//! Google Sheets sink: appends normalized rows under an existing sheet header.
//!
//! Talks to the Sheets v4 REST API with a service-account token.

use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tally_core::{RowCollection, Sink, SinkError, align_to_header};

use crate::config::SheetTarget;

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

pub struct GoogleSheetsSink {
    client: Client,
    target: SheetTarget,
}

impl GoogleSheetsSink {
    pub fn new(target: SheetTarget) -> Self {
        Self {
            client: Client::new(),
            target,
        }
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        let path = &self.target.credentials_path;
        let key = yup_oauth2::read_service_account_key(path)
            .await
            .map_err(|e| SinkError::Auth(format!("reading {}: {e}", path.display())))?;

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| SinkError::Auth(format!("building authenticator: {e}")))?;

        let token = auth
            .token(&[SCOPE])
            .await
            .map_err(|e| SinkError::Auth(e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| SinkError::Auth("no access token returned".to_string()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SinkError> {
        let mut url = Url::parse(API_BASE).map_err(|e| SinkError::Http(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SinkError::Http(format!("cannot extend {API_BASE}")))?
            .push(&self.target.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    /// Fail unless the spreadsheet has a tab with the configured title.
    async fn ensure_sheet(&self, token: &str) -> Result<(), SinkError> {
        let resp = self
            .client
            .get(self.url(&[])?)
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(http)?;
        let meta: SpreadsheetMeta = check(resp).await?.json().await.map_err(http)?;

        let titles: Vec<&str> = meta.sheets.iter().map(|s| s.properties.title.as_str()).collect();
        debug!(?titles, "spreadsheet tabs");
        if has_sheet(&titles, &self.target.sheet_title) {
            Ok(())
        } else {
            Err(SinkError::SheetNotFound(self.target.sheet_title.clone()))
        }
    }

    async fn header_row(&self, token: &str) -> Result<Vec<String>, SinkError> {
        let range = a1_range(&self.target.sheet_title, "1:1");
        let resp = self
            .client
            .get(self.url(&["values", &range])?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(http)?;
        let body: ValueRange = check(resp).await?.json().await.map_err(http)?;
        Ok(header_from(&body))
    }

    async fn append_values(&self, token: &str, values: Vec<Vec<String>>) -> Result<(), SinkError> {
        let endpoint = format!("{}:append", a1_range(&self.target.sheet_title, "A1"));
        let body = ValueRange {
            values: values
                .into_iter()
                .map(|row| row.into_iter().map(serde_json::Value::String).collect())
                .collect(),
        };

        let resp = self
            .client
            .post(self.url(&["values", &endpoint])?)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(http)?;
        check(resp).await?;
        Ok(())
    }
}

impl Sink for GoogleSheetsSink {
    async fn append(&self, rows: &RowCollection) -> Result<(), SinkError> {
        if rows.is_empty() {
            info!("no rows to append");
            return Ok(());
        }

        let token = self.access_token().await?;
        self.ensure_sheet(&token).await?;

        let header = self.header_row(&token).await?;
        if header.is_empty() {
            return Err(SinkError::EmptyHeader(self.target.sheet_title.clone()));
        }

        let values = align_to_header(&header, rows);
        let count = values.len();
        self.append_values(&token, values).await?;

        info!(
            rows = count,
            sheet = %self.target.sheet_title,
            "appended rows to spreadsheet"
        );
        Ok(())
    }
}

fn http(e: reqwest::Error) -> SinkError {
    SinkError::Http(e.to_string())
}

async fn check(resp: Response) -> Result<Response, SinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SinkError::Rejected {
        status: status.as_u16(),
        body,
    })
}

/// `'Title'!cells`, with quotes in the title doubled.
fn a1_range(title: &str, cells: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), cells)
}

fn has_sheet(titles: &[&str], wanted: &str) -> bool {
    titles.iter().any(|t| *t == wanted)
}

/// Header names from the first returned row; trailing blank cells are dropped.
fn header_from(range: &ValueRange) -> Vec<String> {
    let mut header: Vec<String> = range
        .values
        .first()
        .map(|row| {
            row.iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    while header.last().is_some_and(|h| h.is_empty()) {
        header.pop();
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sink() -> GoogleSheetsSink {
        GoogleSheetsSink::new(SheetTarget {
            spreadsheet_id: "sheet-123".to_string(),
            sheet_title: "Bob's 2023".to_string(),
            credentials_path: PathBuf::from("/nonexistent/creds.json"),
        })
    }

    #[test]
    fn test_a1_range_quotes_title() {
        assert_eq!(a1_range("Transactions", "1:1"), "'Transactions'!1:1");
        assert_eq!(a1_range("Bob's 2023", "A1"), "'Bob''s 2023'!A1");
    }

    #[test]
    fn test_url_encodes_range_segment() {
        let s = sink();
        let range = format!("{}:append", a1_range(&s.target.sheet_title, "A1"));
        let url = s.url(&["values", &range]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/'Bob''s%202023'!A1:append"
        );
    }

    #[test]
    fn test_sheet_lookup_is_by_exact_title() {
        assert!(has_sheet(&["Budget", "Transactions"], "Transactions"));
        assert!(!has_sheet(&["Budget", "transactions"], "Transactions"));
    }

    #[test]
    fn test_header_from_value_range() {
        let body: ValueRange = serde_json::from_str(
            r#"{"range":"'Transactions'!A1:F1","majorDimension":"ROWS","values":[["Timestamp","Item"," Category ","Debit","Credit",""]]}"#,
        )
        .unwrap();
        assert_eq!(header_from(&body), vec!["Timestamp", "Item", "Category", "Debit", "Credit"]);

        let empty: ValueRange = serde_json::from_str(r#"{"range":"'Transactions'!A1:Z1"}"#).unwrap();
        assert!(header_from(&empty).is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_skips_remote_calls() {
        // credentials do not exist, so any remote call would fail
        sink().append(&RowCollection::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_key_file_is_auth_error() {
        let rows: RowCollection =
            vec![tally_core::CanonicalRow::from_iter([("Item", "Coffee")])].into();
        let err = sink().append(&rows).await.unwrap_err();
        assert!(matches!(err, SinkError::Auth(_)));
    }
}
