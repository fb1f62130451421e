//! HTTP plumbing shared by every provider

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::config::USER_AGENT;
use crate::release::error::FetchError;

/// Builds the client whose connection pool all providers share
pub fn build_client(connect_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .build()
}

/// Issues a GET and classifies the status: 200 passes, 404 is not-found, anything else fails
pub async fn get(client: &Client, url: &str, name: &str) -> Result<Response, FetchError> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;
    classify(response, url, name)
}

fn classify(response: Response, url: &str, name: &str) -> Result<Response, FetchError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound(name.to_string())),
        status => Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use rstest::rstest;

    #[rstest]
    #[case(404)]
    #[case(204)]
    #[case(500)]
    #[tokio::test]
    async fn get_rejects_everything_but_ok(#[case] status: usize) {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/thing")
            .with_status(status)
            .create_async()
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/thing", server.url());
        let result = get(&client, &url, "thing").await;

        mock.assert_async().await;
        match status {
            404 => assert!(matches!(result, Err(FetchError::NotFound(_)))),
            _ => assert!(matches!(
                result,
                Err(FetchError::UnexpectedStatus { status: s, .. }) if s as usize == status
            )),
        }
    }

    #[tokio::test]
    async fn get_passes_ok_response_through() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/thing")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/thing", server.url());
        let response = get(&client, &url, "thing").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.text().await.unwrap(), "hello");
    }
}
