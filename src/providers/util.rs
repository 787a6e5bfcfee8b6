use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Sends a request, retrying on transport errors and 5xx responses.
///
/// # Parameters
/// - `request`: Closure returning the send future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay`: Pause between attempts
///
/// # Returns
/// The first response that is not a server error, the last server error
/// response once retries run out, or the last transport error
pub async fn send_with_retry<F, Fut>(
    mut request: F,
    retries: usize,
    delay: Duration,
) -> Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<reqwest::Response>>,
{
    let mut attempt = 1;
    loop {
        match request().await {
            Ok(response) if response.status().is_server_error() && attempt <= retries => {
                debug!(
                    "Attempt {}/{} returned {}. Retrying...",
                    attempt,
                    retries,
                    response.status()
                );
            }
            Ok(response) => return Ok(response),
            Err(err) if attempt <= retries => {
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
            }
            Err(err) => return Err(err.into()),
        }
        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/flaky", mock_server.uri());
        let response = send_with_retry(|| client.get(&url).send(), 2, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/down", mock_server.uri());
        let response = send_with_retry(|| client.get(&url).send(), 2, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/missing", mock_server.uri());
        let response = send_with_retry(|| client.get(&url).send(), 3, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
