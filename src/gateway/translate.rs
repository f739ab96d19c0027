use std::time::Duration;

use serde_json::Value;

use crate::errors::{Result, UserFacingError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Translates the sentence through the translation endpoint
pub(super) async fn translate(
    client: &reqwest::Client,
    url: &str,
    sentence: &str,
    from: &str,
    to: &str,
) -> Result<String> {
    let params = [("client", "gtx"), ("sl", from), ("tl", to), ("dt", "t"), ("q", sentence)];

    let res = client
        .get(url)
        .query(&params)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|err| {
            tracing::warn!("Translation request failed: {err}");
            UserFacingError::TranslationFailed(if err.is_timeout() {
                String::from("request timed out")
            } else {
                String::from("couldn't reach the service")
            })
        })?;

    let status = res.status();
    if !status.is_success() {
        tracing::warn!("Translation service responded with {status}");
        return Err(UserFacingError::TranslationFailed(format!("service responded with {status}")).into());
    }

    let body: Value = res.json().await.map_err(|err| {
        tracing::warn!("Couldn't parse the translation response: {err}");
        UserFacingError::TranslationFailed(String::from("unexpected response"))
    })?;

    extract_translation(&body)
        .ok_or_else(|| UserFacingError::TranslationFailed(String::from("unexpected response")).into())
}

/// Joins the translated segments of the response, found at `[0][i][0]`
fn extract_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let translated = segments
        .iter()
        .filter_map(|segment| segment.get(0)?.as_str())
        .collect::<String>();
    (!translated.is_empty()).then_some(translated)
}
