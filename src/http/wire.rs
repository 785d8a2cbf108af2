//! One-exchange HTTP helpers: send a request, normalize the outcome.
//!
//! Every JSON endpoint goes through [`check_json_response`]: a non-success
//! status, or a success body carrying a non-null `error` field, becomes a
//! [`RedactError::Api`]; a body that is not valid JSON becomes a
//! [`RedactError::MalformedResponse`] regardless of the transport status.

use crate::errors::RedactError;
use reqwest::Client as ReqwestClient;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;

/// Sends a GET request and returns the normalized JSON body.
pub async fn get_json(
    http_client: &ReqwestClient,
    url: &str,
    auth: &str,
) -> Result<Value, RedactError> {
    log::debug!("GET {url}");
    let response = http_client
        .get(url)
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, auth)
        .send()
        .await?;
    check_json_response(response).await
}

/// Sends a JSON POST request and returns the normalized JSON body.
pub async fn post_json<T: serde::Serialize>(
    http_client: &ReqwestClient,
    url: &str,
    body: &T,
    auth: &str,
) -> Result<Value, RedactError> {
    log::debug!("POST {url}");
    let response = http_client
        .post(url)
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, auth)
        .json(body)
        .send()
        .await?;
    check_json_response(response).await
}

/// Sends a multipart POST request carrying a binary video part plus
/// string-coerced scalar fields, and returns the normalized JSON body.
///
/// `headers` carries per-request metadata such as chunk coordinates.
pub async fn post_multipart(
    http_client: &ReqwestClient,
    url: &str,
    form: reqwest::multipart::Form,
    headers: &[(&'static str, String)],
    auth: &str,
) -> Result<Value, RedactError> {
    log::debug!("POST {url} (multipart)");
    let mut request = http_client
        .post(url)
        .header(ACCEPT, "application/json")
        .header(AUTHORIZATION, auth)
        .multipart(form);
    for (name, value) in headers {
        request = request.header(*name, value.as_str());
    }
    let response = request.send().await?;
    check_json_response(response).await
}

/// Sends a GET request for a binary body and returns the raw bytes.
pub async fn download(
    http_client: &ReqwestClient,
    url: &str,
    auth: &str,
) -> Result<bytes::Bytes, RedactError> {
    log::debug!("GET {url} (binary)");
    let response = http_client
        .get(url)
        .header(AUTHORIZATION, auth)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RedactError::Api {
            status_code: status.as_u16(),
            message: format!(
                "received invalid response: {}",
                status.canonical_reason().unwrap_or("Error")
            ),
        });
    }
    Ok(response.bytes().await?)
}

/// Coerces a serializable parameter set into multipart text fields.
///
/// Scalar values travel as their string form; `None` fields are absent
/// because the `Serialize` impls skip them.
pub fn form_text_fields<T: serde::Serialize>(
    params: &T,
) -> Result<Vec<(String, String)>, RedactError> {
    let value = serde_json::to_value(params)?;
    let Value::Object(map) = value else {
        return Ok(Vec::new());
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

/// Checks the HTTP status and the body's explicit `error` field, then
/// returns the parsed JSON body.
async fn check_json_response(response: reqwest::Response) -> Result<Value, RedactError> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).map_err(|err| {
        log::warn!("response body is not valid JSON (HTTP {status}): {err}");
        RedactError::MalformedResponse(format!("response body is not valid JSON: {err}"))
    })?;

    let error_field = body
        .get("error")
        .filter(|value| !value.is_null() && value.as_str() != Some(""));
    if !status.is_success() || error_field.is_some() {
        let message = error_field
            .and_then(Value::as_str)
            .map_or_else(|| "Error".to_string(), str::to_string);
        return Err(RedactError::Api {
            status_code: status.as_u16(),
            message: format!("received invalid response: {message}"),
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/info"))
            .and(header("authorization", "Bearer token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "media_id": "m1", "error": null })),
            )
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/info", mock_server.uri());
        let body = get_json(&client, &url, "Bearer token").await.unwrap();
        assert_eq!(body["media_id"], "m1");
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/info"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({ "error": "Forbidden" })),
            )
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/info", mock_server.uri());
        let err = get_json(&client, &url, "Bearer token").await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(err.to_string().contains("received invalid response: Forbidden"));
    }

    #[tokio::test]
    async fn test_error_field_on_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/info"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "bad media" })),
            )
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/info", mock_server.uri());
        let err = get_json(&client, &url, "Bearer token").await.unwrap_err();
        assert_eq!(err.status_code(), 200);
        assert!(err.to_string().contains("bad media"));
    }

    #[tokio::test]
    async fn test_error_status_without_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/info"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/info", mock_server.uri());
        let err = get_json(&client, &url, "Bearer token").await.unwrap_err();
        // a body that is not JSON is a malformed response, whatever the status
        assert!(matches!(err, RedactError::MalformedResponse(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_null_error_field_is_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "token": "abc", "error": null })),
            )
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/token", mock_server.uri());
        let body = get_json(&client, &url, "Basic abc").await.unwrap();
        assert_eq!(body["token"], "abc");
    }

    #[tokio::test]
    async fn test_download_returns_bytes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/download", mock_server.uri());
        let bytes = download(&client, &url, "Bearer token").await.unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/download"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = ReqwestClient::new();
        let url = format!("{}/api/v2/download", mock_server.uri());
        let err = download(&client, &url, "Bearer token").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_form_text_fields_coerces_scalars() {
        #[derive(Serialize)]
        struct Params {
            media_path: String,
            detect_faces: bool,
            enlarge_boxes: f64,
            #[serde(skip_serializing_if = "Option::is_none")]
            video_tag: Option<String>,
        }

        let fields: std::collections::BTreeMap<String, String> = form_text_fields(&Params {
            media_path: "s3://bucket/key.mp4".to_string(),
            detect_faces: true,
            enlarge_boxes: 1.5,
            video_tag: None,
        })
        .unwrap()
        .into_iter()
        .collect();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields["media_path"], "s3://bucket/key.mp4");
        assert_eq!(fields["detect_faces"], "true");
        assert_eq!(fields["enlarge_boxes"], "1.5");
        assert!(!fields.contains_key("video_tag"));
    }
}
