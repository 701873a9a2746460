use crate::editor::payload::{BulkSavePayload, IdRemap};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    /// Non-2xx response. The body is kept verbatim; it is what the editor shows.
    fn http(body: String) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: body,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // Same-origin unless the page says otherwise.
        let default_api_url = String::new();

        // Accept both `window.ENV.API_URL` and `window.ENV.api_url`.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self {
                                    api_url: url_str.trim_end_matches('/').to_string(),
                                };
                            }
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) csrf_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            csrf_token: None,
        }
    }

    /// Client for the current page: `window.ENV` base url plus the page's csrf meta tag.
    pub fn from_page() -> Self {
        let mut client = Self::new(EnvConfig::new().api_url);
        client.csrf_token = crate::util::csrf_token();
        client
    }

    fn with_csrf_header(req: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        req.header("X-CSRFToken", token.unwrap_or_default())
    }

    pub(crate) fn bulk_save_path(statute_id: &str) -> String {
        format!("/statute/{}/edit/bulk-save", urlencoding::encode(statute_id))
    }

    /// Send every pending change in one request. Resolves to the temp-id remap.
    pub async fn bulk_save(&self, statute_id: &str, payload: &BulkSavePayload) -> ApiResult<IdRemap> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, Self::bulk_save_path(statute_id));
        let req = Self::with_csrf_header(client.post(url), self.csrf_token.as_deref()).json(payload);

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let body = res.text().await.map_err(ApiError::network)?;

        if !status.is_success() {
            return Err(ApiError::http(body));
        }
        Self::parse_id_remap(&body)
    }

    /// Accepts string or numeric persistent ids. An empty body means nothing to rename.
    pub(crate) fn parse_id_remap(body: &str) -> ApiResult<IdRemap> {
        if body.trim().is_empty() {
            return Ok(IdRemap::new());
        }
        let data: serde_json::Value = serde_json::from_str(body).map_err(ApiError::parse)?;
        let Some(map) = data.as_object() else {
            return Err(ApiError::parse(format!("expected an id map, got: {data}")));
        };

        let mut out = IdRemap::with_capacity(map.len());
        for (tmp, real) in map {
            let real = match real {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !real.trim().is_empty() {
                out.insert(tmp.clone(), real);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::payload::{CreatedNode, NodeFields, OrderEntry};
    use crate::models::Level;

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:5000".to_string());
        assert_eq!(client.base_url, "http://localhost:5000");
        assert!(client.csrf_token.is_none());
    }

    #[test]
    fn test_bulk_save_path_encodes_id() {
        assert_eq!(ApiClient::bulk_save_path("12"), "/statute/12/edit/bulk-save");
        assert_eq!(ApiClient::bulk_save_path("a b"), "/statute/a%20b/edit/bulk-save");
    }

    #[test]
    fn test_parse_id_remap_accepts_strings_and_numbers() {
        let m = ApiClient::parse_id_remap(r#"{"new-a": "P9", "new-b": 4, "new-c": null}"#).unwrap();
        assert_eq!(m.get("new-a").map(String::as_str), Some("P9"));
        assert_eq!(m.get("new-b").map(String::as_str), Some("4"));
        assert!(!m.contains_key("new-c"));
        assert!(ApiClient::parse_id_remap("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_id_remap_rejects_non_objects() {
        let e = ApiClient::parse_id_remap("[1, 2]").unwrap_err();
        assert_eq!(e.kind, ApiErrorKind::Parse);
        assert_eq!(
            ApiClient::parse_id_remap("not json").unwrap_err().kind,
            ApiErrorKind::Parse
        );
    }

    #[test]
    fn test_http_error_message_is_raw_body() {
        let e = ApiError::http("db locked".to_string());
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.to_string(), "db locked");
    }

    #[test]
    fn test_bulk_payload_wire_contract() {
        let payload = BulkSavePayload {
            created: vec![CreatedNode {
                temp_id: "new-1".to_string(),
                level: Level::Part,
                fields: NodeFields {
                    number: Some("I".to_string()),
                    name: Some("General".to_string()),
                    content: None,
                    order_no: 1,
                    parent_id: None,
                },
            }],
            order: vec![OrderEntry {
                id: "new-1".to_string(),
                order_no: 1,
            }],
            ..Default::default()
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "created": [{
                    "temp_id": "new-1", "level": "part", "number": "I", "name": "General",
                    "content": null, "order_no": 1, "parent_id": null
                }],
                "updated": [],
                "deleted": [],
                "order": [{"id": "new-1", "order_no": 1}]
            })
        );
    }
}
