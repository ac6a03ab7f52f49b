//! Remote-config connection string parsing.
//!
//! `https://config.example.com/<config-id>?token=<token>` becomes
//! `GET https://config.example.com/item/<key>?configId=<config-id>&token=<token>`.

use url::Url;

use crate::remote::resolver::FetchFailure;

/// Parsed connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    endpoint: Url,
    config_id: String,
    token: String,
}

// Keeps the token out of logs.
impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint.as_str())
            .field("config_id", &self.config_id)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn parse(raw: &str) -> Result<Self, FetchFailure> {
        let malformed = |reason: &str| FetchFailure::MalformedEndpoint(reason.to_string());

        let url = Url::parse(raw.trim()).map_err(|_| malformed("not a URL"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(malformed("scheme must be http or https"));
        }

        let token = url
            .query_pairs()
            .find(|(name, _)| name == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| malformed("missing token"))?;

        let mut segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        let config_id = segments.pop().ok_or_else(|| malformed("missing config id"))?;

        let mut endpoint = url.clone();
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        endpoint.set_path(&segments.join("/"));

        Ok(Self {
            endpoint,
            config_id,
            token,
        })
    }

    /// URL of one item: `{endpoint}/item/{key}?configId=..&token=..`.
    pub fn item_url(&self, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("item").push(key);
        }
        url.query_pairs_mut()
            .append_pair("configId", &self.config_id)
            .append_pair("token", &self.token);
        url
    }

    /// Endpoint host, safe to log.
    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or("unknown")
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_item_url() {
        let conn = Connection::parse("https://config.example.com/ecfg_abc?token=secret").unwrap();
        assert_eq!(conn.host(), "config.example.com");
        assert_eq!(conn.config_id(), "ecfg_abc");
        assert_eq!(
            conn.item_url("appUrls").as_str(),
            "https://config.example.com/item/appUrls?configId=ecfg_abc&token=secret"
        );
    }

    #[test]
    fn test_endpoint_with_base_path() {
        let conn = Connection::parse("http://127.0.0.1:9000/v1/ecfg_x?token=t").unwrap();
        assert_eq!(
            conn.item_url("routes").as_str(),
            "http://127.0.0.1:9000/v1/item/routes?configId=ecfg_x&token=t"
        );
    }

    #[test]
    fn test_malformed_connection_strings() {
        for raw in [
            "",
            "not a url",
            "ftp://config.example.com/ecfg?token=t",
            "https://config.example.com/ecfg_abc",
            "https://config.example.com/?token=t",
            "https://config.example.com/ecfg?token=",
        ] {
            assert!(
                matches!(Connection::parse(raw), Err(FetchFailure::MalformedEndpoint(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let conn = Connection::parse("https://config.example.com/ecfg_abc?token=secret").unwrap();
        assert!(!format!("{conn:?}").contains("secret"));
    }
}
