//! Resolution of resource identifiers to request URLs

use crate::error::{Error, Result};
use crate::types::ResourceRequest;
use url::Url;

/// Placeholder replaced by the resource identifier
pub const ID_PLACEHOLDER: &str = "{id}";

/// A URL template such as `http://localhost:8888/resource/{id}`
///
/// Identifiers are percent-encoded before substitution, so an id can never
/// change the path structure of the resolved URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Parse and check a template
    ///
    /// The template must contain `{id}` and must form a valid http(s) URL once
    /// an identifier is substituted.
    pub fn parse(template: &str) -> Result<Self> {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(Error::Config {
                message: format!("URL template '{template}' has no {ID_PLACEHOLDER} placeholder"),
                key: Some("url_template".to_string()),
            });
        }

        let sample = template.replace(ID_PLACEHOLDER, "0");
        let url = Url::parse(&sample).map_err(|e| Error::Config {
            message: format!("URL template '{template}' is not a valid URL: {e}"),
            key: Some("url_template".to_string()),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!(
                    "URL template '{template}' uses unsupported scheme '{}'",
                    url.scheme()
                ),
                key: Some("url_template".to_string()),
            });
        }

        Ok(Self {
            template: template.to_string(),
        })
    }

    /// The raw template string
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute one identifier
    pub fn resolve(&self, id: &str) -> Result<Url> {
        let encoded = urlencoding::encode(id);
        Ok(Url::parse(&self.template.replace(ID_PLACEHOLDER, &encoded))?)
    }

    /// Build the requests for a batch, keeping input order
    pub fn requests<I, S>(&self, ids: I) -> Result<Vec<ResourceRequest>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(index, id)| {
                let id = id.as_ref();
                Ok(ResourceRequest {
                    index,
                    id: id.to_string(),
                    url: self.resolve(id)?,
                })
            })
            .collect()
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_identifier_into_path() {
        let template = UrlTemplate::parse("http://localhost:8888/resource/{id}").unwrap();

        let url = template.resolve("42").unwrap();

        assert_eq!(url.as_str(), "http://localhost:8888/resource/42");
    }

    #[test]
    fn identifiers_are_percent_encoded() {
        let template = UrlTemplate::parse("http://localhost:8888/resource/{id}").unwrap();

        let url = template.resolve("a/b c").unwrap();

        assert_eq!(url.path(), "/resource/a%2Fb%20c");
    }

    #[test]
    fn placeholder_may_appear_in_query() {
        let template = UrlTemplate::parse("https://example.test/get?item={id}").unwrap();

        let url = template.resolve("7").unwrap();

        assert_eq!(url.query(), Some("item=7"));
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = UrlTemplate::parse("http://localhost:8888/resource/").unwrap_err();

        assert_eq!(err.error_code(), "config_error");
    }

    #[test]
    fn rejects_unparsable_template() {
        assert!(UrlTemplate::parse("not a url {id}").is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(UrlTemplate::parse("ftp://example.test/{id}").is_err());
    }

    #[test]
    fn requests_keep_input_order_and_positions() {
        let template = UrlTemplate::parse("http://localhost:8888/resource/{id}").unwrap();

        let requests = template.requests(["3", "1", "2"]).unwrap();

        let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
        let indices: Vec<_> = requests.iter().map(|r| r.index).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(requests[0].url.path(), "/resource/3");
    }

    #[test]
    fn requests_for_no_ids_is_empty() {
        let template = UrlTemplate::parse("http://localhost:8888/resource/{id}").unwrap();

        let requests = template.requests(Vec::<String>::new()).unwrap();

        assert!(requests.is_empty());
    }
}
