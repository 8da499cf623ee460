//! Common test utilities for batch-fetch integration tests

use batch_fetch::Config;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One resource served by the mock server
pub struct Served {
    pub id: &'static str,
    pub body: &'static str,
    pub delay: Duration,
}

impl Served {
    pub fn new(id: &'static str, body: &'static str) -> Self {
        Self {
            id,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Start a server answering `GET /resource/{id}` for every served resource
pub async fn resource_server(resources: impl IntoIterator<Item = Served>) -> MockServer {
    let server = MockServer::start().await;
    for resource in resources {
        Mock::given(method("GET"))
            .and(path(format!("/resource/{}", resource.id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(resource.body)
                    .set_delay(resource.delay),
            )
            .mount(&server)
            .await;
    }
    server
}

/// Default configuration pointed at the mock server
pub fn config_for(server: &MockServer) -> Config {
    Config {
        url_template: format!("{}/resource/{{id}}", server.uri()),
        ..Default::default()
    }
}
