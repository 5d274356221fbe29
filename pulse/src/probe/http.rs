use async_trait::async_trait;
use log::debug;
use reqwest::{redirect, Client};
use url::Url;

use crate::{
    config::{Method, PulseConfig},
    error::{ProbeError, PulseError},
    registry::Endpoint,
};

use super::Probe;

/// Probe that issues one HTTP request per endpoint and reports the status it got back.
///
/// Any status is a valid answer here, deciding what counts as failure happens later.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    method: Method,
}

impl HttpProbe {
    pub fn new(config: &PulseConfig) -> Result<Self, PulseError> {
        let policy = if config.follow_redirects {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(policy)
            .timeout(config.timeout)
            .build()?;

        Ok(HttpProbe {
            client,
            method: config.method,
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, endpoint: &Endpoint) -> Result<u16, ProbeError> {
        let url = Url::parse(endpoint.as_str())?;

        let response = self.client.request(self.method.into(), url).send().await?;
        debug!("{} answered {}", endpoint, response.status());

        Ok(response.status().as_u16())
    }
}
