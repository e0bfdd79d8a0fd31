use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        alpaca_rest::{params::construct_params, response::AlpacaResponse},
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?;
        let secret_key = get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?;
        let api_key = SecretString::new(api_key.into());
        let secret_key = SecretString::new(secret_key.into());
        Self::with_credentials(BASE_URL, api_key, secret_key)
    }

    /// Creates a provider with explicit credentials and endpoint.
    pub fn with_credentials(
        base_url: impl Into<String>,
        api_key: SecretString,
        secret_key: SecretString,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret())
                .context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        if let Err(message) = params.validate() {
            return ValidationSnafu { message }.fail();
        }

        let mut bars = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }
            debug!(symbol = %params.symbol, page = ?next_page_token, "requesting alpaca bars");

            let response = self
                .client
                .get(&self.base_url)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    status: status.as_u16(),
                    message,
                }
                .fail();
            }

            let alpaca_response = response
                .json::<AlpacaResponse>()
                .await
                .context(ReqwestSnafu)?;

            // Merge the bars from the current page into our collection.
            for (_, page) in alpaca_response.bars.unwrap_or_default() {
                bars.extend(page.into_iter().map(|ab| ab.into_bar()));
            }

            // If there's a next page token, use it for the next iteration. Otherwise, we're done.
            match alpaca_response.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        Ok(BarSeries::new(params.symbol, bars))
    }
}
