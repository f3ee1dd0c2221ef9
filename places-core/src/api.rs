//! HTTP access to the places backend.

use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use tracing::instrument;

use crate::{
    config::ApiSettings,
    error::PlacesError,
    model::{PlacePayload, PlaceRecord, WeatherSample},
};

const ALLOW_METHODS: &str = "DELETE, POST, GET, PUT, OPTIONS";
const ALLOW_HEADERS: &str =
    "Origin, Accept, Content-Type, Access-Control-Allow-Headers, Authorization, X-Requested-With";

/// Endpoints of the places backend.
#[async_trait]
pub trait PlacesApi: Send + Sync + Debug {
    /// `GET /place`
    async fn list_places(&self) -> Result<Vec<PlaceRecord>, PlacesError>;

    /// `POST /place`; the response body is ignored.
    async fn create_place(&self, payload: &PlacePayload) -> Result<(), PlacesError>;

    /// `GET /weather?latitude=..&longitude=..`
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSample, PlacesError>;
}

/// The shared request client: fixed base URL, CORS headers, cookies kept across calls.
#[derive(Debug, Clone)]
pub struct HttpPlacesApi {
    base_url: Url,
    http: Client,
}

impl HttpPlacesApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, PlacesError> {
        let http = Client::builder()
            .default_headers(cors_headers(settings)?)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Generic GET passthrough.
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PlacesError>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        let body = check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Generic POST passthrough; returns the raw response body.
    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<String, PlacesError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        check_status(response).await
    }
}

#[async_trait]
impl PlacesApi for HttpPlacesApi {
    #[instrument(skip(self), level = "debug")]
    async fn list_places(&self) -> Result<Vec<PlaceRecord>, PlacesError> {
        self.get_json("place", &[]).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_place(&self, payload: &PlacePayload) -> Result<(), PlacesError> {
        self.post_json("place", payload).await.map(|_| ())
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSample, PlacesError> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ];
        self.get_json("weather", &query).await
    }
}

fn cors_headers(settings: &ApiSettings) -> Result<HeaderMap, PlacesError> {
    let origins = match &settings.client_url {
        Some(client) => format!("{},{}", client, settings.server_url),
        None => settings.server_url.clone(),
    };

    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("access-control-allow-origin", origins.as_str()),
        ("access-control-allow-methods", ALLOW_METHODS),
        ("access-control-allow-headers", ALLOW_HEADERS),
    ] {
        let value = HeaderValue::from_str(value)
            .map_err(|e| PlacesError::InvalidConfig(format!("{name}: {e}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

async fn check_status(response: reqwest::Response) -> Result<String, PlacesError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!(%status, "request failed");
        return Err(PlacesError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }
    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> ApiSettings {
        ApiSettings {
            base_url: Url::parse(&server.uri()).unwrap(),
            server_url: server.uri(),
            client_url: Some("http://localhost:3000".into()),
        }
    }

    #[tokio::test]
    async fn list_places_sends_cors_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/place"))
            .and(header_exists("access-control-allow-origin"))
            .and(header_exists("access-control-allow-methods"))
            .and(header_exists("access-control-allow-headers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Ritz", "type": "Hotel", "address": "51.507, -0.141"},
                {"id": 2, "name": "Dishoom", "type": "Restaurant", "address": "51.512, -0.127"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpPlacesApi::new(&settings(&server)).unwrap();
        let places = api.list_places().await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Ritz");
        assert_eq!(places[1].kind, "Restaurant");
    }

    #[tokio::test]
    async fn create_place_posts_flat_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/place"))
            .and(body_json(serde_json::json!({
                "name": "Ritz",
                "type": "Hotel",
                "address": "51.507, -0.141"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpPlacesApi::new(&settings(&server)).unwrap();
        let payload: PlacePayload = [
            ("name", "Ritz"),
            ("type", "Hotel"),
            ("address", "51.507, -0.141"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        api.create_place(&payload).await.unwrap();
    }

    #[tokio::test]
    async fn weather_is_queried_by_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("latitude", "51.505"))
            .and(query_param("longitude", "-0.09"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": {"temp": 283.15, "pressure": 1009}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpPlacesApi::new(&settings(&server)).unwrap();
        let sample = api.current_weather(51.505, -0.09).await.unwrap();

        assert!((sample.temperature_celsius() - 10.0).abs() < 1e-9);
        assert_eq!(sample.pressure(), 1009.0);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/place"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = HttpPlacesApi::new(&settings(&server)).unwrap();
        let err = api.list_places().await.unwrap_err();

        assert_eq!(
            err,
            PlacesError::Status {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"main\": 1}"))
            .mount(&server)
            .await;

        let api = HttpPlacesApi::new(&settings(&server)).unwrap();
        let err = api.current_weather(0.0, 0.0).await.unwrap_err();

        assert!(matches!(err, PlacesError::Decode(_)));
    }

    #[test]
    fn cors_headers_list_client_then_server() {
        let headers = cors_headers(&ApiSettings {
            base_url: Url::parse("http://api.local:8080").unwrap(),
            server_url: "http://api.local:8080".into(),
            client_url: Some("http://localhost:3000".into()),
        })
        .unwrap();

        assert_eq!(
            headers["access-control-allow-origin"],
            "http://localhost:3000,http://api.local:8080"
        );
        assert_eq!(headers["access-control-allow-methods"], ALLOW_METHODS);
        assert_eq!(headers["access-control-allow-headers"], ALLOW_HEADERS);
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let api = HttpPlacesApi::new(&ApiSettings {
            base_url: Url::parse("http://api.local/v1/").unwrap(),
            server_url: "http://api.local/v1/".into(),
            client_url: None,
        })
        .unwrap();

        assert_eq!(api.url("place"), "http://api.local/v1/place");
        assert_eq!(api.url("/weather"), "http://api.local/v1/weather");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(250);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }
}
