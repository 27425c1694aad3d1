use super::constants::{RETRY_AFTER_HEADER, STATES_ENDPOINT};
use super::states::parse_states_body;
use crate::config::OpenSkyConfig;
use crate::fetcher::error::FetchError;
use crate::fetcher::{FetchOutcome, FlightSource};
use crate::types::BoundingBox;

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Blocking client for the OpenSky `/states/all` endpoint.
pub struct OpenSkyClient {
    http_client: reqwest::blocking::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl OpenSkyClient {
    pub fn new(config: &OpenSkyConfig) -> Result<Self, FetchError> {
        let http_client = Self::client_builder(config).build()?;
        Ok(Self::with_http_client(http_client, config))
    }

    fn client_builder(config: &OpenSkyConfig) -> reqwest::blocking::ClientBuilder {
        reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("skyboard/", env!("CARGO_PKG_VERSION")))
    }

    fn with_http_client(http_client: reqwest::blocking::Client, config: &OpenSkyConfig) -> Self {
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None) => None,
            _ => {
                log::warn!("OpenSky username and password must both be set; querying anonymously.");
                None
            }
        };

        OpenSkyClient {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn states_url(&self) -> String {
        format!("{0}{STATES_ENDPOINT}", self.base_url)
    }
}

impl FlightSource for OpenSkyClient {
    fn fetch(&mut self, bounding_box: &BoundingBox) -> FetchOutcome {
        let mut request = self.http_client.get(self.states_url()).query(&[
            ("lamin", bounding_box.lat_min),
            ("lomin", bounding_box.lon_min),
            ("lamax", bounding_box.lat_max),
            ("lomax", bounding_box.lon_max),
        ]);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send()?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                retry_after: retry_after_from_headers(response.headers()),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        Ok(parse_states_body(&body)?.within(bounding_box))
    }
}

fn retry_after_from_headers(
    headers: &reqwest::header::HeaderMap,
) -> Option<std::time::Duration> {
    headers
        .get(RETRY_AFTER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(std::time::Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::OpenSkyClient;
    use crate::config::OpenSkyConfig;
    use crate::fetcher::error::FetchError;
    use crate::fetcher::FlightSource;
    use crate::types::BoundingBox;
    use std::io::{BufRead, Write};

    /// Serves one canned HTTP response and hands back the request line and
    /// headers it saw.
    fn serve_once(response: String) -> (String, std::thread::JoinHandle<String>) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let address = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept test connection");
            let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());
            let mut request_head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                request_head.push_str(&line);
            }
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request_head
        });
        (format!("http://{address}"), handle)
    }

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {0}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
            body.len()
        )
    }

    fn client_for(base_url: String) -> OpenSkyClient {
        client_with_credentials(base_url, None, None)
    }

    // Local test servers must not be routed through a proxy from the environment
    fn client_with_credentials(
        base_url: String,
        username: Option<&str>,
        password: Option<&str>,
    ) -> OpenSkyClient {
        let config = OpenSkyConfig {
            base_url,
            timeout_seconds: 5,
            username: username.map(String::from),
            password: password.map(String::from),
        };
        let http_client = OpenSkyClient::client_builder(&config)
            .no_proxy()
            .build()
            .expect("client builds");
        OpenSkyClient::with_http_client(http_client, &config)
    }

    fn london() -> BoundingBox {
        BoundingBox::new(51.2868, 51.6918, -0.5103, 0.334).unwrap()
    }

    #[test]
    fn when_server_returns_states_then_snapshot_is_built_and_box_is_queried() {
        let body = r#"{"time": 1700000000, "states": [["4ca2d1", "BAW123", "UK", 0, 0, -0.45, 51.47, 3048.0, false, 128.6, 270.0]]}"#;
        let (base_url, handle) = serve_once(http_response("200 OK", "", body));
        let mut client = client_for(base_url);

        let snapshot = client.fetch(&london()).expect("fetch succeeds");
        let request_head = handle.join().unwrap();
        let request_line = request_head.lines().next().unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].callsign, "BAW123");
        assert!(request_line.starts_with("GET /states/all?"));
        assert!(request_line.contains("lamin=51.2868"));
        assert!(request_line.contains("lomin=-0.5103"));
        assert!(request_line.contains("lamax=51.6918"));
        assert!(request_line.contains("lomax=0.334"));
    }

    const EMPTY_STATES: &str = r#"{"time": 1700000000, "states": null}"#;

    // Sends one request with the given credentials and returns the lowercased request head
    fn request_head_with(username: Option<&str>, password: Option<&str>) -> String {
        let (base_url, handle) = serve_once(http_response("200 OK", "", EMPTY_STATES));
        let mut client = client_with_credentials(base_url, username, password);

        client.fetch(&london()).expect("fetch succeeds");
        handle.join().unwrap().to_lowercase()
    }

    #[test]
    fn when_username_and_password_are_set_then_basic_auth_is_sent() {
        let head = request_head_with(Some("pi"), Some("secret"));
        // base64 of "pi:secret"
        assert!(head.contains("authorization: basic cgk6c2vjcmv0"));
    }

    #[test]
    fn when_no_credentials_are_set_then_no_auth_header_is_sent() {
        let head = request_head_with(None, None);
        assert!(!head.contains("authorization:"));
    }

    #[test]
    fn when_only_one_credential_is_set_then_query_is_anonymous() {
        assert!(!request_head_with(Some("pi"), None).contains("authorization:"));
        assert!(!request_head_with(None, Some("secret")).contains("authorization:"));
    }

    #[test]
    fn when_server_rate_limits_then_retry_after_is_reported() {
        let (base_url, handle) = serve_once(http_response(
            "429 Too Many Requests",
            "X-Rate-Limit-Retry-After-Seconds: 120\r\n",
            "",
        ));
        let mut client = client_for(base_url);

        let result = client.fetch(&london());
        handle.join().unwrap();

        match result {
            Err(FetchError::RateLimited { retry_after }) => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(120)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn when_server_errors_then_status_is_reported() {
        let (base_url, handle) = serve_once(http_response("503 Service Unavailable", "", ""));
        let mut client = client_for(base_url);

        let result = client.fetch(&london());
        handle.join().unwrap();

        assert!(matches!(result, Err(FetchError::Status(503))));
    }

    #[test]
    fn when_nothing_is_listening_then_network_error_is_reported() {
        // Bind then drop to get a port that refuses connections
        let address = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let mut client = client_for(format!("http://{address}"));

        let result = client.fetch(&london());

        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
