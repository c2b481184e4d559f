//! HTTPS implementation of [`DataverseApi`] on top of reqwest.

use super::{DataverseApi, EntityIcons, WebResource};
use crate::error::{CliError, DeployError, Result};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Request;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

/// Web API root relative to the environment URL
pub const API_PATH: &str = "api/data/v9.2/";

const MERGE_LABELS_HEADER: &str = "MSCRM.MergeLabels";
const SOLUTION_HEADER: &str = "MSCRM.SolutionUniqueName";

/// Dataverse Web API client bound to one environment and one bearer token.
#[derive(Debug, Clone)]
pub struct DataverseClient {
    http: reqwest::Client,
    api_root: Url,
    collection: String,
    solution: Option<String>,
}

#[derive(Deserialize)]
struct ODataCollection<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct WebResourceId {
    webresourceid: Uuid,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    message: String,
}

impl DataverseClient {
    /// Creates a client for `environment_url` that writes web resources into
    /// the `collection` entity set.
    pub fn new(environment_url: &Url, token: &str, collection: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers(token)?)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_root: api_root(environment_url)?,
            collection: collection.into(),
            solution: None,
        })
    }

    /// Adds new and updated web resources to the named unmanaged solution.
    pub fn with_solution(mut self, solution: Option<String>) -> Self {
        self.solution = solution.filter(|s| !s.trim().is_empty());
        self
    }

    /// Web API root this client talks to
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn lookup_url(&self, name: &str) -> Result<Url> {
        let mut url = self.api_root.join(&self.collection)?;
        let filter = format!("name eq '{}'", odata_quote(name));
        url.set_query(Some(&format!(
            "$filter={}&$select=webresourceid",
            utf8_percent_encode(&filter, NON_ALPHANUMERIC)
        )));
        Ok(url)
    }

    fn record_url(&self, id: Uuid) -> Result<Url> {
        Ok(self.api_root.join(&format!("{}({})", self.collection, id))?)
    }

    fn entity_url(&self, logical_name: &str) -> Result<Url> {
        Ok(self.api_root.join(&format!(
            "EntityDefinitions(LogicalName='{}')",
            odata_quote(logical_name)
        ))?)
    }

    fn with_solution_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.solution {
            Some(solution) => request.header(SOLUTION_HEADER, solution.as_str()),
            None => request,
        }
    }

    fn lookup_request(&self, name: &str) -> Result<Request> {
        Ok(self.http.get(self.lookup_url(name)?).build()?)
    }

    fn create_request(&self, resource: &WebResource) -> Result<Request> {
        let url = self.api_root.join(&self.collection)?;
        Ok(self.with_solution_header(self.http.post(url).json(resource)).build()?)
    }

    fn update_request(&self, id: Uuid, resource: &WebResource) -> Result<Request> {
        let url = self.record_url(id)?;
        Ok(self.with_solution_header(self.http.patch(url).json(resource)).build()?)
    }

    fn entity_icons_request(&self, icons: &EntityIcons) -> Result<Request> {
        // Without MergeLabels the PUT drops every label translation not in the body.
        Ok(self
            .http
            .put(self.entity_url(&icons.entity_logical_name)?)
            .header(MERGE_LABELS_HEADER, "true")
            .json(&icons.payload())
            .build()?)
    }

    fn publish_request(&self) -> Result<Request> {
        Ok(self.http.post(self.api_root.join("PublishAllXml")?).build()?)
    }

    async fn send(&self, request: Request) -> Result<reqwest::Response> {
        log::debug!("{} {}", request.method(), request.url());
        check(self.http.execute(request).await?).await
    }
}

impl DataverseApi for DataverseClient {
    async fn find_web_resource(&self, name: &str) -> Result<Option<Uuid>> {
        let response = self.send(self.lookup_request(name)?).await?;
        let found: ODataCollection<WebResourceId> = response.json().await?;

        if found.value.len() > 1 {
            log::warn!(
                "{} web resources named '{}'; updating the first",
                found.value.len(),
                name
            );
        }
        Ok(found.value.first().map(|r| r.webresourceid))
    }

    async fn create_web_resource(&self, resource: &WebResource) -> Result<()> {
        log::debug!("Creating {}", resource.name);
        self.send(self.create_request(resource)?).await?;
        Ok(())
    }

    async fn update_web_resource(&self, id: Uuid, resource: &WebResource) -> Result<()> {
        log::debug!("Updating {} ({})", resource.name, id);
        self.send(self.update_request(id, resource)?).await?;
        Ok(())
    }

    async fn update_entity_icons(&self, icons: &EntityIcons) -> Result<()> {
        log::debug!("{} -> {}", icons.entity_logical_name, icons.web_resource_name);
        self.send(self.entity_icons_request(icons)?).await?;
        Ok(())
    }

    async fn publish_all(&self) -> Result<()> {
        self.send(self.publish_request()?).await?;
        Ok(())
    }
}

/// Bearer and OData headers sent with every Web API request
pub(crate) fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        CliError::InvalidArguments {
            reason: "access token contains characters not allowed in an HTTP header".to_string(),
        }
    })?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("odata-maxversion"),
        HeaderValue::from_static("4.0"),
    );
    headers.insert(
        HeaderName::from_static("odata-version"),
        HeaderValue::from_static("4.0"),
    );
    Ok(headers)
}

/// Web API root for an environment URL such as `https://org.crm.dynamics.com`.
///
/// Only the origin is used, so a URL copied from the browser
/// (`https://org.crm.dynamics.com/main.aspx?appid=...`) targets the same API.
pub(crate) fn api_root(environment_url: &Url) -> Result<Url> {
    let origin = environment_url.origin().ascii_serialization();
    Ok(Url::parse(&format!("{}/{}", origin, API_PATH))?)
}

/// Escapes a value for use inside a single-quoted OData string literal
pub(crate) fn odata_quote(value: &str) -> String {
    value.replace('\'', "''")
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeployError::Api {
        status: status.as_u16(),
        message: error_message(&body, status.canonical_reason().unwrap_or("request failed")),
    })
}

/// Extracts the message of a Dataverse error envelope, falling back to the raw body
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return if envelope.error.code.is_empty() {
            envelope.error.message
        } else {
            format!("{} ({})", envelope.error.message, envelope.error.code)
        };
    }

    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DataverseClient {
        let env = Url::parse("https://contoso.crm.dynamics.com/").unwrap();
        DataverseClient::new(&env, "token", "webresourceset").unwrap()
    }

    #[test]
    fn api_root_ignores_trailing_slash() {
        let with = api_root(&Url::parse("https://contoso.crm.dynamics.com/").unwrap()).unwrap();
        let without = api_root(&Url::parse("https://contoso.crm.dynamics.com").unwrap()).unwrap();

        assert_eq!(with.as_str(), "https://contoso.crm.dynamics.com/api/data/v9.2/");
        assert_eq!(with, without);
    }

    #[test]
    fn api_root_uses_origin_of_browser_url() {
        let url = Url::parse("https://contoso.crm.dynamics.com/main.aspx?appid=123").unwrap();
        let root = api_root(&url).unwrap();
        assert_eq!(root.as_str(), "https://contoso.crm.dynamics.com/api/data/v9.2/");

        let client = DataverseClient::new(&url, "token", "webresourceset").unwrap();
        let lookup = client.lookup_url("p_/a.svg").unwrap();
        assert_eq!(lookup.path(), "/api/data/v9.2/webresourceset");
        assert_eq!(
            format!("{}/.default", lookup.origin().ascii_serialization()),
            crate::auth::environment_scope(&url)
        );
    }

    #[test]
    fn lookup_filters_by_exact_name() {
        let url = client().lookup_url("p_/icons/o'brien.svg").unwrap();

        assert_eq!(url.path(), "/api/data/v9.2/webresourceset");
        let query = url.query().unwrap();
        assert!(query.starts_with("$filter=name%20eq%20%27p%5F%2Ficons%2Fo%27%27brien%2Esvg%27"));
        assert!(query.ends_with("&$select=webresourceid"));
    }

    #[test]
    fn record_and_entity_urls() {
        let client = client();
        let id = Uuid::parse_str("0b1a3c1e-2f4d-4e5f-8a9b-0c1d2e3f4a5b").unwrap();

        assert_eq!(
            client.record_url(id).unwrap().as_str(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/webresourceset(0b1a3c1e-2f4d-4e5f-8a9b-0c1d2e3f4a5b)"
        );
        assert_eq!(
            client.entity_url("account").unwrap().as_str(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/EntityDefinitions(LogicalName='account')"
        );
    }

    #[test]
    fn blank_solution_is_ignored() {
        let client = client().with_solution(Some("  ".to_string()));
        assert!(client.solution.is_none());
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let env = Url::parse("https://contoso.crm.dynamics.com").unwrap();
        let err = DataverseClient::new(&env, "bad\ntoken", "webresourceset").unwrap_err();
        assert!(matches!(err, DeployError::Cli(CliError::InvalidArguments { .. })));
    }

    #[test]
    fn error_message_prefers_envelope() {
        let body = r#"{"error":{"code":"0x80040237","message":"Duplicate name"}}"#;
        assert_eq!(error_message(body, "Bad Request"), "Duplicate name (0x80040237)");
        assert_eq!(error_message("  plain failure ", "Bad Request"), "plain failure");
        assert_eq!(error_message("", "Bad Request"), "Bad Request");
    }

    fn resource() -> WebResource {
        WebResource::svg("p_/icons/a.svg", "A", "", "PHN2Zy8+".to_string(), "1.0")
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn default_headers_carry_bearer_and_odata_versions() {
        let headers = default_headers("abc").unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers["odata-maxversion"], "4.0");
        assert_eq!(headers["odata-version"], "4.0");
    }

    #[test]
    fn entity_update_is_put_with_merge_labels() {
        let client = client().with_solution(Some("ContosoIcons".to_string()));
        let request = client
            .entity_icons_request(&EntityIcons::new("account", "p_/icons/a.svg"))
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::PUT);
        assert_eq!(
            request.url().as_str(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/EntityDefinitions(LogicalName='account')"
        );
        assert_eq!(header(&request, "mscrm.mergelabels"), Some("true"));
        assert_eq!(header(&request, "mscrm.solutionuniquename"), None);

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["IconVectorName"], "p_/icons/a.svg");
    }

    #[test]
    fn create_posts_and_update_patches_by_id() {
        let client = client();
        let id = Uuid::parse_str("0b1a3c1e-2f4d-4e5f-8a9b-0c1d2e3f4a5b").unwrap();

        let create = client.create_request(&resource()).unwrap();
        assert_eq!(create.method(), reqwest::Method::POST);
        assert_eq!(create.url().path(), "/api/data/v9.2/webresourceset");
        assert_eq!(header(&create, "content-type"), Some("application/json"));

        let update = client.update_request(id, &resource()).unwrap();
        assert_eq!(update.method(), reqwest::Method::PATCH);
        assert_eq!(update.url().as_str(), client.record_url(id).unwrap().as_str());
        assert_eq!(header(&update, "mscrm.mergelabels"), None);
    }

    #[test]
    fn solution_header_only_on_web_resource_writes() {
        let id = Uuid::parse_str("0b1a3c1e-2f4d-4e5f-8a9b-0c1d2e3f4a5b").unwrap();
        let without = client();
        let create = without.create_request(&resource()).unwrap();
        assert_eq!(header(&create, "mscrm.solutionuniquename"), None);

        let with = client().with_solution(Some("ContosoIcons".to_string()));
        for request in [
            with.create_request(&resource()).unwrap(),
            with.update_request(id, &resource()).unwrap(),
        ] {
            assert_eq!(header(&request, "mscrm.solutionuniquename"), Some("ContosoIcons"));
        }
        for request in [
            with.lookup_request("p_/icons/a.svg").unwrap(),
            with.publish_request().unwrap(),
        ] {
            assert_eq!(header(&request, "mscrm.solutionuniquename"), None);
        }
    }

    #[test]
    fn lookup_is_get_and_publish_is_post() {
        let client = client();

        let lookup = client.lookup_request("p_/icons/a.svg").unwrap();
        assert_eq!(lookup.method(), reqwest::Method::GET);
        assert!(lookup.body().is_none());

        let publish = client.publish_request().unwrap();
        assert_eq!(publish.method(), reqwest::Method::POST);
        assert_eq!(
            publish.url().as_str(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/PublishAllXml"
        );
    }
}
