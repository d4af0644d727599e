use std::path::Path;

use futures::stream::{self, BoxStream, StreamExt as _, TryStreamExt as _};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Request, RequestBuilder, Response as HttpResponse};
use serde::de::DeserializeOwned;
use url::Url;
use url::form_urlencoded;

use crate::Result;
use crate::api::Config;
use crate::api::multipart::Form;
use crate::api::policy::TimePolicy;
use crate::api::types::{
    AccessToken, ApplicantData, CreateApplicantRequest, CreatedApplicant, DocImage, DocImages,
    DocumentImage, IdDocMetadata, RequiredIdDocStatus,
};
use crate::auth::{self, Credentials};
use crate::error::Error;

const IMAGE_ID_HEADER: &str = "X-Image-Id";
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw response body delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// Signed client for the applicant, document and inspection endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    credentials: Credentials,
    time: TimePolicy,
    client: ReqwestClient,
}

impl Client {
    /// Creates a client with its own HTTP connection pool.
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(config, builder.build()?))
    }

    /// Creates a client on top of a caller-provided HTTP client.
    #[must_use]
    pub fn with_client(config: Config, client: ReqwestClient) -> Self {
        Self {
            base_url: config.base_url,
            credentials: config.credentials,
            time: config.time,
            client,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Signs and sends a request to `base_url + path`.
    ///
    /// `path` must already contain its query string. An empty `body` sends no body.
    /// The signature covers the path as it goes on the wire, after URL encoding.
    /// Non-2xx responses are returned as [`crate::error::Kind::Status`] errors.
    pub async fn sign_and_send(
        &self,
        method: Method,
        path: &str,
        body: Vec<u8>,
    ) -> Result<HttpResponse> {
        let mut builder = self.request_builder(method, path)?;
        if !body.is_empty() {
            builder = builder.body(body);
        }

        self.dispatch(builder.build()?).await
    }

    /// Creates an applicant and returns its id.
    pub async fn create_applicant(&self, request: &CreateApplicantRequest) -> Result<String> {
        let path = "/resources/applicants";
        let request = self
            .request_builder(Method::POST, path)?
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(serde_json::to_vec(request)?)
            .build()?;

        let created: CreatedApplicant = self.dispatch_json(request).await?;
        Ok(created.id)
    }

    /// Uploads a local file as an identity document and returns the image id.
    pub async fn add_document<P: AsRef<Path>>(
        &self,
        applicant_id: &str,
        metadata: &IdDocMetadata,
        file: P,
    ) -> Result<String> {
        let file = file.as_ref();
        let bytes = tokio::fs::read(file).await?;
        let filename = file
            .file_name()
            .map_or_else(|| "content".into(), |name| name.to_string_lossy());

        self.add_document_bytes(applicant_id, metadata, &filename, &bytes)
            .await
    }

    /// Uploads in-memory document bytes and returns the image id.
    pub async fn add_document_bytes(
        &self,
        applicant_id: &str,
        metadata: &IdDocMetadata,
        filename: &str,
        content: &[u8],
    ) -> Result<String> {
        let path = format!("/resources/applicants/{applicant_id}/info/idDoc");
        let request = self.upload_request(&path, metadata, filename, content)?;

        let response = self.dispatch(request).await?;
        let image_id = response
            .headers()
            .get(IMAGE_ID_HEADER)
            .ok_or_else(|| Error::validation(format!("response is missing {IMAGE_ID_HEADER}")))?
            .to_str()
            .map_err(|e| Error::validation(format!("invalid {IMAGE_ID_HEADER} header: {e}")))?;

        Ok(image_id.to_owned())
    }

    /// Returns the status of every required document, as listed by the API.
    pub async fn get_applicant_status(
        &self,
        applicant_id: &str,
    ) -> Result<Vec<RequiredIdDocStatus>> {
        let path = format!("/resources/applicants/{applicant_id}/requiredIdDocsStatus");
        self.get_json(&path).await
    }

    /// Returns the SDK-facing status body unparsed.
    pub async fn get_applicant_status_sdk(&self, applicant_id: &str) -> Result<ByteStream> {
        let path = format!("/resources/applicants/{applicant_id}/status");
        let request = self.request_builder(Method::GET, &path)?.build()?;
        let response = self.dispatch(request).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(Error::from))
            .boxed())
    }

    /// Issues an SDK access token for the given external user id.
    pub async fn get_access_token(&self, user_id: &str) -> Result<String> {
        let user_id: String = form_urlencoded::byte_serialize(user_id.as_bytes()).collect();
        let path = format!("/resources/accessTokens?userId={user_id}");
        let request = self.request_builder(Method::POST, &path)?.build()?;

        let token: AccessToken = self.dispatch_json(request).await?;
        Ok(token.token)
    }

    pub async fn get_applicant_data_by_applicant_id(
        &self,
        applicant_id: &str,
    ) -> Result<ApplicantData> {
        let path = format!("/resources/applicants/{applicant_id}/one");
        self.get_json(&path).await
    }

    pub async fn get_applicant_data_by_user_id(&self, user_id: &str) -> Result<ApplicantData> {
        let path = format!("/resources/applicants/-;externalUserId={user_id}/one");
        self.get_json(&path).await
    }

    /// Downloads one document image of an inspection.
    pub async fn get_document_image(
        &self,
        inspection_id: &str,
        image_id: &str,
    ) -> Result<DocumentImage> {
        let path = format!("/resources/inspections/{inspection_id}/resources/{image_id}");
        let request = self.request_builder(Method::GET, &path)?.build()?;
        let response = self.dispatch(request).await?;

        let mime_type = mime_type(response.headers());
        let content = response.bytes().await?.to_vec();

        Ok(DocumentImage { content, mime_type })
    }

    /// Downloads every image listed in the applicant's document status.
    ///
    /// Images are fetched one at a time, in status-list order. The first failed
    /// download fails the whole call and nothing collected so far is returned.
    pub async fn get_applicant_doc_images(
        &self,
        applicant_id: &str,
        inspection_id: &str,
    ) -> Result<DocImages> {
        let statuses = self.get_applicant_status(applicant_id).await?;

        let mut images = DocImages::new();
        for doc in &statuses {
            for image_id in &doc.image_ids {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    %image_id,
                    id_doc_type = ?doc.id_doc_type,
                    "fetching document image"
                );

                let image = self.get_document_image(inspection_id, image_id).await?;
                images.insert(
                    image_id.clone(),
                    DocImage {
                        id_doc_type: doc.id_doc_type.clone(),
                        image,
                    },
                );
            }
        }

        Ok(images)
    }

    /// Like [`Client::get_applicant_doc_images`], with up to `limit` downloads in flight.
    ///
    /// Outstanding downloads are dropped as soon as one fails.
    pub async fn get_applicant_doc_images_concurrent(
        &self,
        applicant_id: &str,
        inspection_id: &str,
        limit: usize,
    ) -> Result<DocImages> {
        if limit == 0 {
            return Err(Error::validation("concurrency limit must be at least 1"));
        }

        let statuses = self.get_applicant_status(applicant_id).await?;
        let downloads = statuses.iter().flat_map(move |doc| {
            doc.image_ids.iter().map(move |image_id| async move {
                let image = self.get_document_image(inspection_id, image_id).await?;
                Ok::<_, Error>((
                    image_id.clone(),
                    DocImage {
                        id_doc_type: doc.id_doc_type.clone(),
                        image,
                    },
                ))
            })
        });

        stream::iter(downloads).buffered(limit).try_collect().await
    }

    fn upload_request(
        &self,
        path: &str,
        metadata: &IdDocMetadata,
        filename: &str,
        content: &[u8],
    ) -> Result<Request> {
        let form = Form::new()
            .text("metadata", &serde_json::to_string(metadata)?)
            .file("content", filename, UPLOAD_CONTENT_TYPE, content);

        Ok(self
            .request_builder(Method::POST, path)?
            .header(CONTENT_TYPE, HeaderValue::from_str(&form.content_type())?)
            .body(form.finish())
            .build()?)
    }

    fn request_builder(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        if !auth::is_supported_method(&method) {
            return Err(Error::validation(format!("unsupported method {method}")));
        }

        Ok(self.client.request(method, self.endpoint(path)?))
    }

    /// Joins by concatenation so a base URL path prefix is kept.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Path and query of `url` relative to the base URL, in encoded form.
    fn signed_path(&self, url: &Url) -> String {
        let prefix = self.base_url.path().trim_end_matches('/');
        let path = url.path().strip_prefix(prefix).unwrap_or(url.path());

        match url.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_owned(),
        }
    }

    fn sign_request(&self, request: &Request) -> Result<HeaderMap> {
        let path = self.signed_path(request.url());
        auth::create_headers(&self.credentials, request, &path, self.time.resolve())
    }

    async fn dispatch(&self, request: Request) -> Result<HttpResponse> {
        let headers = self.sign_request(&request)?;
        crate::execute(&self.client, request, Some(headers)).await
    }

    async fn dispatch_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let headers = self.sign_request(&request)?;
        crate::request::<T>(&self.client, request, Some(headers)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request_builder(Method::GET, path)?.build()?;
        self.dispatch_json(request).await
    }
}

/// `Content-Type` of a response, with non-UTF-8 bytes replaced rather than dropped.
fn mime_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
