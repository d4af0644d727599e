//! Request signing.
//!
//! Every call carries three headers: the static application token, the
//! request timestamp, and a hex HMAC-SHA256 over
//! `timestamp ++ METHOD ++ path ++ body` keyed with the secret key.

use hmac::{Hmac, Mac as _};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, Request};
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha256;

use crate::error::Error;
use crate::{Result, Timestamp};

pub const APP_TOKEN: &str = "X-App-Token";
pub const APP_ACCESS_SIG: &str = "X-App-Access-Sig";
pub const APP_ACCESS_TS: &str = "X-App-Access-Ts";

type HmacSha256 = Hmac<Sha256>;

/// Application token and secret key issued by the dashboard.
///
/// Both values are kept as [`SecretString`] so they are redacted in `Debug` output.
#[derive(Clone, Debug)]
pub struct Credentials {
    app_token: SecretString,
    secret_key: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(app_token: SecretString, secret_key: SecretString) -> Self {
        Self {
            app_token,
            secret_key,
        }
    }

    #[must_use]
    pub fn app_token(&self) -> &SecretString {
        &self.app_token
    }

    #[must_use]
    pub fn secret_key(&self) -> &SecretString {
        &self.secret_key
    }
}

/// Computes the lower-case hex signature for one request.
///
/// `path` is the request path including its query string, exactly as sent.
/// The method is upper-cased before signing.
pub fn sign(
    secret: &SecretString,
    timestamp: Timestamp,
    method: &str,
    path: &str,
    body: &[u8],
) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(method.to_ascii_uppercase().as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds the authentication headers for an already-built request.
///
/// The body must be fully buffered: the signature is taken over the bytes
/// `request` will put on the wire, so streaming bodies are rejected.
pub(crate) fn create_headers(
    credentials: &Credentials,
    request: &Request,
    path: &str,
    timestamp: Timestamp,
) -> Result<HeaderMap> {
    let body = match request.body() {
        None => &[][..],
        Some(body) => body
            .as_bytes()
            .ok_or_else(|| Error::validation("request body must be buffered before signing"))?,
    };
    let signature = sign(
        &credentials.secret_key,
        timestamp,
        request.method().as_str(),
        path,
        body,
    )?;

    let mut map = HeaderMap::new();
    let mut token = HeaderValue::from_str(credentials.app_token.expose_secret())?;
    token.set_sensitive(true);
    map.insert(APP_TOKEN, token);
    map.insert(APP_ACCESS_SIG, HeaderValue::from_str(&signature)?);
    map.insert(APP_ACCESS_TS, HeaderValue::from(timestamp));

    Ok(map)
}

/// Returns `true` for the methods this API is called with.
pub(crate) fn is_supported_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::POST
}
