//! Identity-verification REST endpoints.
//!
//! Every call is signed with the configured credentials and sent on its own;
//! nothing is cached or retried:
//! - applicants: create, fetch data, required-document status, SDK status
//! - documents: upload, download images of an inspection
//! - SDK access tokens

mod client;
mod config;
mod multipart;
mod policy;
mod types;

pub use client::{ByteStream, Client};
pub use config::{
    APP_TOKEN_VAR, BASE_URL_VAR, Config, RawConfig, SECRET_KEY_VAR, TIMEOUT_SECS_VAR,
};
pub use policy::TimePolicy;
pub use types::{
    ApplicantData, CreateApplicantRequest, DocImage, DocImages, DocSet, DocumentImage,
    DocumentType, IdDocMetadata, RequiredIdDocStatus, RequiredIdDocs,
};
