use std::collections::BTreeMap;
use std::fmt;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DefaultOnNull, serde_as};
use strum_macros::Display;

/// Document kinds accepted by the verification service.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    IdCard,
    Passport,
    Drivers,
    BankCard,
    UtilityBill,
    BankStatement,
    Selfie,
    VideoSelfie,
    ProfileImage,
    IdDocPhoto,
    Agreement,
    Contract,
    ResidencePermit,
    EmploymentCertificate,
    DriversTranslation,
    InvestorDoc,
    VehicleRegistrationCertificate,
    IncomeSource,
    PaymentMethod,
    Other,
}

/// One document set an applicant is asked to provide.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSet {
    #[builder(into)]
    pub id_doc_set_type: String,
    #[builder(default)]
    pub types: Vec<DocumentType>,
}

#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredIdDocs {
    #[builder(default)]
    pub doc_sets: Vec<DocSet>,
}

/// Body of `POST /resources/applicants`.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantRequest {
    #[builder(into)]
    pub external_user_id: String,
    #[builder(default)]
    pub required_id_docs: RequiredIdDocs,
    #[builder(into, default = String::from("en"))]
    pub lang: String,
}

/// `metadata` part of a document upload.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdDocMetadata {
    pub id_doc_type: DocumentType,
    pub country: String,
}

impl IdDocMetadata {
    /// `country` is an ISO 3166-1 alpha-3 code such as `GBR`.
    #[must_use]
    pub fn new<S: Into<String>>(id_doc_type: DocumentType, country: S) -> Self {
        Self {
            id_doc_type,
            country: country.into(),
        }
    }
}

/// One entry of the required-documents status list.
///
/// Keys other than `idDocType` and `imageIds` are kept verbatim in `extra`.
/// A missing or `null` `imageIds` reads as an empty list.
#[serde_as]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredIdDocStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_doc_type: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub image_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Applicant record, returned untransformed.
pub type ApplicantData = Map<String, Value>;

/// Raw image bytes plus the `Content-Type` they were served with.
#[non_exhaustive]
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentImage {
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl fmt::Debug for DocumentImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentImage")
            .field("content", &format_args!("[{} bytes]", self.content.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// An image together with the document type it was uploaded as.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocImage {
    pub id_doc_type: Option<String>,
    pub image: DocumentImage,
}

/// Images keyed by image id.
pub type DocImages = BTreeMap<String, DocImage>;

#[derive(Deserialize)]
pub(crate) struct CreatedApplicant {
    pub id: String,
}

#[derive(Deserialize)]
pub(crate) struct AccessToken {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_type_names() {
        assert_eq!(DocumentType::IdCard.to_string(), "ID_CARD");
        assert_eq!(
            DocumentType::VehicleRegistrationCertificate.to_string(),
            "VEHICLE_REGISTRATION_CERTIFICATE"
        );
        assert_eq!(
            serde_json::from_value::<DocumentType>(json!("DRIVERS_TRANSLATION")).expect("parse"),
            DocumentType::DriversTranslation
        );
        assert!(serde_json::from_value::<DocumentType>(json!("passport")).is_err());
        assert_eq!(
            serde_json::to_value(DocumentType::Passport).expect("json"),
            json!("PASSPORT")
        );
    }

    #[test]
    fn create_applicant_body() {
        let request = CreateApplicantRequest::builder()
            .external_user_id("user-1")
            .required_id_docs(
                RequiredIdDocs::builder()
                    .doc_sets(vec![
                        DocSet::builder()
                            .id_doc_set_type("IDENTITY")
                            .types(vec![DocumentType::Passport, DocumentType::IdCard])
                            .build(),
                    ])
                    .build(),
            )
            .build();

        assert_eq!(
            serde_json::to_value(&request).expect("json"),
            json!({
                "externalUserId": "user-1",
                "requiredIdDocs": {
                    "docSets": [
                        {"idDocSetType": "IDENTITY", "types": ["PASSPORT", "ID_CARD"]}
                    ]
                },
                "lang": "en"
            })
        );
    }

    #[test]
    fn metadata_body() {
        let metadata = IdDocMetadata::new(DocumentType::Passport, "GBR");
        assert_eq!(
            serde_json::to_string(&metadata).expect("json"),
            r#"{"idDocType":"PASSPORT","country":"GBR"}"#
        );
    }

    #[test]
    fn status_keeps_unknown_keys() {
        let raw = json!([{
            "idDocType": "SELFIE",
            "imageIds": ["i1"],
            "country": "GBR",
            "reviewResult": {"reviewAnswer": "GREEN"}
        }]);

        let parsed: Vec<RequiredIdDocStatus> = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(parsed[0].id_doc_type.as_deref(), Some("SELFIE"));
        assert_eq!(parsed[0].image_ids, vec!["i1"]);
        assert_eq!(parsed[0].extra["country"], "GBR");
        assert_eq!(serde_json::to_value(&parsed).expect("json"), raw);
    }

    #[test]
    fn status_accepts_null_image_ids() {
        let parsed: Vec<RequiredIdDocStatus> =
            serde_json::from_value(json!([{"idDocType": "SELFIE", "imageIds": null}]))
                .expect("parse");

        assert_eq!(parsed[0].id_doc_type.as_deref(), Some("SELFIE"));
        assert!(parsed[0].image_ids.is_empty());
    }

    #[test]
    fn status_accepts_missing_doc_type() {
        let raw = json!([{"imageIds": ["i1"], "country": "GBR"}]);

        let parsed: Vec<RequiredIdDocStatus> = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(parsed[0].id_doc_type, None);
        assert_eq!(parsed[0].image_ids, vec!["i1"]);
        assert_eq!(serde_json::to_value(&parsed).expect("json"), raw);
    }

    #[test]
    fn image_debug_hides_bytes() {
        let image = DocumentImage {
            content: vec![0xFF; 3],
            mime_type: Some("image/jpeg".to_owned()),
        };
        assert_eq!(
            format!("{image:?}"),
            r#"DocumentImage { content: [3 bytes], mime_type: Some("image/jpeg") }"#
        );
    }
}
