#![allow(clippy::print_stdout, reason = "Examples are okay to print to stdout")]

use std::env;

use sumsub_client_sdk::api::{
    Client, Config, CreateApplicantRequest, DocSet, DocumentType, IdDocMetadata, RequiredIdDocs,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Creates an applicant, uploads a passport scan and prints the resulting state.
///
/// Reads `SUMSUB_APP_TOKEN`, `SUMSUB_SECRET_KEY` and `SUMSUB_BASE_URL`, and takes the
/// external user id and a file path as arguments.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let user_id = args.next().unwrap_or_else(|| "demo-user".to_owned());
    let passport = args.next().unwrap_or_else(|| "passport.jpg".to_owned());

    let client = Client::new(Config::from_env()?)?;

    let request = CreateApplicantRequest::builder()
        .external_user_id(user_id.clone())
        .required_id_docs(
            RequiredIdDocs::builder()
                .doc_sets(vec![
                    DocSet::builder()
                        .id_doc_set_type("IDENTITY")
                        .types(vec![DocumentType::Passport])
                        .build(),
                ])
                .build(),
        )
        .build();
    let applicant_id = client.create_applicant(&request).await?;
    info!(%applicant_id, "created applicant");

    let metadata = IdDocMetadata::new(DocumentType::Passport, "GBR");
    let image_id = client.add_document(&applicant_id, &metadata, &passport).await?;
    info!(%image_id, "uploaded document");

    for doc in client.get_applicant_status(&applicant_id).await? {
        let id_doc_type = doc.id_doc_type.as_deref().unwrap_or("-");
        println!("{id_doc_type}: {} image(s)", doc.image_ids.len());
    }

    let token = client.get_access_token(&user_id).await?;
    println!("sdk access token: {token}");

    let applicant = client.get_applicant_data_by_user_id(&user_id).await?;
    println!("{}", serde_json::to_string_pretty(&applicant)?);

    Ok(())
}
