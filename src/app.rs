use crate::config::Config;
use crate::email_content::fetch_and_decode;
use crate::error::Result;
use crate::export::export;
use crate::gmail_api::{obtain_credential, FileCredentialStore, GmailClient, MailApi, RealOAuthFlow};
use crate::query::build_query;
use std::path::PathBuf;
use tracing::{error, info};

/// Authenticates, then exports every inbox message matching the configured
/// filters. Returns the paths of the written files.
pub async fn run(config: &Config) -> Result<Vec<PathBuf>> {
    let query = build_query(&config.filter);
    info!(query = %query, "built search query");

    let client = reqwest::Client::new();
    let store = FileCredentialStore::new(&config.token_cache_path);
    let flow = RealOAuthFlow::new(&config.client_secret_path, client.clone());
    let credential = obtain_credential(&store, &flow).await?;

    let api = GmailClient::new(client, credential.access_token);
    export_matching_messages(&api, &query, config).await
}

/// Lists messages for `query` and exports them one by one. The first failure
/// stops the run; files written before it stay on disk.
pub async fn export_matching_messages<A: MailApi + ?Sized>(
    api: &A,
    query: &str,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    let refs = api.list_messages(query).await?;
    info!(count = refs.len(), "found matching messages");

    let mut exported = Vec::with_capacity(refs.len());
    for id in refs.iter().filter_map(|r| r.id.as_deref()) {
        let content = fetch_and_decode(api, id, config.format).await.map_err(|e| {
            error!(id, error = %e, "failed to fetch message");
            e
        })?;

        let path = export(
            &content.subject,
            &content.body,
            config.format,
            config.output_dir.as_deref(),
        )
        .map_err(|e| {
            error!(id, subject = %content.subject, error = %e, "failed to export message");
            e
        })?;

        info!(id, path = %path.display(), "exported message");
        exported.push(path);
    }

    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gmail_api::MockMailApi;
    use crate::query::FilterSpec;
    use crate::types::{BodyFormat, Header, Message, MessagePart, MessagePartBody, MessageRef};
    use base64::engine::general_purpose::URL_SAFE;
    use base64::engine::Engine;
    use std::path::Path;

    fn config(output_dir: &Path, format: BodyFormat) -> Config {
        Config {
            filter: FilterSpec::default(),
            format,
            output_dir: Some(output_dir.to_path_buf()),
            client_secret_path: PathBuf::from("credentials.json"),
            token_cache_path: PathBuf::from("token.json"),
        }
    }

    fn plain_message(id: &str, subject: &str, body: &str) -> Message {
        Message {
            id: Some(id.to_string()),
            payload: Some(MessagePart {
                mime_type: Some("text/plain".to_string()),
                headers: Some(vec![Header {
                    name: Some("Subject".to_string()),
                    value: Some(subject.to_string()),
                }]),
                body: Some(MessagePartBody {
                    data: Some(URL_SAFE.encode(body)),
                }),
                parts: None,
            }),
        }
    }

    fn refs(ids: &[&str]) -> Vec<MessageRef> {
        ids.iter()
            .map(|id| MessageRef {
                id: Some(id.to_string()),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_exports_each_listed_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockMailApi::new();
        api.expect_list_messages()
            .withf(|q| q == "from:a@b.com ")
            .times(1)
            .returning(|_| Ok(refs(&["m1", "m2"])));
        api.expect_get_message().times(2).returning(|id| match id {
            "m1" => Ok(plain_message("m1", "First one", "body one")),
            _ => Ok(plain_message("m2", "Second", "body two")),
        });

        let exported = export_matching_messages(
            &api,
            "from:a@b.com ",
            &config(dir.path(), BodyFormat::Plain),
        )
        .await
        .unwrap();

        assert_eq!(
            exported,
            vec![
                dir.path().join("First_one").join("First_one.txt"),
                dir.path().join("Second").join("Second.txt"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(&exported[0]).unwrap(),
            "First_onebody one"
        );
    }

    #[tokio::test]
    async fn test_no_matches_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockMailApi::new();
        api.expect_list_messages().returning(|_| Ok(Vec::new()));
        api.expect_get_message().never();

        let exported = export_matching_messages(&api, "", &config(dir.path(), BodyFormat::Plain))
            .await
            .unwrap();
        assert!(exported.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_subject_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockMailApi::new();
        api.expect_list_messages()
            .returning(|_| Ok(refs(&["m1", "m2", "m3"])));
        api.expect_get_message()
            .withf(|id| id == "m1" || id == "m2")
            .times(2)
            .returning(|id| Ok(plain_message(id, "Same subject", id)));

        let err = export_matching_messages(&api, "", &config(dir.path(), BodyFormat::Plain))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DirectoryExists(_)));
        let kept = dir.path().join("Same_subject").join("Same_subject.txt");
        assert_eq!(std::fs::read_to_string(kept).unwrap(), "Same_subjectm1");
    }

    #[tokio::test]
    async fn test_list_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = MockMailApi::new();
        api.expect_list_messages().returning(|_| {
            Err(Error::Api {
                status: reqwest::StatusCode::FORBIDDEN,
                body: "insufficient scope".to_string(),
            })
        });
        api.expect_get_message().never();

        let result =
            export_matching_messages(&api, "", &config(dir.path(), BodyFormat::Html)).await;
        assert!(matches!(result, Err(Error::Api { .. })));
    }
}
