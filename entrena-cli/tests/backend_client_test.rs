mod common;

use anyhow::Result;
use entrena_cli::api::{is_not_found, ApiError, BackendClient, Query};
use entrena_cli::config::Config;
use entrena_cli::models::{Routine, UserProfile};
use mockito::Matcher;
use serde_json::json;
use tempfile::tempdir;

use common::*;

#[tokio::test]
async fn test_login_stores_session() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let dir = tempdir()?;
    let path = dir.path().join("config.toml");

    let token = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", ANON_KEY)
        .match_body(Matcher::PartialJson(json!({"email": "coach@example.com"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "new-access",
                "refresh_token": "new-refresh",
                "user": {"id": TRAINER_ID, "email": "coach@example.com"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = Config::default().with_path(&path);
    config.backend.url = server.url();
    config.backend.anon_key = ANON_KEY.to_string();

    let client = BackendClient::new(config)?;
    assert!(!client.is_authenticated());

    let session = client.login("coach@example.com", "secreto").await?;
    assert_eq!(session.user.id, TRAINER_ID);
    assert!(client.is_authenticated());
    assert_eq!(client.current_user_id()?, TRAINER_ID);

    let saved = Config::load(Some(path.as_path()))?;
    assert_eq!(saved.auth.access_token, "new-access");
    assert_eq!(saved.auth.user_id, TRAINER_ID);

    token.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_login_with_bad_credentials() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let mut config = Config::default();
    config.backend.url = server.url();
    let client = BackendClient::new(config)?;

    let err = client.login("coach@example.com", "mal").await.unwrap_err();
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::AuthenticationFailed(msg)) => {
            assert_eq!(msg, "Invalid login credentials")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_select_sends_filters_and_headers() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/rutinas")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("entrenador_id".into(), "eq.t1".into()),
            Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .match_header("apikey", ANON_KEY)
        .match_header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str())
        .with_status(200)
        .with_body(json!([routine_json("r1", TRAINER_ID)]).to_string())
        .create_async()
        .await;

    let client = client_for(&server.url(), TRAINER_ID);
    let query = Query::table("rutinas")
        .select("*")
        .eq("entrenador_id", TRAINER_ID)
        .order_desc("created_at");
    let rows: Vec<Routine> = client.select(&query).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "r1");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_single_row_not_found() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/usuarios")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.nadie".into()))
        .match_header("accept", "application/vnd.pgrst.object+json")
        .with_status(406)
        .with_body(no_rows_body())
        .create_async()
        .await;

    let client = client_for(&server.url(), TRAINER_ID);
    let query = Query::table("usuarios").select("*").eq("id", "nadie");
    let err = client
        .select_single::<UserProfile>(&query)
        .await
        .unwrap_err();

    assert!(is_not_found(&err));
    Ok(())
}

#[tokio::test]
async fn test_empty_in_list_skips_request() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/rutinas")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url(), TRAINER_ID);
    let query = Query::table("rutinas").in_list("id", Vec::<String>::new());
    let rows: Vec<Routine> = client.select(&query).await?;

    assert!(rows.is_empty());
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_unfiltered_delete_is_refused() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/rest/v1/plan_rutina")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url(), TRAINER_ID);
    assert!(client.delete(&Query::table("plan_rutina")).await.is_err());

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() -> Result<()> {
    let mut server = mockito::Server::new_async().await;

    let expired = server
        .mock("GET", "/rest/v1/rutinas")
        .match_query(Matcher::Any)
        .match_header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str())
        .with_status(401)
        .with_body(r#"{"message":"JWT expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
        .match_body(Matcher::PartialJson(json!({"refresh_token": "refresh-token"})))
        .with_status(200)
        .with_body(
            json!({
                "access_token": "fresh-token",
                "refresh_token": "fresh-refresh",
                "user": {"id": TRAINER_ID}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let fresh = server
        .mock("GET", "/rest/v1/rutinas")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), TRAINER_ID);
    let rows: Vec<Routine> = client
        .select(&Query::table("rutinas").select("*"))
        .await?;
    assert!(rows.is_empty());

    expired.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_requests_require_session() -> Result<()> {
    let client = BackendClient::new(Config::default())?;
    let err = client
        .select::<Routine>(&Query::table("rutinas").select("*"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Not logged in");
    Ok(())
}

#[test]
fn test_api_error_from_status() {
    use reqwest::StatusCode;

    let error = ApiError::from_status(StatusCode::UNAUTHORIZED, "Unauthorized".to_string());
    assert!(matches!(error, ApiError::Unauthorized(_)));

    let error = ApiError::from_status(StatusCode::NOT_FOUND, "Not Found".to_string());
    assert!(matches!(error, ApiError::NotFound(_)));

    let error = ApiError::from_status(StatusCode::CONFLICT, "duplicate key".to_string());
    assert!(matches!(error, ApiError::BadRequest(_)));

    let error = ApiError::from_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server Error".to_string(),
    );
    assert!(matches!(error, ApiError::ServerError(_)));
}
