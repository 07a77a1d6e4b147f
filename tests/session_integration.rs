// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for login, the retry protocol, and the session cache.

mod common;

use common::{ACCESS_TOKEN, DEVICES_PATH, LOGIN_PATH, PASSWORD, USERNAME, config, login_response};
use reqwest::Method;
use serde_json::json;
use skybell_lib::cache::keys;
use skybell_lib::{AuthenticationError, Error, Session, Skybell};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Login
// ============================================================================

mod login {
    use super::*;

    #[tokio::test]
    async fn login_stores_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_partial_json(json!({
                "username": USERNAME,
                "password": PASSWORD
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        assert!(!session.is_authenticated());

        session.login(None, None).await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some(ACCESS_TOKEN));
    }

    #[tokio::test]
    async fn login_sends_cached_identifiers() {
        let server = MockServer::start().await;
        let session = Session::new(&config(&server)).unwrap();
        let snapshot = session.cache_snapshot();

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_partial_json(json!({
                "appId": snapshot.app_id(),
                "token": snapshot.token()
            })))
            .and(header("x-skybell-app-id", snapshot.app_id()))
            .and(header("x-skybell-client-id", snapshot.client_id()))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(1)
            .mount(&server)
            .await;

        session.login(None, None).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_login_is_authentication_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        let err = session.login(None, None).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::LoginFailed(_))
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn login_without_token_in_response_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "userid123"})))
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        let err = session.login(None, None).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::LoginFailed(_))
        ));
    }

    #[tokio::test]
    async fn missing_credentials_make_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(0)
            .mount(&server)
            .await;

        let config = skybell_lib::SkybellConfig::new()
            .with_base_url(format!("{}/api/v3/", server.uri()))
            .without_cache();
        let session = Session::new(&config).unwrap();

        let err = session.login(None, None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::MissingUsername)
        ));
    }

    #[tokio::test]
    async fn logout_clears_token_without_request() {
        let server = MockServer::start().await;
        common::mount_login(&server).await;

        let skybell = Skybell::new(config(&server)).unwrap();
        skybell.login(None, None).await.unwrap();
        assert!(skybell.session().is_authenticated());

        skybell.logout().unwrap();

        assert!(!skybell.session().is_authenticated());
        assert_eq!(skybell.session().cache(keys::ACCESS_TOKEN), Some(json!(null)));
    }
}

// ============================================================================
// Retry protocol
// ============================================================================

mod retry {
    use super::*;

    #[tokio::test]
    async fn implicit_login_before_first_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        let response = session.send_request(Method::GET, "devices/", None).await.unwrap();

        assert_eq!(response.json().unwrap(), json!([]));
    }

    #[tokio::test]
    async fn no_redundant_login_once_authenticated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        session.login(None, None).await.unwrap();

        session.send_request(Method::GET, "devices/", None).await.unwrap();
        session.send_request(Method::GET, "devices/", None).await.unwrap();
    }

    #[tokio::test]
    async fn failure_then_success_logs_in_once_more() {
        let server = MockServer::start().await;

        // Explicit login plus exactly one re-login
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        session.login(None, None).await.unwrap();

        let response = session.send_request(Method::GET, "devices/", None).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn failure_twice_is_request_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        session.login(None, None).await.unwrap();

        let err = session
            .send_request(Method::GET, "devices/", None)
            .await
            .unwrap_err();

        match err {
            Error::Request(request) => {
                assert_eq!(request.method, "GET");
                assert!(request.url.ends_with("/api/v3/devices/"));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_retry_when_disabled() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        session.login(None, None).await.unwrap();

        let err = session
            .send_request_with(
                Method::GET,
                "devices/",
                reqwest::header::HeaderMap::new(),
                None,
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Request(_)));
    }

    #[tokio::test]
    async fn failed_relogin_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEVICES_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config(&server)).unwrap();
        session.login(None, None).await.unwrap();

        let err = session
            .send_request(Method::GET, "devices/", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::LoginFailed(_))
        ));
        assert!(!session.is_authenticated());
    }
}

// ============================================================================
// Cache persistence
// ============================================================================

mod cache {
    use super::*;

    #[tokio::test]
    async fn identifiers_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("skybell_cache.json");
        let server = MockServer::start().await;
        common::mount_login(&server).await;

        let config = skybell_lib::SkybellConfig::new()
            .with_credentials(USERNAME, PASSWORD)
            .with_base_url(format!("{}/api/v3/", server.uri()))
            .with_cache_path(&cache_path);

        let first = Session::new(&config).unwrap();
        let before = first.cache_snapshot();
        first.login(None, None).await.unwrap();
        assert!(cache_path.exists());

        let second = Session::new(&config).unwrap();
        let after = second.cache_snapshot();

        assert_eq!(after.app_id(), before.app_id());
        assert_eq!(after.client_id(), before.client_id());
        assert_eq!(after.token(), before.token());
        assert_eq!(after.access_token(), Some(ACCESS_TOKEN));
    }

    #[tokio::test]
    async fn identifiers_survive_logout() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        let server = MockServer::start().await;
        common::mount_login(&server).await;

        let config = skybell_lib::SkybellConfig::new()
            .with_credentials(USERNAME, PASSWORD)
            .with_base_url(format!("{}/api/v3/", server.uri()))
            .with_cache_path(&cache_path);

        let session = Session::new(&config).unwrap();
        let app_id = session.cache_snapshot().app_id().to_string();
        session.login(None, None).await.unwrap();
        assert!(session.logout().unwrap());

        let reloaded = Session::new(&config).unwrap();
        assert!(!reloaded.is_authenticated());
        assert_eq!(reloaded.cache_snapshot().app_id(), app_id);
    }

    #[test]
    fn corrupt_cache_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        std::fs::write(&cache_path, "not json").unwrap();

        let config = skybell_lib::SkybellConfig::new().with_cache_path(&cache_path);
        let err = Session::new(&config).unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }
}
