mod common;

use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use basic_auth::BasicAuthClient;
use basic_auth::BasicUser;
use basic_auth::Encoding;
use basic_auth::HashPrimitive;
use basic_auth::PasswordPolicy;
use basic_auth::PasswordRecord;
use basic_auth::SigningConfig;
use basic_auth::TokenError;
use common::client;
use common::init_tracing;
use common::AppUser;
use common::AUDIENCE;
use common::ISSUER;
use jsonwebtoken::Algorithm;
use serde_json::json;

#[test]
fn test_sign_in_and_read_back_basic_user() {
    init_tracing();
    let client = client::<BasicUser>();

    let tokens = client
        .sign_in(&BasicUser::new("johndoe"))
        .expect("Failed to sign in");
    assert!(!tokens.access_token.is_empty());

    let user = client
        .user_from_token(&tokens.access_token)
        .expect("Failed to verify token");
    assert_eq!(user.username, "johndoe");
    assert_eq!(user.issuer(), Some(ISSUER));
    assert_eq!(user.audience(), [AUDIENCE.to_string()]);
}

#[test]
fn test_custom_identity_type_round_trip() {
    init_tracing();
    let client = client::<AppUser>();

    let mut identity = AppUser::new("alice", &["admin", "editor"]);
    identity.iss = Some("spoofed".to_string());
    identity.aud = Some("spoofed".to_string());

    let tokens = client.sign_in(&identity).expect("Failed to sign in");
    let user = client
        .user_from_token(&tokens.access_token)
        .expect("Failed to verify token");

    assert_eq!(user.username, "alice");
    assert_eq!(user.roles, vec!["admin".to_string(), "editor".to_string()]);
    assert_eq!(user.iss.as_deref(), Some(ISSUER));
    assert_eq!(user.aud.as_deref(), Some(AUDIENCE));
}

#[test]
fn test_token_from_other_client_is_rejected() {
    let issuer = client::<BasicUser>();
    let token = issuer.sign_in(&BasicUser::new("alice")).unwrap().access_token;

    let other_secret: BasicAuthClient<BasicUser> = BasicAuthClient::new(
        SigningConfig::hmac(Algorithm::HS256, "another-secret", ISSUER, AUDIENCE),
        common::reference_policy(),
    )
    .unwrap();
    assert_eq!(
        other_secret.user_from_token(&token).unwrap_err(),
        TokenError::SignatureInvalid
    );

    let other_algorithm: BasicAuthClient<BasicUser> = BasicAuthClient::new(
        SigningConfig::hmac(Algorithm::HS384, common::SECRET, ISSUER, AUDIENCE),
        common::reference_policy(),
    )
    .unwrap();
    assert!(matches!(
        other_algorithm.user_from_token(&token),
        Err(TokenError::UnsupportedAlgorithm { .. })
    ));
}

#[test]
fn test_tampered_payload_is_rejected() {
    let client = client::<BasicUser>();
    let token = client.sign_in(&BasicUser::new("alice")).unwrap().access_token;

    let forged = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&json!({ "username": "root", "iss": ISSUER, "aud": AUDIENCE })).unwrap(),
    );
    let mut segments: Vec<&str> = token.split('.').collect();
    segments[1] = &forged;

    let result = client.user_from_token(&segments.join("."));
    assert_eq!(result.unwrap_err(), TokenError::SignatureInvalid);
}

#[test]
fn test_reference_password_scenario() {
    init_tracing();
    let client = client::<BasicUser>();
    let password = "iwakpitik";

    let blob = client
        .hash_password_with_encoded_salt(password)
        .expect("Failed to hash password");
    let (hash, salt) = client.hash_password(password).expect("Failed to hash password");

    assert!(!blob.is_empty());
    assert!(!hash.is_empty());
    assert!(!salt.is_empty());

    assert!(client.verify_password_with_encoded_salt(&blob, password));
    assert!(client.verify_password(&hash, &salt, password));
}

#[test]
fn test_stored_record_survives_client_rebuild() {
    let policy = PasswordPolicy::new(1000, 32, 16, HashPrimitive::Sha512, Encoding::Base64).unwrap();
    let first: BasicAuthClient<BasicUser> =
        BasicAuthClient::new(common::signing_config(), policy).unwrap();
    let record = PasswordRecord::combined(first.hash_password_with_encoded_salt("pw").unwrap());
    drop(first);

    let second: BasicAuthClient<BasicUser> =
        BasicAuthClient::new(common::signing_config(), policy).unwrap();
    let tokens = second
        .authenticate("pw", &record, &BasicUser::new("carol"))
        .expect("Authentication failed");
    assert_eq!(tokens.access_token, tokens.refresh_token);
}

#[test]
fn test_concurrent_use_of_shared_client() {
    let client = Arc::new(client::<BasicUser>());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let username = format!("user{}", i);
                let tokens = client.sign_in(&BasicUser::new(&username)).unwrap();
                let user = client.user_from_token(&tokens.access_token).unwrap();
                assert_eq!(user.username, username);

                let (hash, salt) = client.hash_password(&username).unwrap();
                assert!(client.verify_password(&hash, &salt, &username));
                assert!(!client.verify_password(&hash, &salt, "someone else"));
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}
