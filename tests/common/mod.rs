#![allow(dead_code)]

use drinks_api::{
    AccessGuard, AppConfig, AppState, InMemoryRepository, StaticKeySource,
    models::{Ingredient, NewDrink},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, jwk::JwkSet};
use serde_json::{Value, json};
use std::{sync::Arc, time::SystemTime};

// --- Test Issuer ---

pub const TEST_KID: &str = "test-signing-key";
pub const TEST_AUDIENCE: &str = "drinks";
pub const TEST_ISSUER: &str = "https://coffee-shop.local.auth0.com/";

/// RSA private key whose public half is published in `test_key_set()`.
pub const ISSUER_KEY_PEM: &[u8] = include_bytes!("../fixtures/issuer_key.pem");
/// An unrelated RSA key, used to forge signatures.
pub const FOREIGN_KEY_PEM: &[u8] = include_bytes!("../fixtures/foreign_key.pem");

const ISSUER_KEY_MODULUS: &str = "1rT8_7ngVcqIyglztj5NSdXZiacCydJJWRklAs_EZA_zMb8y1LZnDUBk-F-QpgLDcTt67qaLBYtNb1UiVoc-AbaGgUIRp32rxO9Eu7IrE-T0h5mjntMjeZO7zoXmLlnchtsosCi3HgpS0D6AiT2Xv_3VOPlkdCmG7jI2J1ZtQQMA8NOxUVKs8zdsH8RSOsQjNIbIZ5iW2DUVYszeIgzgF0oL3Z9mt_UqQ4qcDjMzJvjI5NQFYz8L6YZEYndZbN8pZkV2b4_PUG-beporX0tIvLZ2ctENBGMZCnYy5bRHV8K3jc9aazpkfxgMVCk0xi2r275xjxCiZkCV16eqFW0efw";

pub fn test_key_set() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": TEST_KID,
            "n": ISSUER_KEY_MODULUS,
            "e": "AQAB"
        }]
    }))
    .expect("test key set must parse")
}

pub fn test_guard() -> AccessGuard {
    AccessGuard::new(
        Arc::new(StaticKeySource::new(test_key_set())),
        TEST_AUDIENCE,
        TEST_ISSUER,
    )
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Standard claims for a token issued by the test issuer, valid for an hour.
pub fn claims_with(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|barista",
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

/// Signs arbitrary claims with the given key and `kid`.
pub fn sign(claims: &Value, pem: &[u8], kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem).expect("fixture key must load");
    encode(&header, claims, &key).expect("token must encode")
}

/// A valid token granting the given permissions.
pub fn token_with(permissions: &[&str]) -> String {
    sign(&claims_with(permissions), ISSUER_KEY_PEM, Some(TEST_KID))
}

pub fn expired_token(permissions: &[&str]) -> String {
    let mut claims = claims_with(permissions);
    claims["iat"] = json!(now() - 7200);
    claims["exp"] = json!(now() - 3600);
    sign(&claims, ISSUER_KEY_PEM, Some(TEST_KID))
}

// --- State ---

pub fn water() -> NewDrink {
    NewDrink {
        title: "Water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

pub fn matcha_shake() -> NewDrink {
    NewDrink {
        title: "Matcha Shake".to_string(),
        recipe: vec![
            Ingredient {
                name: "milk".to_string(),
                color: "grey".to_string(),
                parts: 1,
            },
            Ingredient {
                name: "matcha".to_string(),
                color: "green".to_string(),
                parts: 3,
            },
        ],
    }
}

pub fn test_state(repo: InMemoryRepository) -> AppState {
    AppState {
        repo: Arc::new(repo),
        guard: test_guard(),
        config: AppConfig::default(),
    }
}
