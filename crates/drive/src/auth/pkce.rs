// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PKCE (RFC 7636) verifier and S256 challenge.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the code verifier sent by the login flow.
pub const VERIFIER_LEN: usize = 86;

/// Generate a URL-safe random token of exactly `len` characters.
pub fn generate_token(len: usize) -> String {
    // Every 3 random bytes yield 4 characters.
    let mut bytes = vec![0u8; len.div_ceil(4) * 3];
    rand::rng().fill(bytes.as_mut_slice());
    let mut token = URL_SAFE_NO_PAD.encode(bytes);
    token.truncate(len);
    token
}

/// Generate a PKCE code verifier.
pub fn generate_code_verifier() -> String {
    generate_token(VERIFIER_LEN)
}

/// Compute code_challenge = base64url_nopad(sha256(verifier)).
pub fn compute_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

#[cfg(test)]
#[path = "pkce_tests.rs"]
mod tests;
