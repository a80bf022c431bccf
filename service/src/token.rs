//! Action token definitions.
//!
//! An action token authorizes exactly one state transition of one
//! [`Assignment`] via an emailed link, without a login step. Replay within
//! the validity window is not tracked server-side: the status guard makes a
//! second application a no-op, and verification alone has no side effects.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, From, FromStr};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::assignment;
#[cfg(doc)]
use crate::domain::Assignment;

/// Signed, short-lived [`Token`] authorizing one [`Action`] upon one
/// [`Assignment`].
#[derive(AsRef, Clone, Debug, Display, From, FromStr)]
pub struct Token(String);

/// Claims carried by a [`Token`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// ID of the [`Assignment`] the [`Token`] authorizes an [`Action`] upon.
    #[serde(rename = "sub")]
    pub assignment_id: assignment::Id,

    /// [`Action`] the [`Token`] authorizes.
    pub action: Action,

    /// Random nonce making every issued [`Token`] unique.
    pub nonce: Uuid,

    /// [`DateTime`] when the [`Token`] was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssuanceDateTime,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Action a [`Token`] authorizes.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Accept the [`Assignment`] offer.
    Accept,

    /// Decline the [`Assignment`] offer.
    Decline,
}

/// Issuer and verifier of [`Token`]s.
#[derive(Clone, Debug)]
pub struct Signer {
    /// Key the issued [`Token`]s are signed with.
    #[debug(skip)]
    encoding_key: EncodingKey,

    /// Key the verified [`Token`]s are checked with.
    #[debug(skip)]
    decoding_key: DecodingKey,

    /// How long an issued [`Token`] stays valid.
    validity: Duration,
}

impl Signer {
    /// Default validity of an issued [`Token`].
    pub const VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

    /// Creates a new [`Signer`] deriving its keys from the provided secret.
    #[must_use]
    pub fn new(secret: &[u8], validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity,
        }
    }

    /// Issues a new [`Token`] authorizing the provided [`Action`] upon the
    /// provided [`Assignment`].
    ///
    /// # Errors
    ///
    /// If the [`Claims`] cannot be encoded.
    pub fn issue(
        &self,
        assignment_id: assignment::Id,
        action: Action,
    ) -> Result<Token, jsonwebtoken::errors::Error> {
        let issued_at = IssuanceDateTime::now();
        self.encode(&Claims {
            assignment_id,
            action,
            nonce: Uuid::new_v4(),
            issued_at,
            expires_at: (issued_at + self.validity).coerce(),
        })
    }

    /// Encodes the provided [`Claims`] into a [`Token`].
    ///
    /// # Errors
    ///
    /// If the [`Claims`] cannot be encoded.
    pub fn encode(
        &self,
        claims: &Claims,
    ) -> Result<Token, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &self.encoding_key,
        )
        .map(Token)
    }

    /// Verifies the provided [`Token`], expecting it to authorize the
    /// provided [`Action`].
    ///
    /// Returns the ID of the [`Assignment`] the [`Token`] authorizes the
    /// [`Action`] upon, or [`None`] if the [`Token`] is malformed, carries
    /// an invalid signature, authorizes another [`Action`], or has expired.
    #[must_use]
    pub fn verify(
        &self,
        token: &Token,
        expected: Action,
    ) -> Option<assignment::Id> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = jsonwebtoken::decode::<Claims>(
            token.as_ref(),
            &self.decoding_key,
            &validation,
        )
        .ok()?
        .claims;

        (claims.action == expected).then_some(claims.assignment_id)
    }
}

/// [`DateTime`] when a [`Token`] was issued.
pub type IssuanceDateTime = DateTimeOf<(Token, unit::Issuance)>;

/// [`DateTime`] when a [`Token`] expires.
pub type ExpirationDateTime = DateTimeOf<(Token, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use uuid::Uuid;

    use crate::domain::assignment;

    use super::{Action, Claims, IssuanceDateTime, Signer, Token};

    fn signer() -> Signer {
        Signer::new(b"test-secret", Signer::VALIDITY)
    }

    #[test]
    fn verifies_freshly_issued_token() {
        let signer = signer();
        let id = assignment::Id::new();

        let token = signer.issue(id, Action::Accept).unwrap();
        assert_eq!(signer.verify(&token, Action::Accept), Some(id));
    }

    #[test]
    fn rejects_action_mismatch() {
        let signer = signer();
        let id = assignment::Id::new();

        let token = signer.issue(id, Action::Accept).unwrap();
        assert_eq!(signer.verify(&token, Action::Decline), None);

        let token = signer.issue(id, Action::Decline).unwrap();
        assert_eq!(signer.verify(&token, Action::Accept), None);
    }

    #[test]
    fn rejects_malformed_input() {
        let signer = signer();

        for garbage in ["", "not-a-token", "a.b.c", "a:b:c:d"] {
            let token: Token = garbage.parse().unwrap();
            assert_eq!(signer.verify(&token, Action::Accept), None);
        }
    }

    #[test]
    fn rejects_foreign_signature() {
        let id = assignment::Id::new();
        let token = Signer::new(b"other-secret", Signer::VALIDITY)
            .issue(id, Action::Accept)
            .unwrap();

        assert_eq!(signer().verify(&token, Action::Accept), None);
    }

    #[test]
    fn rejects_expired_token() {
        let signer = signer();
        let id = assignment::Id::new();

        // Issued 25 hours ago with the standard 24-hour validity.
        let issued_at =
            IssuanceDateTime::now() - Duration::from_secs(25 * 60 * 60);
        let token = signer
            .encode(&Claims {
                assignment_id: id,
                action: Action::Accept,
                nonce: Uuid::new_v4(),
                issued_at,
                expires_at: (issued_at + Signer::VALIDITY).coerce(),
            })
            .unwrap();

        assert_eq!(signer.verify(&token, Action::Accept), None);
    }

    #[test]
    fn token_stays_valid_until_the_boundary() {
        let signer = signer();
        let id = assignment::Id::new();

        // Issued 23 hours ago: one hour of validity left.
        let issued_at =
            IssuanceDateTime::now() - Duration::from_secs(23 * 60 * 60);
        let token = signer
            .encode(&Claims {
                assignment_id: id,
                action: Action::Decline,
                nonce: Uuid::new_v4(),
                issued_at,
                expires_at: (issued_at + Signer::VALIDITY).coerce(),
            })
            .unwrap();

        assert_eq!(signer.verify(&token, Action::Decline), Some(id));
    }
}
