//! Per-session state: the correlation token and the private key passphrase.
//!
//! The session itself belongs to the host web framework and is accessed through
//! [`SessionState`].

use std::collections::HashMap;
use std::hash::BuildHasher;

use rand::distributions::{Alphanumeric, DistString};
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::Error;

/// String-valued session storage provided by the host framework.
pub trait SessionState {
    /// Look up a value.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store a value, replacing any previous one.
    fn insert(&mut self, key: &str, value: String) -> Result<(), Error>;
}

impl<S: BuildHasher> SessionState for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(HashMap::get(self, key).cloned())
    }

    fn insert(&mut self, key: &str, value: String) -> Result<(), Error> {
        HashMap::insert(self, key.to_string(), value);
        Ok(())
    }
}

/// Generate a new correlation token: [`TOKEN_BITS`] random bits, hex-encoded.
pub fn new_token<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    format!("{:032x}", rng.gen::<u128>())
}

/// Returns the correlation token of this session, creating it on first use.
pub fn correlation_token<S>(session: &mut S) -> Result<String, Error>
where
    S: SessionState + ?Sized,
{
    if let Some(token) = session.get(SESSION_TOKEN_KEY)? {
        return Ok(token);
    }

    let token = new_token(&mut rand::thread_rng());
    session.insert(SESSION_TOKEN_KEY, token.clone())?;

    Ok(token)
}

/// How the private key passphrase for a session is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassphrasePolicy {
    /// A random alphanumeric passphrase, generated once per session.
    Random {
        /// Number of characters.
        length: usize,
    },
    /// The same passphrase for every session, rewritten on every evaluation.
    Fixed(String),
}

impl Default for PassphrasePolicy {
    fn default() -> Self {
        Self::Random {
            length: PASSPHRASE_LENGTH,
        }
    }
}

impl PassphrasePolicy {
    /// Make sure the session holds a passphrase and return it.
    pub fn ensure<S>(&self, session: &mut S) -> Result<String, Error>
    where
        S: SessionState + ?Sized,
    {
        match self {
            Self::Fixed(value) => {
                set_passphrase(session, value.clone())?;
                Ok(value.clone())
            }
            Self::Random { length } => match session.get(SESSION_PASSPHRASE_KEY)? {
                Some(existing) => Ok(existing),
                None => {
                    let value = Alphanumeric.sample_string(&mut rand::thread_rng(), *length);
                    set_passphrase(session, value.clone())?;
                    Ok(value)
                }
            },
        }
    }
}

/// Store the private key passphrase in the session.
pub fn set_passphrase<S>(session: &mut S, value: String) -> Result<(), Error>
where
    S: SessionState + ?Sized,
{
    session.insert(SESSION_PASSPHRASE_KEY, value)
}
