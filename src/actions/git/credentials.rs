// Credential handling adapted from https://github.com/davidB/git2_credentials

use dirs::home_dir;
use git2::{Config, Cred, CredentialType, Error};
use std::path::PathBuf;

const SSH_KEYS: [&str; 6] = [
    ".ssh/id_dsa",
    ".ssh/id_ecdsa",
    ".ssh/id_ecdsa_sk",
    ".ssh/id_ed25519",
    ".ssh/id_ed25519_sk",
    ".ssh/id_rsa",
];

const DEFAULT_USERNAME: &str = "git";

// implementation based on code & comment from cargo
// https://github.com/rust-lang/cargo/blob/master/src/cargo/sources/git/utils.rs#L415-L628
// License APACHE

/// Answers the credential requests of libgit2 while pushing, the same way
/// a plain `git push` would find them.
///
/// libgit2 keeps calling the credential callback until it gets valid credentials,
/// so every method is only tried once, in this order:
///
/// - the username `git` if the remote url does not have one,
/// - the ssh-agent, then the default ssh keys without passphrase,
/// - the configured credential helper for username and password,
/// - the default credentials (e.g. Negotiate on Windows).
pub struct CredentialHandler {
    config: Config,
    username_requested: bool,
    ssh_attempts: usize,
    ssh_keys: Vec<PathBuf>,
    credential_helper_tried: bool,
}

impl CredentialHandler {
    pub fn new(config: Config) -> Self {
        let home = home_dir().unwrap_or(PathBuf::from("~"));
        let ssh_keys = SSH_KEYS
            .iter()
            .map(|key| home.join(key))
            .filter(|key| key.exists())
            .collect();

        CredentialHandler {
            config,
            username_requested: false,
            ssh_attempts: 0,
            ssh_keys,
            credential_helper_tried: false,
        }
    }

    pub fn try_next_credential(
        &mut self,
        url: &str,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, Error> {
        // Only asks for the username, the key is requested in the next call.
        if allowed.contains(CredentialType::USERNAME) {
            if self.username_requested {
                return Err(Error::from_str("no more username to try"));
            }
            self.username_requested = true;
            return Cred::username(username.unwrap_or(DEFAULT_USERNAME));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            let username = username.unwrap_or(DEFAULT_USERNAME);
            self.ssh_attempts += 1;
            if self.ssh_attempts == 1 {
                return Cred::ssh_key_from_agent(username);
            }
            return match self.ssh_keys.get(self.ssh_attempts - 2) {
                Some(key) => Cred::ssh_key(username, None, key, None),
                None => Err(Error::from_str("no more ssh keys to try")),
            };
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !self.credential_helper_tried {
            self.credential_helper_tried = true;
            return Cred::credential_helper(&self.config, url, username);
        }

        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        Err(Error::from_str("no valid authentication available"))
    }
}
