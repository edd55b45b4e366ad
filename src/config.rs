use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::CfError;

static CONFIG_FILE_NAME: &str = ".cfconfig";

/// Handle and password pair, held in memory for the duration of a run.
/// Persisted (encrypted) only when the user asks to be remembered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub handle: String,
    pub password: String,
}

/// On-disk shape of `~/.cfconfig`. Both fields are optional: a fresh file
/// holds nothing, a `status`-only setup holds just the handle.
#[derive(Serialize, Deserialize, Debug, Default)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass: Option<String>,
}

/// Reads and writes the local credential file.
///
/// The password at rest is obfuscated with a symmetric cipher under a key
/// compiled into the binary; this prevents casual plaintext exposure and
/// nothing more. The file is read and written without a lock: concurrent
/// invocations by the same operator race last-writer-wins, which is
/// acceptable for a single-user local tool.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new() -> Result<Self, CfError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CfError::ConfigIo("Could not locate home directory".to_owned()))?;
        Ok(Self {
            path: home.join(CONFIG_FILE_NAME),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads remembered credentials. A missing file is not an error; a
    /// present-but-malformed file (missing fields, undecryptable password)
    /// also yields `None` so that the caller falls through to the prompt.
    /// Only a permission or read failure is reported as `ConfigIo`.
    pub fn load(&self) -> Result<Option<Credentials>, CfError> {
        let file = match self.read_file()? {
            Some(file) => file,
            None => return Ok(None),
        };
        let (user, pass) = match (file.user, file.pass) {
            (Some(user), Some(pass)) => (user, pass),
            _ => return Ok(None),
        };
        Ok(crypt::open(&pass).map(|password| Credentials {
            handle: user,
            password,
        }))
    }

    /// Loads just the remembered handle, used by the read-only status
    /// command which needs no password.
    pub fn load_handle(&self) -> Result<Option<String>, CfError> {
        Ok(self.read_file()?.and_then(|file| file.user))
    }

    /// Overwrites the file atomically with the handle and the encrypted
    /// password.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CfError> {
        self.write_file(&ConfigFile {
            user: Some(credentials.handle.clone()),
            pass: Some(crypt::seal(&credentials.password)),
        })
    }

    /// Remembers only the handle, dropping any stored password.
    pub fn save_handle(&self, handle: &str) -> Result<(), CfError> {
        self.write_file(&ConfigFile {
            user: Some(handle.to_owned()),
            pass: None,
        })
    }

    /// Removes the stored credentials by writing an empty object. The file
    /// itself is kept.
    pub fn clear(&self) -> Result<(), CfError> {
        self.write_file(&ConfigFile::default())
    }

    fn read_file(&self) -> Result<Option<ConfigFile>, CfError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                return Err(CfError::ConfigIo(format!(
                    "Permission denied : {}",
                    self.path.display()
                )));
            }
            Err(err) => {
                return Err(CfError::ConfigIo(format!(
                    "{} : {}",
                    self.path.display(),
                    err
                )));
            }
        };
        // Corrupted content is treated as absence, not failure.
        Ok(serde_json::from_str(&text).ok())
    }

    fn write_file(&self, file: &ConfigFile) -> Result<(), CfError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| CfError::ConfigIo("Config file has no parent directory".to_owned()))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|err| CfError::ConfigIo(format!("Could not create temp file : {}", err)))?;
        serde_json::to_writer(&mut tmp, file)
            .map_err(|err| CfError::ConfigIo(format!("Could not write config : {}", err)))?;
        tmp.flush()
            .map_err(|err| CfError::ConfigIo(format!("Could not write config : {}", err)))?;
        tmp.persist(&self.path)
            .map_err(|err| CfError::ConfigIo(format!("Could not save config file : {}", err)))?;
        Ok(())
    }
}

/// Password obfuscation for the config file.
///
/// The key is fixed and compiled into the binary: anyone with the binary
/// can decrypt the file. This mirrors the long-standing behavior of the
/// tool and must not be silently strengthened, since that would break the
/// on-disk format for existing users.
mod crypt {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use chacha20poly1305::aead::{Aead, KeyInit};
    use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

    static STORE_KEY: &[u8; 32] = b"cf-cli.credential.store.key.v1!!";
    const NONCE_LEN: usize = 12;

    /// Encrypts the password and encodes `nonce || ciphertext` as base64.
    pub(super) fn seal(plain: &str) -> String {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(STORE_KEY));
        let nonce_bytes = rand::random::<[u8; NONCE_LEN]>();
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plain.as_bytes())
            .expect("in-memory encryption is infallible");
        let mut raw = Vec::with_capacity(NONCE_LEN + sealed.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&sealed);
        STANDARD.encode(raw)
    }

    /// Inverse of `seal`. Any decode or decrypt failure yields `None`; the
    /// caller treats that the same as an absent password.
    pub(super) fn open(sealed: &str) -> Option<String> {
        let raw = STANDARD.decode(sealed).ok()?;
        if raw.len() <= NONCE_LEN {
            return None;
        }
        let (nonce_bytes, body) = raw.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(STORE_KEY));
        let plain = cipher.decrypt(Nonce::from_slice(nonce_bytes), body).ok()?;
        String::from_utf8(plain).ok()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn seal_then_open_round_trips() {
            let sealed = seal("hunter2");
            assert_eq!(open(&sealed).as_deref(), Some("hunter2"));
        }

        #[test]
        fn sealed_value_hides_plaintext() {
            let sealed = seal("hunter2");
            assert!(!sealed.contains("hunter2"));
        }

        #[test]
        fn open_rejects_garbage() {
            assert_eq!(open("not base64 at all"), None);
            assert_eq!(open(&STANDARD.encode(b"short")), None);
        }
    }
}
