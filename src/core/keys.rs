//! Private key materialization.
//!
//! Converts the stored (usually encrypted) PKCS#8 key into an unencrypted
//! PKCS#8 PEM file the `snow` CLI can read. The file lives only as long as
//! the returned [`KeyFile`].

use pkcs8::{der, pkcs5, EncryptedPrivateKeyInfo, LineEnding, PrivateKeyInfo, SecretDocument};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::error::{KeyError, Result};

const ENCRYPTED_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PLAIN_LABEL: &str = "PRIVATE KEY";

/// Decrypted key written to a temporary file.
///
/// The file is created with owner-only permissions and removed on drop.
#[derive(Debug)]
pub struct KeyFile {
    file: NamedTempFile,
}

impl KeyFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Decrypt `pem` and write it to a fresh temporary key file.
///
/// Literal `\n` sequences in `pem` (as stored in JSON secrets) are turned
/// into newlines first. An empty passphrase counts as none.
///
/// # Errors
///
/// Returns `KeyError` if the PEM is malformed, its encryption scheme is
/// not supported, the passphrase is missing or wrong, or the file cannot be
/// written. PBES2 keys with AES or Triple-DES (`openssl pkcs8 -topk8 -v2
/// des3`) and an HMAC-SHA1 or SHA-2 PRF are supported.
pub fn materialize(pem: &str, passphrase: Option<&str>) -> Result<KeyFile> {
    let decrypted = decrypt_pem(pem, passphrase).map_err(|e| {
        error!(error = %e, "private key could not be prepared");
        e
    })?;

    let mut file = tempfile::Builder::new()
        .prefix("snowdeploy-")
        .suffix(".p8")
        .tempfile()
        .map_err(KeyError::WriteFailed)?;
    file.write_all(decrypted.as_bytes())
        .and_then(|_| file.flush())
        .map_err(KeyError::WriteFailed)?;

    debug!(path = %file.path().display(), "private key written");
    Ok(KeyFile { file })
}

/// Decrypt `pem` into unencrypted PKCS#8 PEM text.
///
/// # Errors
///
/// See [`materialize`].
pub fn decrypt_pem(pem: &str, passphrase: Option<&str>) -> Result<Zeroizing<String>> {
    let normalized = normalize_pem(pem);
    let passphrase = passphrase.filter(|p| !p.is_empty());

    let (label, document) =
        SecretDocument::from_pem(&normalized).map_err(|e| KeyError::InvalidPem(e.to_string()))?;

    let decrypted = match label {
        ENCRYPTED_LABEL => {
            let passphrase = passphrase.ok_or(KeyError::MissingPassphrase)?;
            let info = EncryptedPrivateKeyInfo::try_from(document.as_bytes())
                .map_err(|e| key_error(e, KeyError::InvalidPem))?;
            info.decrypt(passphrase)
                .map_err(|e| key_error(e, KeyError::DecryptionFailed))?
        }
        PLAIN_LABEL => document,
        other => return Err(KeyError::UnsupportedLabel(other.to_string()).into()),
    };

    // A wrong passphrase can occasionally survive CBC padding; the result
    // then fails to parse as a private key.
    PrivateKeyInfo::try_from(decrypted.as_bytes())
        .map_err(|e| KeyError::DecryptionFailed(e.to_string()))?;

    let pem = decrypted
        .to_pem(PLAIN_LABEL, LineEnding::LF)
        .map_err(|e| KeyError::InvalidPem(e.to_string()))?;
    Ok(pem)
}

/// Classify a PKCS#8 error, separating unsupported encryption schemes
/// from damaged input.
fn key_error(err: pkcs8::Error, otherwise: fn(String) -> KeyError) -> KeyError {
    match err {
        pkcs8::Error::Asn1(e) => match e.kind() {
            der::ErrorKind::OidUnknown { oid } => KeyError::UnsupportedAlgorithm(oid.to_string()),
            _ => otherwise(e.to_string()),
        },
        pkcs8::Error::EncryptedPrivateKey(pkcs5::Error::UnsupportedAlgorithm { oid }) => {
            KeyError::UnsupportedAlgorithm(oid.to_string())
        }
        pkcs8::Error::EncryptedPrivateKey(pkcs5::Error::NoPbes1CryptSupport) => {
            KeyError::UnsupportedAlgorithm("PBES1".to_string())
        }
        other => otherwise(other.to_string()),
    }
}

/// Turn escaped newlines into real ones and trim surrounding whitespace.
fn normalize_pem(pem: &str) -> Zeroizing<String> {
    let unescaped = Zeroizing::new(
        pem.replace("\\r\\n", "\n")
            .replace("\\n", "\n")
            .replace("\r\n", "\n"),
    );
    let mut normalized = Zeroizing::new(unescaped.trim().to_string());
    normalized.push('\n');
    normalized
}
