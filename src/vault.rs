//! Encrypted storage for sensitive source documents.
//!
//! Password-based symmetric encryption: PBKDF2-HMAC-SHA256 key derivation
//! into AES-256-GCM. Every file carries its own random salt and nonce in a
//! small header, so the same password produces unrelated ciphertexts:
//!
//! ```text
//! [4-byte magic "PDV1"][32-byte salt][12-byte nonce][ciphertext + GCM tag]
//! ```
//!
//! There is no key management beyond the password: no rotation, no
//! multi-party protocol. The password comes from `PITCHDESK_PASSWORD`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::{bail, Context, Result};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

/// Extension appended to encrypted files.
pub const ENCRYPTED_EXTENSION: &str = "pdv";

const MAGIC: &[u8; 4] = b"PDV1";
const SALT_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32; // AES-256
const TAG_LENGTH: usize = 16;

/// Extensions eligible for batch encryption.
const LOCKABLE_EXTENSIONS: &[&str] = &["xlsx", "xls", "docx", "doc", "pptx", "ppt", "pdf", "txt"];

#[derive(Debug)]
pub enum VaultError {
    /// Header too short or magic mismatch.
    NotAVaultFile,
    /// GCM authentication failed: wrong password or tampered data.
    DecryptionFailed,
    EncryptionFailed,
}

impl std::fmt::Display for VaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultError::NotAVaultFile => write!(f, "not a pitchdesk vault file"),
            VaultError::DecryptionFailed => {
                write!(f, "decryption failed: wrong password or corrupted file")
            }
            VaultError::EncryptionFailed => write!(f, "encryption failed"),
        }
    }
}

impl std::error::Error for VaultError {}

/// Derived AES key. Zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
struct DerivedKey {
    bytes: [u8; KEY_LENGTH],
}

/// Password-based vault. One instance per CLI invocation.
pub struct Vault {
    password: String,
    iterations: u32,
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl Vault {
    pub fn new(password: impl Into<String>, iterations: u32) -> Self {
        Self {
            password: password.into(),
            iterations,
        }
    }

    /// Build from the `PITCHDESK_PASSWORD` environment variable.
    pub fn from_env(iterations: u32) -> Result<Self> {
        let password = std::env::var("PITCHDESK_PASSWORD").map_err(|_| {
            anyhow::anyhow!(
                "PITCHDESK_PASSWORD environment variable not set. \
Export a vault password before running vault commands."
            )
        })?;
        if password.is_empty() {
            bail!("PITCHDESK_PASSWORD must not be empty");
        }
        Ok(Self::new(password, iterations))
    }

    fn derive(&self, salt: &[u8; SALT_LENGTH]) -> DerivedKey {
        let mut bytes = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(self.password.as_bytes(), salt, self.iterations, &mut bytes);
        DerivedKey { bytes }
    }

    /// Encrypt plaintext into the full container format.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let key = self.derive(&salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.bytes));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(MAGIC.len() + SALT_LENGTH + NONCE_LENGTH + ciphertext.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt a full container back into plaintext.
    pub fn decrypt_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, VaultError> {
        let min_len = MAGIC.len() + SALT_LENGTH + NONCE_LENGTH + TAG_LENGTH;
        if bytes.len() < min_len || &bytes[..MAGIC.len()] != MAGIC {
            return Err(VaultError::NotAVaultFile);
        }

        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(&bytes[MAGIC.len()..MAGIC.len() + SALT_LENGTH]);
        let nonce_start = MAGIC.len() + SALT_LENGTH;
        let nonce = &bytes[nonce_start..nonce_start + NONCE_LENGTH];
        let ciphertext = &bytes[nonce_start + NONCE_LENGTH..];

        let key = self.derive(&salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.bytes));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }

    /// Encrypt a file. Default output appends `.pdv`.
    pub fn encrypt_file(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| default_encrypted_path(input));

        let plaintext = std::fs::read(input)
            .with_context(|| format!("Failed to read file: {}", input.display()))?;
        let container = self.encrypt_bytes(&plaintext)?;
        std::fs::write(&output, container)
            .with_context(|| format!("Failed to write encrypted file: {}", output.display()))?;

        Ok(output)
    }

    /// Decrypt a file. Default output strips `.pdv`.
    pub fn decrypt_file(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| default_decrypted_path(input));

        let plaintext = self.decrypt_to_memory(input)?;
        std::fs::write(&output, plaintext)
            .with_context(|| format!("Failed to write decrypted file: {}", output.display()))?;

        Ok(output)
    }

    /// Decrypt a file without writing plaintext to disk.
    pub fn decrypt_to_memory(&self, input: &Path) -> Result<Vec<u8>> {
        let container = std::fs::read(input)
            .with_context(|| format!("Failed to read file: {}", input.display()))?;
        self.decrypt_bytes(&container)
            .with_context(|| format!("Failed to decrypt: {}", input.display()))
    }

    /// Encrypt every lockable file under a directory. Files that already
    /// carry the vault extension are skipped; per-file failures are reported
    /// and skipped. Returns the number of files encrypted.
    pub fn encrypt_dir(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            bail!("Directory does not exist: {}", dir.display());
        }

        let mut encrypted = 0usize;
        for entry in walkdir::WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    eprintln!("skipped unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if ext == ENCRYPTED_EXTENSION || !LOCKABLE_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }

            match self.encrypt_file(path, None) {
                Ok(out) => {
                    println!("encrypted {} -> {}", path.display(), out.display());
                    encrypted += 1;
                }
                Err(e) => {
                    eprintln!("skipped {}: {}", path.display(), e);
                }
            }
        }

        Ok(encrypted)
    }
}

fn default_encrypted_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(ENCRYPTED_EXTENSION);
    PathBuf::from(name)
}

fn default_decrypted_path(input: &Path) -> PathBuf {
    let s = input.to_string_lossy();
    let suffix = format!(".{}", ENCRYPTED_EXTENSION);
    if let Some(stripped) = s.strip_suffix(&suffix) {
        PathBuf::from(stripped)
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".plain");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal iterations for test speed; strength is covered by the default.
    fn test_vault(password: &str) -> Vault {
        Vault::new(password, 1000)
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let vault = test_vault("correct horse");
        let container = vault.encrypt_bytes(b"customer data").unwrap();
        assert_eq!(&container[..4], MAGIC);
        let plaintext = vault.decrypt_bytes(&container).unwrap();
        assert_eq!(plaintext, b"customer data");
    }

    #[test]
    fn wrong_password_fails() {
        let container = test_vault("password1").encrypt_bytes(b"secret").unwrap();
        let result = test_vault("password2").decrypt_bytes(&container);
        assert!(matches!(result, Err(VaultError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_detected() {
        let vault = test_vault("pw");
        let mut container = vault.encrypt_bytes(b"secret data").unwrap();
        let last = container.len() - 1;
        container[last] ^= 0xFF;
        assert!(matches!(
            vault.decrypt_bytes(&container),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn bad_magic_and_short_input_rejected() {
        let vault = test_vault("pw");
        assert!(matches!(
            vault.decrypt_bytes(b"tooshort"),
            Err(VaultError::NotAVaultFile)
        ));
        let mut container = vault.encrypt_bytes(b"x").unwrap();
        container[0] = b'X';
        assert!(matches!(
            vault.decrypt_bytes(&container),
            Err(VaultError::NotAVaultFile)
        ));
    }

    #[test]
    fn same_plaintext_yields_different_containers() {
        let vault = test_vault("pw");
        let a = vault.encrypt_bytes(b"same data").unwrap();
        let b = vault.encrypt_bytes(b"same data").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let vault = test_vault("pw");
        let container = vault.encrypt_bytes(b"").unwrap();
        assert!(vault.decrypt_bytes(&container).unwrap().is_empty());
    }

    #[test]
    fn file_round_trip_with_default_names() {
        let vault = test_vault("pw");
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plan.xlsx");
        std::fs::write(&plain, b"workbook bytes").unwrap();

        let encrypted = vault.encrypt_file(&plain, None).unwrap();
        assert_eq!(encrypted, dir.path().join("plan.xlsx.pdv"));
        assert_ne!(std::fs::read(&encrypted).unwrap(), b"workbook bytes");

        std::fs::remove_file(&plain).unwrap();
        let decrypted = vault.decrypt_file(&encrypted, None).unwrap();
        assert_eq!(decrypted, plain);
        assert_eq!(std::fs::read(&decrypted).unwrap(), b"workbook bytes");
    }

    #[test]
    fn decrypt_to_memory_leaves_no_plaintext_file() {
        let vault = test_vault("pw");
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("profile.docx");
        std::fs::write(&plain, b"profile").unwrap();
        let encrypted = vault.encrypt_file(&plain, None).unwrap();
        std::fs::remove_file(&plain).unwrap();

        let bytes = vault.decrypt_to_memory(&encrypted).unwrap();
        assert_eq!(bytes, b"profile");
        assert!(!plain.exists());
    }

    #[test]
    fn encrypt_dir_skips_already_encrypted_and_unsupported() {
        let vault = test_vault("pw");
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.xlsx"), b"a").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("c.pdv"), b"c").unwrap();
        std::fs::write(dir.path().join("d.png"), b"d").unwrap();

        let count = vault.encrypt_dir(dir.path()).unwrap();
        assert_eq!(count, 2);
        assert!(dir.path().join("a.xlsx.pdv").exists());
        assert!(dir.path().join("b.txt.pdv").exists());
        assert!(!dir.path().join("d.png.pdv").exists());
    }
}
