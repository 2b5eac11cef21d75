//! Device-local preferences, stored encrypted next to the process.
//!
//! On-disk format (Base64 encoded):
//! ```text
//! IV (16 bytes) + AES-256-CBC ciphertext + HMAC-SHA256 tag (32 bytes)
//! ```
//! The tag covers IV and ciphertext (encrypt-then-MAC). Encryption and MAC
//! keys are derived from the operator secret with SHA-256 under distinct
//! labels.

use aes::Aes256;
use async_trait::async_trait;
use base64::Engine;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use cbc::{Decryptor, Encryptor};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::prelude::*;
use licwatch_types::store_adapter::LocalPreferences;

type Aes256CbcEnc = Encryptor<Aes256>;
type Aes256CbcDec = Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const IV_LEN: usize = 16;
const TAG_LEN: usize = 32;

#[async_trait]
pub trait LocalPrefsStore: Debug + Send + Sync {
	/// Load preferences. Missing or unreadable storage yields the defaults.
	async fn load(&self) -> LocalPreferences;
	/// Validate and persist preferences
	async fn save(&self, prefs: &LocalPreferences) -> ClResult<()>;
}

pub struct EncryptedFilePrefs {
	path: PathBuf,
	enc_key: [u8; 32],
	mac_key: [u8; 32],
}

impl Debug for EncryptedFilePrefs {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EncryptedFilePrefs").field("path", &self.path).finish_non_exhaustive()
	}
}

fn derive_key(label: &str, secret: &str) -> [u8; 32] {
	let mut hasher = Sha256::new();
	hasher.update(label.as_bytes());
	hasher.update(b":");
	hasher.update(secret.as_bytes());
	hasher.finalize().into()
}

impl EncryptedFilePrefs {
	pub fn new(path: impl AsRef<Path>, secret: &str) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			enc_key: derive_key("licwatch-local-prefs-enc", secret),
			mac_key: derive_key("licwatch-local-prefs-mac", secret),
		}
	}

	fn mac(&self) -> ClResult<HmacSha256> {
		<HmacSha256 as Mac>::new_from_slice(&self.mac_key)
			.map_err(|e| Error::Internal(format!("hmac init failed: {}", e)))
	}

	pub fn seal(&self, plaintext: &[u8]) -> ClResult<String> {
		use rand::Rng;

		let mut iv = [0u8; IV_LEN];
		let mut rng = rand::rng();
		rng.fill_bytes(&mut iv);

		let encryptor = Aes256CbcEnc::new_from_slices(&self.enc_key, &iv)
			.map_err(|e| Error::Internal(format!("cipher init failed: {}", e)))?;

		// Room for PKCS7 padding (up to one extra block)
		let mut buf = vec![0u8; plaintext.len() + IV_LEN];
		buf[..plaintext.len()].copy_from_slice(plaintext);
		let ciphertext = encryptor
			.encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
			.map_err(|e| Error::Internal(format!("encryption failed: {}", e)))?;

		let mut mac = self.mac()?;
		mac.update(&iv);
		mac.update(ciphertext);
		let tag = mac.finalize().into_bytes();

		let mut output = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
		output.extend_from_slice(&iv);
		output.extend_from_slice(ciphertext);
		output.extend_from_slice(&tag);

		Ok(base64::engine::general_purpose::STANDARD.encode(&output))
	}

	pub fn open(&self, sealed: &str) -> ClResult<Vec<u8>> {
		let raw = base64::engine::general_purpose::STANDARD
			.decode(sealed.trim())
			.map_err(|_| Error::Parse)?;

		if raw.len() < IV_LEN + IV_LEN + TAG_LEN {
			return Err(Error::Parse);
		}
		let (body, tag) = raw.split_at(raw.len() - TAG_LEN);
		let (iv, ciphertext) = body.split_at(IV_LEN);

		let mut mac = self.mac()?;
		mac.update(iv);
		mac.update(ciphertext);
		mac.verify_slice(tag)
			.map_err(|_| Error::ValidationError("local preferences failed integrity check".into()))?;

		let decryptor = Aes256CbcDec::new_from_slices(&self.enc_key, iv)
			.map_err(|e| Error::Internal(format!("cipher init failed: {}", e)))?;
		let mut buf = ciphertext.to_vec();
		let plaintext = decryptor.decrypt_padded_mut::<Pkcs7>(&mut buf).map_err(|_| Error::Parse)?;

		Ok(plaintext.to_vec())
	}

	async fn read(&self) -> ClResult<LocalPreferences> {
		let sealed = tokio::fs::read_to_string(&self.path).await?;
		let plaintext = self.open(&sealed)?;
		Ok(serde_json::from_slice(&plaintext)?)
	}
}

#[async_trait]
impl LocalPrefsStore for EncryptedFilePrefs {
	async fn load(&self) -> LocalPreferences {
		match self.read().await {
			Ok(prefs) => prefs,
			Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
				debug!("No local preferences at {}, using defaults", self.path.display());
				LocalPreferences::default()
			}
			Err(err) => {
				warn!("Unreadable local preferences at {}: {}", self.path.display(), err);
				LocalPreferences::default()
			}
		}
	}

	async fn save(&self, prefs: &LocalPreferences) -> ClResult<()> {
		prefs.validate()?;

		let json = serde_json::to_vec(prefs)?;
		let sealed = self.seal(&json)?;

		if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}
		let tmp = self.path.with_extension("tmp");
		tokio::fs::write(&tmp, sealed).await?;
		tokio::fs::rename(&tmp, &self.path).await?;

		info!("Saved local preferences to {}", self.path.display());
		Ok(())
	}
}


// vim: ts=4
