/// Avatar lookup for newly registered users
///
/// Avatar assignment is best-effort: a provider failure never blocks
/// registration, the user is simply stored without an avatar.
///
/// [`GravatarProvider`] derives the Gravatar URL locally from the email
/// address, so it only fails on malformed input. Gravatar accepts SHA-256
/// hashes of the trimmed, lowercased address.
///
/// # Example
///
/// ```
/// use picshare_shared::avatar::{AvatarProvider, DefaultImage, GravatarProvider};
///
/// let gravatar = GravatarProvider {
///     size: Some(200),
///     default_image: Some(DefaultImage::Identicon),
///     ..Default::default()
/// };
///
/// let url = gravatar.avatar_url("User@Example.com").unwrap();
/// assert!(url.starts_with("https://www.gravatar.com/avatar/"));
/// assert!(url.ends_with("?s=200&d=identicon"));
/// ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const GRAVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar";

/// Error type for avatar lookups
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// The email address can't be turned into an avatar hash
    #[error("Invalid email address for avatar lookup: {0:?}")]
    InvalidEmail(String),

    /// The provider couldn't produce an avatar
    #[error("Avatar service unavailable: {0}")]
    Unavailable(String),
}

/// Source of avatar URLs for new accounts
pub trait AvatarProvider: Send + Sync {
    fn avatar_url(&self, email: &str) -> Result<String, AvatarError>;
}

/// Image Gravatar serves when the address has no avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultImage {
    /// Respond with HTTP 404 instead of an image
    #[serde(rename = "404")]
    NotFound,
    Mp,
    Identicon,
    Monsterid,
    Wavatar,
    Retro,
    Robohash,
    Blank,
}

impl DefaultImage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultImage::NotFound => "404",
            DefaultImage::Mp => "mp",
            DefaultImage::Identicon => "identicon",
            DefaultImage::Monsterid => "monsterid",
            DefaultImage::Wavatar => "wavatar",
            DefaultImage::Retro => "retro",
            DefaultImage::Robohash => "robohash",
            DefaultImage::Blank => "blank",
        }
    }
}

/// Gravatar URL builder
#[derive(Debug, Clone)]
pub struct GravatarProvider {
    pub base_url: String,

    /// Requested edge length in pixels (1..=2048)
    pub size: Option<u16>,

    pub default_image: Option<DefaultImage>,
}

impl Default for GravatarProvider {
    fn default() -> Self {
        Self {
            base_url: GRAVATAR_BASE_URL.to_string(),
            size: None,
            default_image: None,
        }
    }
}

impl AvatarProvider for GravatarProvider {
    fn avatar_url(&self, email: &str) -> Result<String, AvatarError> {
        let hash = gravatar_hash(email)?;

        let mut params = Vec::new();
        if let Some(size) = self.size {
            params.push(format!("s={}", size.clamp(1, 2048)));
        }
        if let Some(default_image) = self.default_image {
            params.push(format!("d={}", default_image.as_str()));
        }

        let mut url = format!("{}/{}", self.base_url.trim_end_matches('/'), hash);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        Ok(url)
    }
}

/// Provider used when avatar lookup is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAvatar;

impl AvatarProvider for NoAvatar {
    fn avatar_url(&self, _email: &str) -> Result<String, AvatarError> {
        Err(AvatarError::Unavailable("avatar lookup disabled".to_string()))
    }
}

/// Hex SHA-256 of the normalized address
pub fn gravatar_hash(email: &str) -> Result<String, AvatarError> {
    let normalized = email.trim().to_lowercase();

    let valid = match normalized.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AvatarError::InvalidEmail(email.to_string()));
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
