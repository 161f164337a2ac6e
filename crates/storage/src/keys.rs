//! Storage key construction for uploaded assets.

use rand::RngCore;
use tubely_core::types::AspectRatio;

const FALLBACK_EXTENSION: &str = "bin";

/// File extension for a MIME type, taken from its subtype.
///
/// Parameters (`; charset=…`) are ignored. Anything that is not a single
/// `type/subtype` pair maps to `bin`.
pub fn extension_for(media_type: &str) -> &str {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    let mut parts = essence.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(top), Some(sub), None) if !top.is_empty() && !sub.is_empty() => sub,
        _ => FALLBACK_EXTENSION,
    }
}

/// 32 bytes from the OS RNG, hex encoded.
pub fn random_name() -> String {
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// `<random>.<ext>`
pub fn asset_key(media_type: &str) -> String {
    format!("{}.{}", random_name(), extension_for(media_type))
}

/// `<aspect>/<random>.<ext>`
pub fn video_key(aspect: AspectRatio, media_type: &str) -> String {
    format!("{}/{}", aspect.as_str(), asset_key(media_type))
}
