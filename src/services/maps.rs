use crate::config::MapsConfig;

const EMBED_BASE: &str = "https://www.google.com/maps/embed/v1/place";

/// URL iframe Google Maps Embed для адреса события.
/// Без ключа карта не показывается.
pub fn embed_url(config: &MapsConfig, address: &str) -> Option<String> {
    let key = config.api_key.as_deref()?;
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    let query = serde_urlencoded::to_string([("key", key), ("q", address)]).ok()?;
    Some(format!("{}?{}", EMBED_BASE, query))
}
