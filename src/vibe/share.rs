//! Shareable vibe links: the descriptor is serialized to JSON, base64 encoded and
//! carried in the `state` query parameter of `<origin>/v`.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;
use url::Url;

use super::VibeDescriptor;

const SHARE_PATH: &str = "/v";
const STATE_PARAM: &str = "state";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("invalid share url: {0}")]
    Url(#[from] url::ParseError),
    #[error("share url has no 'state' parameter")]
    MissingState,
    #[error("share state is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("share state is not a vibe: {0}")]
    Payload(#[from] serde_json::Error),
}

pub fn encode_vibe(vibe: &VibeDescriptor) -> Result<String, ShareError> {
    let json = serde_json::to_vec(vibe)?;
    Ok(BASE64_STANDARD.encode(json))
}

/// Decodes a share token. Any failure rejects the whole payload.
pub fn decode_vibe(token: &str) -> Result<VibeDescriptor, ShareError> {
    let bytes = BASE64_STANDARD.decode(token.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn share_url(origin: &str, vibe: &VibeDescriptor) -> Result<String, ShareError> {
    let mut url = Url::parse(origin)?.join(SHARE_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair(STATE_PARAM, &encode_vibe(vibe)?);
    Ok(url.into())
}

pub fn vibe_from_url(link: &str) -> Result<VibeDescriptor, ShareError> {
    let url = Url::parse(link)?;
    let token = url
        .query_pairs()
        .find(|(key, _)| key == STATE_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(ShareError::MissingState)?;
    decode_vibe(&token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vibe::{catalog, PresetId};

    #[test]
    fn link_carries_an_equal_descriptor() {
        let mut vibe = PresetId::ShipMode.vibe();
        vibe.name = "Friday deploy ☕".into();

        let link = share_url("https://vibes.example", &vibe).unwrap();
        assert!(link.starts_with("https://vibes.example/v?state="));
        assert_eq!(vibe_from_url(&link).unwrap(), vibe);
    }

    #[test]
    fn token_survives_without_the_url() {
        let vibe = catalog::calm_vibe();
        let token = encode_vibe(&vibe).unwrap();
        assert_eq!(decode_vibe(&token).unwrap(), vibe);
    }

    #[test]
    fn truncated_token_is_rejected() {
        let token = encode_vibe(&catalog::default_vibe()).unwrap();
        let cut = &token[..token.len() / 2];
        // Keep the cut on a base64 quantum so the JSON parser sees the damage.
        let cut = &cut[..cut.len() - cut.len() % 4];
        assert!(matches!(decode_vibe(cut), Err(ShareError::Payload(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode_vibe("%%% not base64 %%%"),
            Err(ShareError::Encoding(_))
        ));
        let not_a_vibe = BASE64_STANDARD.encode(br#"{"name": 3}"#);
        assert!(matches!(decode_vibe(&not_a_vibe), Err(ShareError::Payload(_))));
    }

    #[test]
    fn link_without_state_is_rejected() {
        assert!(matches!(
            vibe_from_url("https://vibes.example/v?other=1"),
            Err(ShareError::MissingState)
        ));
        assert!(matches!(vibe_from_url("not a url"), Err(ShareError::Url(_))));
    }
}
