//! Join links for private servers

use crate::types::DeepLinkFormat;

/// Roblox place ID of Emergency Response: Liberty County
pub const PLACE_ID: u64 = 2534724415;

const PRC_JOIN_URL: &str = "https://policeroleplay.community/join/";

/// Build a join link for `join_code` in the given format
///
/// # Example
/// ```
/// use prc_dispatch_sdk::{deep_link_from_join_code, DeepLinkFormat};
///
/// assert_eq!(
///     deep_link_from_join_code("abcde", DeepLinkFormat::ViaPrcWebsite),
///     "https://policeroleplay.community/join/abcde"
/// );
/// ```
pub fn deep_link_from_join_code(join_code: &str, format: DeepLinkFormat) -> String {
    match format {
        DeepLinkFormat::Direct => format!(
            "roblox://placeId={}&launchData={}",
            PLACE_ID,
            launch_data(join_code)
        ),
        DeepLinkFormat::ViaRobloxWeb => format!(
            "https://www.roblox.com/games/start?placeId={}&launchData={}",
            PLACE_ID,
            launch_data(join_code)
        ),
        DeepLinkFormat::ViaPrcWebsite => format!("{}{}", PRC_JOIN_URL, join_code),
    }
}

/// URL-encoded `{"psCode": "<code>"}`
fn launch_data(join_code: &str) -> String {
    let data = serde_json::json!({ "psCode": join_code });
    urlencoding::encode(&data.to_string()).into_owned()
}
