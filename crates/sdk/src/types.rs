//! Private-server API types
//!
//! Field names and enum values follow the API's wire format; the Rust side
//! uses snake_case names.

use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roblox account verification a player needs to join a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountVerificationRequirement {
    #[serde(rename = "Disabled")]
    None,
    #[serde(rename = "Email")]
    Email,
    /// Verified phone number or government ID
    #[serde(rename = "Phone/ID")]
    PhoneOrId,
}

impl AccountVerificationRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "Disabled",
            Self::Email => "Email",
            Self::PhoneOrId => "Phone/ID",
        }
    }
}

impl fmt::Display for AccountVerificationRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a join link opens the game
///
/// See <https://create.roblox.com/docs/production/promotion/deeplinks>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeepLinkFormat {
    /// `https://policeroleplay.community/join/<code>`
    #[default]
    #[serde(rename = "prcWebsite")]
    ViaPrcWebsite,
    /// `https://www.roblox.com/games/start?...`
    #[serde(rename = "viaRobloxWeb")]
    ViaRobloxWeb,
    /// `roblox://...`, opens the app directly
    #[serde(rename = "directToApp")]
    Direct,
}

impl DeepLinkFormat {
    pub const ALL: [DeepLinkFormat; 3] = [Self::ViaPrcWebsite, Self::ViaRobloxWeb, Self::Direct];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViaPrcWebsite => "prcWebsite",
            Self::ViaRobloxWeb => "viaRobloxWeb",
            Self::Direct => "directToApp",
        }
    }
}

impl fmt::Display for DeepLinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeepLinkFormat {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SdkError::UnknownVariant {
                kind: "deep link format",
                value: s.to_string(),
            })
    }
}

/// In-game permission level of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    #[serde(rename = "Normal")]
    None,
    #[serde(rename = "Server Administrator")]
    Administrator,
    #[serde(rename = "Server Owner")]
    Owner,
    #[serde(rename = "Server Moderator")]
    Moderator,
}

/// `GET v1/server`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerInfo {
    #[serde(rename = "Name")]
    pub name: String,
    /// Roblox user ID
    #[serde(rename = "OwnerId")]
    pub owner_user_id: u64,
    #[serde(rename = "CoOwnerIds", default)]
    pub co_owner_user_ids: Vec<u64>,
    #[serde(rename = "CurrentPlayers")]
    pub player_count: u32,
    /// One slot is always reserved for the owner
    #[serde(rename = "MaxPlayers")]
    pub max_player_count: u32,
    /// Code for `Servers > Join by Code`. Unique but changeable, so not an ID.
    #[serde(rename = "JoinKey")]
    pub join_code: String,
    #[serde(rename = "AccVerifiedReq")]
    pub account_verification_level_required: AccountVerificationRequirement,
    /// The civilian team is never limited
    #[serde(rename = "TeamBalance")]
    pub auto_team_balance_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_info_from_wire_format() {
        let info: ServerInfo = serde_json::from_value(json!({
            "Name": "Liberty County RP",
            "OwnerId": 1,
            "CoOwnerIds": [2, 3],
            "CurrentPlayers": 12,
            "MaxPlayers": 40,
            "JoinKey": "abcde",
            "AccVerifiedReq": "Phone/ID",
            "TeamBalance": true
        }))
        .unwrap();

        assert_eq!(info.name, "Liberty County RP");
        assert_eq!(info.co_owner_user_ids, vec![2, 3]);
        assert_eq!(info.join_code, "abcde");
        assert_eq!(
            info.account_verification_level_required,
            AccountVerificationRequirement::PhoneOrId
        );
        assert!(info.auto_team_balance_enabled);
    }

    #[test]
    fn test_deep_link_format_parsing() {
        assert_eq!(
            "directToApp".parse::<DeepLinkFormat>().unwrap(),
            DeepLinkFormat::Direct
        );
        assert_eq!(
            "PRCWEBSITE".parse::<DeepLinkFormat>().unwrap(),
            DeepLinkFormat::ViaPrcWebsite
        );
        assert!(matches!(
            "carrier-pigeon".parse::<DeepLinkFormat>(),
            Err(SdkError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_permission_level_wire_values() {
        let level: PermissionLevel = serde_json::from_value(json!("Server Moderator")).unwrap();
        assert_eq!(level, PermissionLevel::Moderator);
        assert_eq!(
            serde_json::to_value(PermissionLevel::None).unwrap(),
            json!("Normal")
        );
    }
}
