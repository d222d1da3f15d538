use serde::Serialize;

/// Identity metadata resolved from an external directory. Enrichment only.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub user_key: String,
    pub display_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ChannelProfile {
    pub channel_key: String,
    pub name: Option<String>,
    pub kind: Option<String>, // public, private, im, mpim
}
