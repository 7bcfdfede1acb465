//! Repository and proxy API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /qrs/about` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct About {
    /// Server build version.
    pub build_version: String,
    /// Server build date.
    pub build_date: String,
    /// Repository database provider.
    pub database_provider: String,
    /// Node type code.
    pub node_type: i64,
    /// Schema path of the entity.
    pub schema_path: String,
}

/// An application as returned by the repository API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationResult {
    /// Repository id of the app.
    pub id: String,
    /// Creation time.
    pub created_date: Option<DateTime<Utc>>,
    /// Last modification time.
    pub modified_date: Option<DateTime<Utc>>,
    /// User that last modified the app.
    pub modified_by_user_name: String,
    /// Custom properties attached to the app.
    #[serde(alias = "customProperites")]
    pub custom_properties: Vec<CustomProperty>,
    /// Owning user.
    pub owner: Option<Owner>,
    /// App name.
    pub name: String,
    /// Engine app id.
    pub app_id: String,
    /// Publish time.
    pub publish_time: Option<DateTime<Utc>>,
    /// Whether the app is published to a stream.
    pub published: bool,
    /// Tags, passed through untouched.
    pub tags: Vec<serde_json::Value>,
    /// App description.
    pub description: String,
    /// Stream the app is published to.
    pub stream: Option<Stream>,
    /// App file size in bytes.
    pub file_size: i64,
    /// Last reload time.
    pub last_reload_time: Option<DateTime<Utc>>,
    /// Thumbnail reference.
    pub thumbnail: String,
    /// Product version that last saved the app.
    pub saved_in_product_version: String,
    /// Migration hash.
    pub migration_hash: String,
    /// Caller privileges on the app.
    pub privileges: Option<Privileges>,
    /// Schema path of the entity.
    pub schema_path: String,
}

/// A custom property value; kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomProperty(pub serde_json::Value);

/// Owning user of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Owner {
    /// User id.
    pub user_id: String,
    /// User directory.
    pub user_directory: String,
    /// Display name.
    pub name: String,
    /// Repository id.
    pub id: String,
}

/// A stream an app can be published to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stream {
    /// Stream name.
    pub name: String,
    /// Repository id.
    pub id: String,
    /// Caller privileges on the stream.
    pub privileges: Option<Privileges>,
}

/// Privilege list; kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privileges(pub serde_json::Value);

/// Body of a `POST /qps/ticket` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRequest {
    /// User directory.
    #[serde(rename = "UserDirectory")]
    pub user_directory: String,
    /// User id.
    #[serde(rename = "UserId")]
    pub user_id: String,
}

/// Authentication ticket issued by the proxy API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Ticket {
    /// User directory the ticket was issued for.
    pub user_directory: String,
    /// User id the ticket was issued for.
    pub user_id: String,
    /// Extra attributes, passed through untouched.
    pub attributes: Vec<serde_json::Value>,
    /// The ticket itself.
    pub ticket: String,
    /// Redirect target, if any.
    pub target_uri: Option<String>,
}
