//! Parameter objects for `CreateObject` sheet commands.

use serde::{Deserialize, Serialize};

/// Object identity and type (`qInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Object id.
    #[serde(rename = "qId", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Object type, e.g. `sheet`.
    #[serde(rename = "qType", default, skip_serializing_if = "String::is_empty")]
    pub object_type: String,
}

/// Property paths the engine reports for each child object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildListData {
    /// Path of the child title.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Path of the child description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Path of the child metadata.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meta: String,
    /// Path of the child sort order.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub order: String,
    /// Path of the child object type.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub object_type: String,
    /// Path of the child object id.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Path of the child list object definition.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lb: String,
    /// Path of the child hypercube definition.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hc: String,
}

/// Child list definition (`qChildListDef`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildListDef {
    /// Data paths, see [`ChildListData`].
    #[serde(rename = "qData", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChildListData>,
}

/// Sheet metadata (`qMetaDef`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDef {
    /// Sheet title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Sheet description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Optional child list definition.
    #[serde(
        rename = "qChildListDef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub child_list_def: Option<ChildListDef>,
}

/// Properties of a sheet created with `CreateObject`.
///
/// Unknown keys are rejected so that a [`SheetParamsEx`] object never
/// decodes as this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetParams {
    /// Title and description.
    #[serde(rename = "qMetaDef", default, skip_serializing_if = "Option::is_none")]
    pub meta_def: Option<MetaDef>,
    /// Position among the app's sheets.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rank: i64,
    /// Thumbnail reference.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumbnail: String,
    /// Grid columns.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub columns: i64,
    /// Grid rows.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rows: i64,
    /// Cell definitions, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<serde_json::Value>,
    /// Object identity.
    #[serde(rename = "qInfo", default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
}

impl SheetParams {
    /// Builds sheet properties with `qInfo.qType` set to `sheet`.
    #[must_use]
    pub fn new(
        title: &str,
        description: &str,
        thumbnail: &str,
        id: &str,
        rows: i64,
        columns: i64,
        rank: i64,
    ) -> Self {
        Self {
            meta_def: Some(MetaDef {
                title: title.to_string(),
                description: description.to_string(),
                child_list_def: None,
            }),
            rank,
            thumbnail: thumbnail.to_string(),
            columns,
            rows,
            cells: Vec::new(),
            info: Some(Info {
                id: id.to_string(),
                object_type: "sheet".to_string(),
            }),
        }
    }
}

/// Sheet properties with a child list definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetParamsEx {
    /// Sheet title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Sheet description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Object identity.
    #[serde(rename = "qInfo", default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Child list definition.
    #[serde(
        rename = "qChildListDef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub child_list_def: Option<ChildListDef>,
}

impl SheetParamsEx {
    /// Builds sheet properties whose child list reports the standard
    /// property paths.
    #[must_use]
    pub fn new(title: &str, description: &str, id: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            info: Some(Info {
                id: id.to_string(),
                object_type: "sheet".to_string(),
            }),
            child_list_def: Some(ChildListDef {
                data: Some(ChildListData {
                    title: "/title".to_string(),
                    description: "/description".to_string(),
                    meta: "/meta".to_string(),
                    order: "/order".to_string(),
                    object_type: "/qInfo/qType".to_string(),
                    id: "/qInfo/qId".to_string(),
                    lb: "/qListObjectDef".to_string(),
                    hc: "/qHyperCubeDef".to_string(),
                }),
            }),
        }
    }
}

const fn is_zero(v: &i64) -> bool {
    *v == 0
}
