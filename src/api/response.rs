// Manager API response bodies

use serde::Serialize;

/// Body returned by the add and delete endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiReply {
    pub fn ok(component_name: impl Into<String>) -> Self {
        Self {
            success: true,
            component_name: Some(component_name.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            component_name: None,
            error: Some(error.into()),
        }
    }
}

/// Body of a 404 on the manager listener
#[derive(Debug, Serialize)]
pub struct NotFoundReply {
    pub error: &'static str,
    pub available_endpoints: [&'static str; 4],
}

pub const NOT_FOUND: NotFoundReply = NotFoundReply {
    error: "Not Found",
    available_endpoints: ["/", "/api/components", "/api/add", "/api/delete"],
};
