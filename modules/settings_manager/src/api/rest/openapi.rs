//! OpenAPI document for the settings REST surface

use super::{dto::*, error::Problem, handlers};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Settings Manager API",
        description = "Bag/group scoped settings with dotted keys"
    ),
    tags(
        (name = "Settings", description = "Read, write and delete scoped settings")
    ),
    paths(
        handlers::list_settings,
        handlers::get_setting,
        handlers::upsert_setting,
        handlers::delete_setting,
        handlers::clear_cache,
    ),
    components(schemas(
        SettingDto,
        SettingValueResponse,
        UpdateSettingRequest,
        SettingsListResponse,
        Problem,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/settings"));
        assert!(doc.paths.paths.contains_key("/settings/{key}"));
        assert!(doc.paths.paths.contains_key("/settings-cache/clear"));
    }
}
