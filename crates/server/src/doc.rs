//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects the annotated handlers into the document served at
//! [`OPENAPI_PATH`] and rendered by Swagger UI under [`SWAGGER_PATH`].

use crate::error::{ErrorDetail, ErrorResponse};
use crate::routes::records::{
    CreateRecordRequest, CreateResponse, ListResponse, RecordBody, StatusResponse,
    UpdateRecordRequest,
};
use crate::routes::token::TokenResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Mount point of the Swagger UI.
pub const SWAGGER_PATH: &str = "/swagger";

/// Location of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Registers the bearer token scheme referenced by guarded operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .build();
        components.add_security_scheme("bearer", SecurityScheme::Http(bearer));
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rolodex API",
        description = "Create, list, update and delete name/email records behind a bearer token.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    paths(
        crate::routes::token::issue_token,
        crate::routes::records::list_records,
        crate::routes::records::create_record,
        crate::routes::records::delete_record,
        crate::routes::records::update_record,
    ),
    components(schemas(
        RecordBody,
        CreateRecordRequest,
        UpdateRecordRequest,
        ListResponse,
        CreateResponse,
        StatusResponse,
        TokenResponse,
        ErrorResponse,
        ErrorDetail,
    )),
    tags(
        (name = "records", description = "Record CRUD"),
        (name = "auth", description = "Bearer token issuance")
    )
)]
pub struct ApiDoc;
