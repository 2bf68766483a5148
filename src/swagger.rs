use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{OrderStatus, ProductStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::login,
        handlers::user::get_profile,
        handlers::user::get_points_ledger,
        handlers::product::list_products,
        handlers::order::create_order,
        handlers::order::get_orders,
        handlers::order::confirm_order,
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            UserResponse,
            LedgerEntryResponse,
            LedgerResponse,
            ProductStatus,
            ProductResponse,
            ProductListResponse,
            OrderStatus,
            CreateOrderRequest,
            CreateOrderResponse,
            ConfirmOrderResponse,
            OrderResponse,
            OrderQuery,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "Buyer login and points API"),
        (name = "product", description = "Product catalog API"),
        (name = "order", description = "Order checkout and payment confirmation API"),
    ),
    info(
        title = "Checkout Backend API",
        version = "1.0.0",
        description = "Order checkout and points payment REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
