use crate::middlewares::current_user_id;
use crate::models::*;
use crate::services::{PointsService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/users/log-in",
    tag = "user",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = TokenResponse),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn login(
    user_service: web::Data<UserService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match user_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取用户资料成功", body = UserResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.get_user_profile(user_id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/me/points-ledger",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取积分流水成功", body = LedgerResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_points_ledger(
    points_service: web::Data<PointsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match current_user_id(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match points_service.get_ledger(user_id).await {
        Ok(ledger) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ledger
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/log-in", web::post().to(login))
            .route("/me", web::get().to(get_profile))
            .route("/me/points-ledger", web::get().to(get_points_ledger)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PointsBackend;
    use crate::middlewares::AuthMiddleware;
    use crate::test_support::{seed_user, setup_db};
    use crate::utils::JwtService;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_login_then_profile_and_ledger() {
        let db = setup_db().await;
        let user = seed_user(&db, "a@example.com", 0).await;
        let jwt = JwtService::new("test-secret", 3600);
        let points = PointsService::new(db.clone(), PointsBackend::Ledger);
        points.top_up(user.id, 250).await.unwrap();

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(UserService::new(
                    db.clone(),
                    jwt.clone(),
                    PointsBackend::Ledger,
                )))
                .app_data(web::Data::new(points))
                .service(web::scope("/api/v1").configure(user_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users/log-in")
            .set_json(&LoginRequest {
                email: "a@example.com".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        let token = json["data"]["token"].as_str().unwrap().to_string();
        let auth = ("Authorization", format!("Bearer {token}"));

        let req = test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(auth.clone())
            .to_request();
        let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(json["data"]["points"], 250);
        assert_eq!(json["data"]["email"], "a@example.com");

        let req = test::TestRequest::get()
            .uri("/api/v1/users/me/points-ledger")
            .insert_header(auth)
            .to_request();
        let json: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(json["data"]["entries"][0]["version"], 1);
        assert_eq!(json["data"]["entries"][0]["points"], 250);
    }

    #[actix_web::test]
    async fn test_login_unknown_email_is_404() {
        let db = setup_db().await;
        let jwt = JwtService::new("test-secret", 3600);
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .app_data(web::Data::new(UserService::new(
                    db.clone(),
                    jwt,
                    PointsBackend::Counter,
                )))
                .service(web::scope("/api/v1").configure(user_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users/log-in")
            .set_json(&LoginRequest {
                email: "nobody@example.com".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
