use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::models::{Acknowledgment, CategoryPayload};
use crate::query::ListParams;
use crate::state::AppState;

async fn list_categories(
    data: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let service = data.category_service();
    let response = web::block(move || service.list(params.into_inner())).await??;
    Ok(HttpResponse::Ok().json(response))
}

async fn show_category(data: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let service = data.category_service();
    let id = id.into_inner();
    let category = web::block(move || service.show(id)).await??;
    Ok(HttpResponse::Ok().json(category))
}

async fn create_category(
    data: web::Data<AppState>,
    payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
    let service = data.category_service();
    let category = web::block(move || service.create(payload.into_inner())).await??;
    Ok(HttpResponse::Created()
        .json(Acknowledgment::success("Category created successfully.").with_category(category)))
}

async fn update_category(
    data: web::Data<AppState>,
    id: web::Path<i32>,
    payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
    let service = data.category_service();
    let id = id.into_inner();
    let category = web::block(move || service.update(id, payload.into_inner())).await??;
    Ok(HttpResponse::Ok()
        .json(Acknowledgment::success("Category updated successfully.").with_category(category)))
}

async fn delete_category(data: web::Data<AppState>, id: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let service = data.category_service();
    let id = id.into_inner();
    web::block(move || service.delete(id)).await??;
    Ok(HttpResponse::Ok().json(Acknowledgment::success("Category deleted successfully.")))
}

async fn list_products(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = data.products.clone();
    let rows = web::block(move || products.list_with_category()).await??;
    Ok(HttpResponse::Ok().json(rows))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/categories", web::get().to(list_categories))
        .route("/categories", web::post().to(create_category))
        .route("/categories/{id}", web::get().to(show_category))
        .route("/categories/{id}", web::put().to(update_category))
        .route("/categories/{id}", web::delete().to(delete_category))
        .route("/products", web::get().to(list_products));
}
