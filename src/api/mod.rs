// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AccessTokenResponse, AccountType, AssetResponse, BeneficiaryRelation, BeneficiaryResponse,
        CreateAssetRequest, CreateBeneficiaryRequest, CreateMonetaryRequest,
        CreateTrusteeRequest, DashboardResponse, Gender, GrantorResponse, LoginRequest,
        MessageResponse, MonetaryResponse, RegisterGrantorRequest, TrusteeRelation,
        TrusteeResponse, UpdateAssetRequest, UpdateBeneficiaryRequest, UpdateGrantorRequest,
        UpdateMonetaryRequest, UpdateTrusteeRequest,
    },
    state::AppState,
};

pub mod assets;
pub mod auth;
pub mod beneficiaries;
pub mod documents;
pub mod grantors;
pub mod health;
pub mod monetaries;
pub mod payload;
pub mod trustees;


pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        // Grantors
        .route("/grantors/account/create", post(grantors::create_grantor))
        .route(
            "/grantors/account/dashboard/{grantor_id}",
            get(grantors::dashboard),
        )
        .route(
            "/grantors/account/dashboard/{grantor_id}/update",
            put(grantors::update_grantor),
        )
        .route(
            "/grantors/account/dashboard/{grantor_id}/delete",
            delete(grantors::delete_grantor),
        )
        // Auth
        .route("/auths/account/login", post(auth::login))
        .route("/auths/account/token", post(auth::token))
        // Trustees
        .route(
            "/trustees/account/{grantor_id}/create/trustee",
            post(trustees::create_trustee),
        )
        .route(
            "/trustees/account/{grantor_id}/trustees",
            get(trustees::list_trustees),
        )
        .route(
            "/trustees/account/{grantor_id}/trustees/{trustee_id}",
            get(trustees::get_trustee),
        )
        .route(
            "/trustees/account/{grantor_id}/trustees/{trustee_id}/update",
            put(trustees::update_trustee),
        )
        .route(
            "/trustees/account/{grantor_id}/trustees/{trustee_id}/delete",
            delete(trustees::delete_trustee),
        )
        .route(
            "/trustees/account/trustee/{trustee_id}/dashboard",
            get(trustees::trustee_dashboard),
        )
        // Beneficiaries
        .route(
            "/beneficiaries/account/{grantor_id}/create/beneficiary",
            post(beneficiaries::create_beneficiary),
        )
        .route(
            "/beneficiaries/account/{grantor_id}/beneficiaries",
            get(beneficiaries::list_beneficiaries),
        )
        .route(
            "/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}",
            get(beneficiaries::get_beneficiary),
        )
        .route(
            "/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}/update",
            put(beneficiaries::update_beneficiary),
        )
        .route(
            "/beneficiaries/account/{grantor_id}/beneficiaries/{bene_id}/delete",
            delete(beneficiaries::delete_beneficiary),
        )
        // Assets
        .route(
            "/assets/{grantor_id}/create/asset",
            post(assets::create_asset),
        )
        .route(
            "/assets/grantor/{grantor_id}/assets",
            get(assets::list_assets),
        )
        .route(
            "/assets/beneficiary/{bene_id}/assets",
            get(assets::list_beneficiary_assets),
        )
        .route(
            "/assets/{grantor_id}/assets/{asset_id}",
            get(assets::get_asset),
        )
        .route(
            "/assets/{grantor_id}/assets/{asset_id}/update",
            put(assets::update_asset),
        )
        .route(
            "/assets/{grantor_id}/assets/{asset_id}/delete",
            delete(assets::delete_asset),
        )
        .route(
            "/assets/asset/download/{file_name}",
            get(assets::download_asset_document),
        )
        // Monetaries
        .route(
            "/monetaries/asset/{grantor_id}/create/monetary",
            post(monetaries::create_monetary),
        )
        .route(
            "/monetaries/asset/grantor/{grantor_id}/assets",
            get(monetaries::list_monetaries),
        )
        .route(
            "/monetaries/asset/beneficiary/{bene_id}/assets",
            get(monetaries::list_beneficiary_monetaries),
        )
        .route(
            "/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}",
            get(monetaries::get_monetary),
        )
        .route(
            "/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}/update",
            put(monetaries::update_monetary),
        )
        .route(
            "/monetaries/asset/grantor/{grantor_id}/assets/{monetary_id}/delete",
            delete(monetaries::delete_monetary),
        )
        .route(
            "/monetaries/asset/download/{file_name}",
            get(monetaries::download_monetary_document),
        );

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(payload::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = MessageResponse))
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to Estate Trust."))
}

/// Registers the bearer token scheme and the Basic scheme used by the token
/// exchange route.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Estate Trust API",
        description = "Grantors, trustees, beneficiaries and the assets willed between them."
    ),
    paths(
        welcome,
        health::health,
        health::liveness,
        health::readiness,
        grantors::create_grantor,
        grantors::dashboard,
        grantors::update_grantor,
        grantors::delete_grantor,
        auth::login,
        auth::token,
        trustees::create_trustee,
        trustees::list_trustees,
        trustees::get_trustee,
        trustees::update_trustee,
        trustees::delete_trustee,
        trustees::trustee_dashboard,
        beneficiaries::create_beneficiary,
        beneficiaries::list_beneficiaries,
        beneficiaries::get_beneficiary,
        beneficiaries::update_beneficiary,
        beneficiaries::delete_beneficiary,
        assets::create_asset,
        assets::list_assets,
        assets::list_beneficiary_assets,
        assets::get_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::download_asset_document,
        monetaries::create_monetary,
        monetaries::list_monetaries,
        monetaries::list_beneficiary_monetaries,
        monetaries::get_monetary,
        monetaries::update_monetary,
        monetaries::delete_monetary,
        monetaries::download_monetary_document
    ),
    components(
        schemas(
            Gender,
            TrusteeRelation,
            BeneficiaryRelation,
            AccountType,
            MessageResponse,
            RegisterGrantorRequest,
            UpdateGrantorRequest,
            GrantorResponse,
            DashboardResponse,
            LoginRequest,
            AccessTokenResponse,
            CreateTrusteeRequest,
            UpdateTrusteeRequest,
            TrusteeResponse,
            CreateBeneficiaryRequest,
            UpdateBeneficiaryRequest,
            BeneficiaryResponse,
            CreateAssetRequest,
            UpdateAssetRequest,
            AssetResponse,
            CreateMonetaryRequest,
            UpdateMonetaryRequest,
            MonetaryResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Welcome message and health probes"),
        (name = "Grantors", description = "Grantor registration and dashboard"),
        (name = "Auth", description = "Login and token exchange"),
        (name = "Trustees", description = "Trustees appointed by a grantor"),
        (name = "Beneficiaries", description = "Beneficiaries registered by a grantor"),
        (name = "Assets", description = "Physical assets and their documents"),
        (name = "Monetaries", description = "Bank holdings and their documents")
    )
)]
struct ApiDoc;
