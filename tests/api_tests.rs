mod common;

use reqwest::StatusCode;
use serde_json::json;

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Registration & Login ────────────────────────────────────────

#[tokio::test]
async fn register_and_login() {
    let Some(app) = common::spawn_app().await else { return };

    let (body, status) = app
        .register("user@test.com", "user1", "0812-000-1000", "USR1")
        .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["email"], json!("user@test.com"));
    // The password hash never leaves the server.
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (body, status) = app.login("user@test.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tokens"]["accessToken"].is_string());
    assert!(body["data"]["tokens"]["refreshToken"].is_string());

    common::cleanup(app).await;
}

#[tokio::test]
async fn register_duplicate_email_conflict() {
    let Some(app) = common::spawn_app().await else { return };

    let (_, status) = app
        .register("dup@test.com", "dup1", "0812-000-2000", "DUP1")
        .await;
    assert_eq!(status, StatusCode::OK);

    // Same email, everything else unique: the conflict names the email field.
    let (body, status) = app
        .register("dup@test.com", "dup2", "0812-000-2001", "DUP2")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("CONFLICT"));
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn register_weak_password_itemized() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "weak@test.com",
            "password": "short",
            "name": "Weak",
            "username": "weak",
            "phone": "0812-000-3000",
            "role": "cashier",
            "code": "WK1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    let details = body["error"]["details"].as_array().unwrap();
    assert!(details.len() >= 3, "expected itemized reasons: {details:?}");

    common::cleanup(app).await;
}

#[tokio::test]
async fn register_unknown_role_rejected() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "wizard@test.com",
            "password": common::PASSWORD,
            "name": "Wizard",
            "username": "wizard",
            "phone": "0812-000-4000",
            "role": "wizard",
            "code": "WIZ1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_wrong_password_is_generic() {
    let Some(app) = common::spawn_app().await else { return };
    app.bootstrap().await;

    let (body, status) = app.login("admin@test.com", "Wr0ngPass!word").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"]["message"],
        json!("Invalid email or password")
    );

    // Unknown email gets the identical message.
    let (body, status) = app.login("nobody@test.com", "Wr0ngPass!word").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"]["message"],
        json!("Invalid email or password")
    );

    common::cleanup(app).await;
}

// ── Token Refresh ───────────────────────────────────────────────

#[tokio::test]
async fn refresh_rotation_is_single_use() {
    let Some(app) = common::spawn_app().await else { return };
    let (_, refresh) = app.bootstrap().await;

    // First exchange succeeds and returns a different pair.
    let (body, status) = app.refresh(&refresh).await;
    assert_eq!(status, StatusCode::OK, "first refresh failed: {body}");
    let new_refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // Replaying the consumed token fails.
    let (_, status) = app.refresh(&refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (_, status) = app.refresh(&access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, refresh) = app.bootstrap().await;

    let (_, status) = app
        .post_auth(
            "/api/auth/logout",
            &access,
            &json!({ "refreshToken": refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.refresh(&refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logging out the same token again is a no-op, not an error.
    let (_, status) = app
        .post_auth(
            "/api/auth/logout",
            &access,
            &json!({ "refreshToken": refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn change_password_revokes_sessions() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, refresh) = app.bootstrap().await;

    let (body, status) = app
        .post_auth(
            "/api/auth/change-password",
            &access,
            &json!({
                "currentPassword": common::PASSWORD,
                "newPassword": "N3wSecret!pass",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "change password failed: {body}");

    // Every previously issued refresh token is dead.
    let (_, status) = app.refresh(&refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The old password no longer logs in, the new one does.
    let (_, status) = app.login("admin@test.com", common::PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (_, status) = app.login("admin@test.com", "N3wSecret!pass").await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn change_password_wrong_current() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, status) = app
        .post_auth(
            "/api/auth/change-password",
            &access,
            &json!({
                "currentPassword": "Not$The1Password",
                "newPassword": "N3wSecret!pass",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"]["message"],
        json!("Current password is incorrect")
    );

    common::cleanup(app).await;
}

#[tokio::test]
async fn me_and_validate() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, status) = app.get_auth("/api/auth/me", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("admin@test.com"));

    let (body, status) = app.get_auth("/api/auth/validate", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], json!(true));
    assert_eq!(body["data"]["user"]["role"], json!("admin"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let Some(app) = common::spawn_app().await else { return };

    let resp = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("AUTHENTICATION_ERROR"));

    common::cleanup(app).await;
}

// ── Catalog CRUD ────────────────────────────────────────────────

#[tokio::test]
async fn bank_crud_with_uniqueness() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, status) = app
        .post_auth(
            "/api/banks",
            &access,
            &json!({ "code": "bca", "name": "Bank Central Asia" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create bank failed: {body}");
    // Codes are normalized to uppercase.
    assert_eq!(body["data"]["code"], json!("BCA"));
    let id = body["data"]["id"].as_i64().unwrap();

    // Duplicate code conflicts and names the field.
    let (body, status) = app
        .post_auth(
            "/api/banks",
            &access,
            &json!({ "code": "BCA", "name": "Another Bank" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"].as_str().unwrap().contains("code"));

    // Natural-key lookup.
    let (body, status) = app.get_auth("/api/banks/code/bca", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(id));

    // Updating a row to its own values is not a conflict.
    let (body, status) = app
        .put_auth(
            &format!("/api/banks/{id}"),
            &access,
            &json!({ "code": "BCA", "name": "Bank Central Asia" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "self update failed: {body}");

    // Bad code shape is a validation error.
    let (_, status) = app
        .post_auth(
            "/api/banks",
            &access,
            &json!({ "code": "TOOLONG", "name": "Long Bank" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn bank_delete_blocked_by_account_numbers() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, _) = app
        .post_auth(
            "/api/banks",
            &access,
            &json!({ "code": "BRI", "name": "Bank Rakyat" }),
        )
        .await;
    let bank_id = body["data"]["id"].as_i64().unwrap();

    let (body, status) = app
        .post_auth(
            "/api/account-numbers",
            &access,
            &json!({ "number": "1234567890", "holder": "PT Posdesk", "bankCode": "BRI" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create account failed: {body}");
    let account_id = body["data"]["id"].as_i64().unwrap();

    // Delete is blocked while an account references the bank.
    let (body, status) = app
        .delete_auth(&format!("/api/banks/{bank_id}"), &access)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("account numbers"));

    // Removing the reference unblocks the delete.
    let (_, status) = app
        .delete_auth(&format!("/api/account-numbers/{account_id}"), &access)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .delete_auth(&format!("/api/banks/{bank_id}"), &access)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .get_auth(&format!("/api/banks/{bank_id}"), &access)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn account_number_requires_known_bank() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (_, status) = app
        .post_auth(
            "/api/account-numbers",
            &access,
            &json!({ "number": "9876543210", "holder": "Nobody", "bankCode": "XXX" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Pagination ──────────────────────────────────────────────────

#[tokio::test]
async fn list_pagination_and_search() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    for (code, name) in [
        ("#FF0000", "Crimson Red"),
        ("#00FF00", "Forest Green"),
        ("#0000FF", "Ocean Blue"),
    ] {
        let (body, status) = app
            .post_auth("/api/colors", &access, &json!({ "code": code, "name": name }))
            .await;
        assert_eq!(status, StatusCode::OK, "create color failed: {body}");
    }

    // Malformed page and oversized limit clamp instead of failing.
    let (body, status) = app
        .get_auth("/api/colors?page=-5&limit=9999", &access)
        .await;
    assert_eq!(status, StatusCode::OK);
    let meta = &body["metadata"];
    assert_eq!(meta["page"], json!(1));
    assert_eq!(meta["limit"], json!(100));
    assert_eq!(meta["total"], json!(3));
    assert_eq!(meta["totalPages"], json!(1));
    assert_eq!(meta["hasNext"], json!(false));
    assert_eq!(meta["hasPrev"], json!(false));

    // Page size 2 splits into two pages.
    let (body, _) = app.get_auth("/api/colors?limit=2&page=2", &access).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["metadata"]["totalPages"], json!(2));
    assert_eq!(body["metadata"]["hasPrev"], json!(true));
    assert_eq!(body["metadata"]["hasNext"], json!(false));

    // Case-insensitive search across code and name.
    let (body, _) = app.get_auth("/api/colors?search=green", &access).await;
    assert_eq!(body["metadata"]["total"], json!(1));
    assert_eq!(body["data"][0]["name"], json!("Forest Green"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_list_rejects_unknown_role_filter() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (_, status) = app.get_auth("/api/users?role=wizard", &access).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (body, status) = app.get_auth("/api/users?role=admin", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["total"], json!(1));

    common::cleanup(app).await;
}

// ── User management ─────────────────────────────────────────────

#[tokio::test]
async fn admin_creates_user_with_generated_password() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, status) = app
        .post_auth(
            "/api/users",
            &access,
            &json!({
                "email": "cashier@test.com",
                "name": "Cashier One",
                "username": "cashier1",
                "phone": "0812-000-5000",
                "role": "cashier",
                "code": "CSH1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create user failed: {body}");

    let generated = body["data"]["generatedPassword"].as_str().unwrap();
    let (_, status) = app.login("cashier@test.com", generated).await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn non_admin_cannot_manage_users() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, _) = app
        .post_auth(
            "/api/users",
            &access,
            &json!({
                "email": "clerk@test.com",
                "name": "Clerk",
                "username": "clerk",
                "phone": "0812-000-6000",
                "role": "cashier",
                "code": "CLK1",
            }),
        )
        .await;
    let generated = body["data"]["generatedPassword"].as_str().unwrap();

    let (body, _) = app.login("clerk@test.com", generated).await;
    let clerk_access = body["data"]["tokens"]["accessToken"].as_str().unwrap();

    let (body, status) = app.get_auth("/api/users", clerk_access).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "expected 403: {body}");
    assert_eq!(body["error"]["code"], json!("AUTHORIZATION_ERROR"));

    // Catalog writes require manager or above.
    let (_, status) = app
        .post_auth(
            "/api/banks",
            clerk_access,
            &json!({ "code": "BNI", "name": "Bank Negara" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_stats_by_role() {
    let Some(app) = common::spawn_app().await else { return };
    let (access, _) = app.bootstrap().await;

    let (body, status) = app.get_auth("/api/users/stats", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["byRole"]["admin"], json!(1));

    common::cleanup(app).await;
}
