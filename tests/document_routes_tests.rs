mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, titles};
use docvault::{
    models::Access,
    policy::{ADMIN, SUPER_ADMIN, USER},
};
use serde_json::json;

/// A custom role ("Editor", id 4) and one user holding it.
async fn editor(ctx: &TestContext) -> docvault::models::User {
    let role = ctx.repo.create_role("Editor").await.unwrap();
    ctx.user("editor@example.com", role.id).await
}

// --- Visibility ---

#[tokio::test]
async fn public_documents_are_visible_to_every_user() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner@example.com", USER).await;
    let other = ctx.user("other@example.com", USER).await;
    let editor = editor(&ctx).await;
    let doc = ctx.document(&owner, "Public Notes", Access::Public).await;

    for user in [&owner, &other, &editor] {
        let (status, body) = ctx
            .get(&format!("/api/v1/documents/{}", doc.id), &ctx.token(user))
            .await;
        assert_eq!(status, StatusCode::OK, "user {} denied", user.email);
        assert_eq!(body["title"], "Public Notes");
    }
}

#[tokio::test]
async fn private_documents_are_visible_to_owner_and_admin_tier_only() {
    let ctx = TestContext::new();
    let root = ctx.user("root@example.com", SUPER_ADMIN).await;
    let admin = ctx.user("admin@example.com", ADMIN).await;
    let owner = ctx.user("owner@example.com", USER).await;
    let other = ctx.user("other@example.com", USER).await;
    let doc = ctx.document(&owner, "Diary", Access::Private).await;
    let uri = format!("/api/v1/documents/{}", doc.id);

    for user in [&owner, &admin, &root] {
        let (status, _) = ctx.get(&uri, &ctx.token(user)).await;
        assert_eq!(status, StatusCode::OK, "user {} denied", user.email);
    }

    let (status, body) = ctx.get(&uri, &ctx.token(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to view this document");
}

#[tokio::test]
async fn role_documents_follow_the_owners_role() {
    let ctx = TestContext::new();
    let admin = ctx.user("admin@example.com", ADMIN).await;
    let owner = ctx.user("owner@example.com", USER).await;
    let colleague = ctx.user("colleague@example.com", USER).await;
    let editor = editor(&ctx).await;
    let doc = ctx.document(&owner, "Team Plan", Access::Role).await;
    let uri = format!("/api/v1/documents/{}", doc.id);

    assert_eq!(ctx.get(&uri, &ctx.token(&colleague)).await.0, StatusCode::OK);
    assert_eq!(ctx.get(&uri, &ctx.token(&admin)).await.0, StatusCode::OK);
    assert_eq!(ctx.get(&uri, &ctx.token(&editor)).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listings_only_contain_documents_the_viewer_may_read() {
    let ctx = TestContext::new();
    let admin = ctx.user("admin@example.com", ADMIN).await;
    let alice = ctx.user("alice@example.com", USER).await;
    let bob = ctx.user("bob@example.com", USER).await;
    let editor = editor(&ctx).await;

    ctx.document(&alice, "alice public", Access::Public).await;
    ctx.document(&alice, "alice private", Access::Private).await;
    ctx.document(&alice, "alice role", Access::Role).await;
    ctx.document(&bob, "bob private", Access::Private).await;

    let (status, page) = ctx.get("/api/v1/documents", &ctx.token(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), vec!["bob private", "alice role", "alice public"]);
    assert_eq!(page["metaData"]["totalCount"], 3);

    let (_, page) = ctx.get("/api/v1/documents", &ctx.token(&editor)).await;
    assert_eq!(titles(&page), vec!["alice public"]);

    let (_, page) = ctx.get("/api/v1/documents", &ctx.token(&admin)).await;
    assert_eq!(page["metaData"]["totalCount"], 4);

    // Every listed document can also be fetched individually.
    let token = ctx.token(&editor);
    let (_, page) = ctx.get("/api/v1/documents", &token).await;
    for row in page["rows"].as_array().unwrap() {
        let (status, _) = ctx
            .get(&format!("/api/v1/documents/{}", row["id"]), &token)
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

// --- Create ---

#[tokio::test]
async fn create_document_validates_every_field() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);

    let cases = [
        (json!({ "content": "c", "access": "Public" }), "Title is Required"),
        (json!({ "title": "  ", "content": "c", "access": "Public" }), "Title is Required"),
        (json!({ "title": "t", "access": "Public" }), "Content is Required"),
        (json!({ "title": "t", "content": "c" }), "Access is Required"),
        (json!({ "title": "t", "content": "c", "access": "Secret" }), "Invalid Access Type"),
    ];
    for (body, message) in cases {
        let (status, response) = ctx.post("/api/v1/documents", Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], message);
    }

    let (status, response) = ctx
        .post(
            "/api/v1/documents",
            Some(&token),
            json!({ "title": "Roadmap", "content": "Q3 goals", "access": "Role" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "Document successfully created");
    assert_eq!(response["createdDocument"]["userId"], user.id);
    assert_eq!(response["createdDocument"]["access"], "Role");
}

#[tokio::test]
async fn titles_are_unique_on_create_and_update() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);
    ctx.document(&user, "Taken", Access::Public).await;
    let other = ctx.document(&user, "Free", Access::Public).await;

    let (status, body) = ctx
        .post(
            "/api/v1/documents",
            Some(&token),
            json!({ "title": "Taken", "content": "c", "access": "Public" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Title already exists");

    let (status, body) = ctx
        .put(
            &format!("/api/v1/documents/{}", other.id),
            &token,
            json!({ "title": "Taken" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Title already exists");
}

// --- Pagination ---

#[tokio::test]
async fn document_listing_is_paginated_newest_first() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);
    for title in ["first", "second", "third"] {
        ctx.document(&user, title, Access::Public).await;
    }

    let (status, page) = ctx.get("/api/v1/documents?limit=2", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), vec!["third", "second"]);
    assert_eq!(
        page["metaData"],
        json!({ "page": 1, "pageCount": 2, "count": 2, "totalCount": 3 })
    );

    let (_, page) = ctx.get("/api/v1/documents?limit=2&offset=2", &token).await;
    assert_eq!(titles(&page), vec!["first"]);
    assert_eq!(page["metaData"]["page"], 2);

    // Past the end: an empty page, not an error.
    let (status, page) = ctx.get("/api/v1/documents?offset=10", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(titles(&page).is_empty());
    assert_eq!(page["metaData"]["count"], 0);
    assert_eq!(page["metaData"]["totalCount"], 3);
}

#[tokio::test]
async fn bad_paging_parameters_are_rejected() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);

    let cases = [
        ("limit=abc", "Invalid Limit"),
        ("limit=0", "Invalid Limit"),
        ("offset=-1", "Invalid Offset"),
        ("limit=-5&offset=x", "Invalid Limit and Offset"),
    ];
    for (query, message) in cases {
        let (status, body) = ctx
            .get(&format!("/api/v1/documents?{}", query), &token)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(body["message"], message);
    }

    // Empty values fall back to the defaults.
    let (status, _) = ctx.get("/api/v1/documents?limit=&offset=", &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn maximal_offset_is_an_empty_page() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    ctx.document(&user, "only", Access::Public).await;

    let (status, page) = ctx
        .get(
            "/api/v1/documents?limit=1&offset=9223372036854775807",
            &ctx.token(&user),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(titles(&page).is_empty());
    assert_eq!(page["metaData"]["totalCount"], 1);
    assert_eq!(page["metaData"]["page"], i64::MAX);
}

#[tokio::test]
async fn malformed_query_strings_get_a_json_message() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);

    for uri in [
        "/api/v1/documents?limit=1&limit=2",
        "/api/v1/search/documents?q=a&q=b",
    ] {
        let (status, body) = ctx.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert!(
            body["message"].as_str().is_some_and(|m| m.contains("duplicate field")),
            "uri {}: {}",
            uri,
            body
        );
    }
}

// --- Update & Delete ---

#[tokio::test]
async fn only_the_owner_or_a_super_admin_may_modify() {
    let ctx = TestContext::new();
    let root = ctx.user("root@example.com", SUPER_ADMIN).await;
    let admin = ctx.user("admin@example.com", ADMIN).await;
    let owner = ctx.user("owner@example.com", USER).await;
    let other = ctx.user("other@example.com", USER).await;
    let doc = ctx.document(&owner, "Draft", Access::Public).await;
    let uri = format!("/api/v1/documents/{}", doc.id);

    let (status, body) = ctx
        .put(&uri, &ctx.token(&admin), json!({ "content": "edited" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You cannot update someone else's document");

    let (status, body) = ctx.delete(&uri, &ctx.token(&other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You cannot delete someone else's document");

    let (status, body) = ctx
        .put(&uri, &ctx.token(&root), json!({ "access": "Private" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Update Successful");
    assert_eq!(body["updatedDetails"]["access"], "Private");
    assert_eq!(body["updatedDetails"]["title"], "Draft");

    let (status, body) = ctx
        .put(&uri, &ctx.token(&owner), json!({ "title": "Final", "content": "done" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedDetails"]["title"], "Final");
    assert_eq!(body["updatedDetails"]["content"], "done");

    let (status, body) = ctx.delete(&uri, &ctx.token(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Document successfully deleted");

    let (status, body) = ctx.get(&uri, &ctx.token(&owner)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Document Not Found");
}

#[tokio::test]
async fn update_validates_supplied_fields() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner@example.com", USER).await;
    let doc = ctx.document(&owner, "Draft", Access::Public).await;
    let uri = format!("/api/v1/documents/{}", doc.id);
    let token = ctx.token(&owner);

    let (status, body) = ctx.put(&uri, &token, json!({ "access": "Everyone" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Access Type");

    let (status, body) = ctx.put(&uri, &token, json!({ "title": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is Required");
}

// --- Request shape ---

#[tokio::test]
async fn malformed_requests() {
    let ctx = TestContext::new();
    let user = ctx.user("writer@example.com", USER).await;
    let token = ctx.token(&user);

    let (status, body) = ctx.get("/api/v1/documents/abc", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Document Id must be an integer");

    let (status, body) = ctx.get("/api/v1/documents/999", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Document Not Found");

    // Body without a JSON content type: still answered in the `{ message }` shape.
    let (status, body) = ctx
        .request(Method::POST, "/api/v1/documents", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = ctx.request(Method::GET, "/api/v1/documents", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "You are not signed in");

    let (status, body) = ctx.get("/api/v1/nothing-here", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid route");
}

// --- Search ---

#[tokio::test]
async fn document_search_is_case_insensitive_and_respects_visibility() {
    let ctx = TestContext::new();
    let alice = ctx.user("alice@example.com", USER).await;
    let bob = ctx.user("bob@example.com", USER).await;
    ctx.document(&alice, "Quarterly Report", Access::Public).await;
    ctx.document(&alice, "Secret report", Access::Private).await;
    ctx.document(&alice, "Shopping list", Access::Public).await;
    let token = ctx.token(&bob);

    let (status, page) = ctx.get("/api/v1/search/documents?q=REPORT", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&page), vec!["Quarterly Report"]);

    let (_, page) = ctx
        .get("/api/v1/search/documents?q=report", &ctx.token(&alice))
        .await;
    assert_eq!(titles(&page), vec!["Secret report", "Quarterly Report"]);

    let (_, page) = ctx.get("/api/v1/search/documents?q=nothing", &token).await;
    assert!(titles(&page).is_empty());

    let (status, body) = ctx.get("/api/v1/search/documents?q=%20", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search query is required");
}
