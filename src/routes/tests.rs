use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use warp::{Filter, Reply};

use super::{routes, Memo};
use api::{lookups::Lookups, new_api, Api, BackendConfig, Tokens};

const LOGIN_URL: &str = "https://login.example/";

fn api(server: &MockServer) -> Api {
    new_api(BackendConfig {
        core_url: server.base_url(),
        availability_url: format!("{}/availability", server.base_url()),
        login_url: LOGIN_URL.to_string(),
        ..BackendConfig::default()
    })
    .unwrap()
}

async fn logged_in(server: &MockServer) -> Api {
    let api = api(server);
    api.session()
        .store(Tokens {
            access_token: "a1".to_string(),
            refresh_token: None,
        })
        .await
        .unwrap();
    api
}

fn app(api: &Api) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    app_with_memo(api, &Memo::default())
}

fn app_with_memo(
    api: &Api,
    memo: &Memo,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    let lookups = Arc::new(Lookups::from_parsed_json().unwrap());
    routes(api, memo, lookups).recover(crate::handle_rejection)
}

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn requests_without_session_ask_for_login() {
    let server = MockServer::start_async().await;
    let backend = server
        .mock_async(|when, then| {
            when.path("/usuarios");
            then.status(200).json_body(json!([]));
        })
        .await;

    let api = api(&server);
    let response = warp::test::request()
        .method("GET")
        .path("/api/users")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 401);
    let body = body(&response);
    assert_eq!(body["code"], "LoginRequired");
    assert_eq!(body["login_url"], LOGIN_URL);
    backend.assert_hits_async(0).await;
}

#[tokio::test]
async fn user_list_is_filtered_and_paginated() {
    let server = MockServer::start_async().await;
    let users: Vec<Value> = (1..=12)
        .map(|id| {
            let name = if id == 12 { "Zoe" } else { "José" };
            let role = if id == 1 { 1 } else { 2 };
            json!({"id": id, "nombre": name, "apellido": "Núñez", "rol_id": role})
        })
        .collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/usuarios");
            then.status(200).json_body(Value::Array(users));
        })
        .await;

    let api = logged_in(&server).await;
    let app = app(&api);

    let response = warp::test::request()
        .path("/api/users?role_id=2&page=2")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body = body(&response);
    assert_eq!(body["total"], 11);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], 12);

    let response = warp::test::request()
        .path("/api/users?query=JOSE%20nunez")
        .reply(&app)
        .await;
    assert_eq!(self::body(&response)["total"], 11);
}

#[tokio::test]
async fn second_final_is_rejected_before_reaching_backend() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/3/clases");
            then.status(200).json_body(json!([
                {"id": 1, "curso_id": 3, "titulo": "Final", "tipo": "FINAL",
                 "fecha": "2025-07-02", "estado": "PROGRAMADA"}
            ]));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/clases");
            then.status(201).json_body(json!({}));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("POST")
        .path("/api/courses/3/classes")
        .json(&json!({"curso_id": 3, "titulo": "Otro final", "tipo": "FINAL", "fecha": "2025-07-09"}))
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 400);
    let body = body(&response);
    assert_eq!(body["code"], "ClassTypeTaken");
    assert_eq!(body["field"], "tipo");
    create.assert_hits_async(0).await;
}

#[tokio::test]
async fn class_is_created_under_its_course() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/3/clases");
            then.status(200).json_body(json!([
                {"id": 1, "curso_id": 3, "titulo": "Final", "tipo": "FINAL",
                 "fecha": "2025-07-02", "estado": "CANCELADA"}
            ]));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/clases")
                .body_includes("\"curso_id\":3");
            then.status(201).json_body(json!({
                "id": 2, "curso_id": 3, "titulo": "Final", "tipo": "FINAL",
                "fecha": "2025-07-09", "estado": "PROGRAMADA"
            }));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("POST")
        .path("/api/courses/3/classes")
        .json(&json!({"curso_id": 8, "titulo": "Final", "tipo": "FINAL", "fecha": "2025-07-09"}))
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 201);
    assert_eq!(body(&response)["item"]["id"], 2);
    create.assert_async().await;
}

#[tokio::test]
async fn schedule_lists_course_days() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/5");
            then.status(200).json_body(json!({
                "id": 5, "materia_id": 1, "dia": "Miércoles", "turno": "Mañana",
                "fecha_inicio": "2025-03-10", "fecha_fin": "2025-07-10",
                "cupo_minimo": 5, "cupo_maximo": 40
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/5/clases");
            then.status(200).json_body(json!([
                {"id": 1, "curso_id": 5, "titulo": "Intro", "tipo": "REGULAR",
                 "fecha": "2025-03-12T00:00:00", "estado": "DICTADA"}
            ]));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .path("/api/courses/5/schedule")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 200);
    let body = body(&response);
    let days = body["days"].as_array().unwrap();
    assert_eq!(body["course_id"], 5);
    assert_eq!(days.len(), 18);
    assert_eq!(days[0]["date"], "2025-03-12");
    assert_eq!(days[0]["kind"], "regular");
    assert_eq!(days[0]["classes"][0]["titulo"], "Intro");
    assert_eq!(days[17]["date"], "2025-07-09");
}

#[tokio::test]
async fn invalid_form_names_the_field() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/sedes");
            then.status(201).json_body(json!({}));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("POST")
        .path("/api/sites")
        .json(&json!({"nombre": "   "}))
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 400);
    let body = body(&response);
    assert_eq!(body["code"], "MissingField");
    assert_eq!(body["field"], "nombre");
    create.assert_hits_async(0).await;
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = MockServer::start_async().await;
    let api = logged_in(&server).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/sites")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body(&response)["code"], "MalformedData");
}

#[tokio::test]
async fn backend_not_found_keeps_its_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/carreras/99");
            then.status(404).json_body(json!({"detail": "Carrera no encontrada"}));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .path("/api/careers/99")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 404);
    let body = body(&response);
    assert_eq!(body["code"], "NotFound");
    assert_eq!(body["detail"], "Carrera no encontrada");
}

#[tokio::test]
async fn decided_proposal_cannot_be_approved() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/availability/propuestas");
            then.status(200).json_body(json!([
                {"id": 9, "docente_id": 5, "materia_id": 7, "estado": "APROBADA"}
            ]));
        })
        .await;
    let approve = server
        .mock_async(|when, then| {
            when.method(POST).path("/availability/propuestas/9/aprobar");
            then.status(200).json_body(json!({}));
        })
        .await;

    let api = logged_in(&server).await;
    let app = app(&api);

    let response = warp::test::request()
        .method("POST")
        .path("/api/proposals/9/approve")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(body(&response)["code"], "ProposalAlreadyDecided");

    let response = warp::test::request()
        .method("POST")
        .path("/api/proposals/10/approve")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(body(&response)["code"], "InvalidID");

    approve.assert_hits_async(0).await;
}

#[tokio::test]
async fn session_is_stored_and_cleared() {
    let server = MockServer::start_async().await;
    let api = api(&server);
    let app = app(&api);

    let response = warp::test::request()
        .method("POST")
        .path("/api/session")
        .json(&json!({"access_token": "a1", "refresh_token": "r1"}))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request().path("/api/session").reply(&app).await;
    let status = body(&response);
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["login_url"], LOGIN_URL);

    let response = warp::test::request()
        .method("DELETE")
        .path("/api/session")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    assert!(!api.session().is_authenticated().await);
}

#[tokio::test]
async fn lookups_are_served_without_session() {
    let server = MockServer::start_async().await;
    let api = api(&server);

    let response = warp::test::request()
        .path("/api/lookups")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["lookups"]["shifts"][2], "Noche");
}

#[tokio::test]
async fn delete_is_forwarded_by_id() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/espacios/4")
                .header("Authorization", "Bearer a1");
            then.status(204);
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("DELETE")
        .path("/api/spaces/4")
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["status"], "success");
    delete.assert_async().await;
}

fn night_course() -> Value {
    json!({
        "id": 7, "materia_id": 1, "dia": "Lunes", "turno": "Noche",
        "fecha_inicio": "2025-03-10", "fecha_fin": "2025-05-10",
        "cupo_minimo": 5, "cupo_maximo": 40
    })
}

fn integrator_days(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Vec<Value> {
    body(response)["days"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|day| day["kind"] == "integrator")
        .map(|day| day["date"].clone())
        .collect()
}

#[tokio::test]
async fn night_schedule_keeps_its_integrator_saturday() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7");
            then.status(200).json_body(night_course());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7/clases");
            then.status(200).json_body(json!([]));
        })
        .await;

    let api = logged_in(&server).await;
    let memo = Memo::default();
    let app = app_with_memo(&api, &memo);

    let first = warp::test::request()
        .path("/api/courses/7/schedule")
        .reply(&app)
        .await;
    let second = warp::test::request()
        .path("/api/courses/7/schedule")
        .reply(&app)
        .await;

    let first = integrator_days(&first);
    assert_eq!(first.len(), 1);
    assert_eq!(first, integrator_days(&second));

    let picked = memo.remembered(7).unwrap().to_string();
    assert_eq!(first[0], picked.as_str());
}

#[tokio::test]
async fn updating_a_course_repicks_its_saturday() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7");
            then.status(200).json_body(night_course());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7/clases");
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/cursos/7");
            then.status(200).json_body(night_course());
        })
        .await;

    let api = logged_in(&server).await;
    let memo = Memo::default();
    let app = app_with_memo(&api, &memo);

    warp::test::request()
        .path("/api/courses/7/schedule")
        .reply(&app)
        .await;
    assert!(memo.remembered(7).is_some());

    let mut course = night_course();
    course.as_object_mut().unwrap().remove("id");
    let response = warp::test::request()
        .method("PUT")
        .path("/api/courses/7")
        .json(&course)
        .reply(&app)
        .await;

    assert_eq!(response.status(), 200);
    assert!(memo.remembered(7).is_none());
}

#[tokio::test]
async fn deleting_a_course_drops_its_saturday() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7");
            then.status(200).json_body(night_course());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/7/clases");
            then.status(200).json_body(json!([]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/cursos/7");
            then.status(204);
        })
        .await;

    let api = logged_in(&server).await;
    let memo = Memo::default();
    let app = app_with_memo(&api, &memo);

    warp::test::request()
        .path("/api/courses/7/schedule")
        .reply(&app)
        .await;
    assert!(memo.remembered(7).is_some());

    let response = warp::test::request()
        .method("DELETE")
        .path("/api/courses/7")
        .reply(&app)
        .await;

    assert_eq!(response.status(), 200);
    assert!(memo.remembered(7).is_none());
    delete.assert_async().await;
}

async fn course_three_classes(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/3/clases");
            then.status(200).json_body(json!([
                {"id": 1, "curso_id": 3, "titulo": "Final", "tipo": "FINAL",
                 "fecha": "2025-07-02", "estado": "PROGRAMADA"},
                {"id": 2, "curso_id": 3, "titulo": "Repaso", "tipo": "REGULAR",
                 "fecha": "2025-06-25", "estado": "PROGRAMADA"}
            ]));
        })
        .await;
}

#[tokio::test]
async fn editing_a_final_does_not_conflict_with_itself() {
    let server = MockServer::start_async().await;
    course_three_classes(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/clases/1");
            then.status(200).json_body(json!({
                "id": 1, "curso_id": 3, "titulo": "Final", "tipo": "FINAL",
                "fecha": "2025-07-02", "estado": "PROGRAMADA"
            }));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/clases/1");
            then.status(200).json_body(json!({
                "id": 1, "curso_id": 3, "titulo": "Final integrador", "tipo": "FINAL",
                "fecha": "2025-07-09", "estado": "PROGRAMADA"
            }));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("PUT")
        .path("/api/classes/1")
        .json(&json!({"curso_id": 3, "titulo": "Final integrador", "tipo": "FINAL", "fecha": "2025-07-09"}))
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body(&response)["item"]["titulo"], "Final integrador");
    update.assert_async().await;
}

#[tokio::test]
async fn edit_is_checked_against_the_stored_course() {
    let server = MockServer::start_async().await;
    course_three_classes(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/clases/2");
            then.status(200).json_body(json!({
                "id": 2, "curso_id": 3, "titulo": "Repaso", "tipo": "REGULAR",
                "fecha": "2025-06-25", "estado": "PROGRAMADA"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cursos/99/clases");
            then.status(200).json_body(json!([]));
        })
        .await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/clases/2");
            then.status(200).json_body(json!({}));
        })
        .await;

    let api = logged_in(&server).await;
    let response = warp::test::request()
        .method("PUT")
        .path("/api/classes/2")
        .json(&json!({"curso_id": 99, "titulo": "Otro final", "tipo": "FINAL", "fecha": "2025-07-09"}))
        .reply(&app(&api))
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body(&response)["code"], "ClassTypeTaken");
    update.assert_hits_async(0).await;
}

#[tokio::test]
async fn out_of_range_pages_are_normalized_or_empty() {
    let server = MockServer::start_async().await;
    let sites: Vec<Value> = (1..=12)
        .map(|id| json!({"id": id, "nombre": format!("Sede {}", id)}))
        .collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/sedes");
            then.status(200).json_body(Value::Array(sites));
        })
        .await;

    let api = logged_in(&server).await;
    let app = app(&api);

    let response = warp::test::request()
        .path("/api/sites?page=-1")
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let first = body(&response);
    assert_eq!(first["total"], 12);
    assert_eq!(first["items"][0]["id"], 1);

    let response = warp::test::request()
        .path(&format!("/api/sites?page={}", i64::MAX))
        .reply(&app)
        .await;
    assert_eq!(response.status(), 200);
    let last = body(&response);
    assert_eq!(last["total"], 12);
    assert!(last["items"].as_array().unwrap().is_empty());
}
