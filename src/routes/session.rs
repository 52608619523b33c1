use serde::Serialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{render, success, Failure, Response, SimpleSuccessResponse};
use api::{Api, Tokens};
use filters::with_api;

/// Login happens on the external login page, which hands the tokens back to the gateway here.
pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let status_route = warp::path!("api" / "session")
        .and(warp::get())
        .and(with_api(api.clone()))
        .and_then(|api| render(status(api)));

    let store_route = warp::path!("api" / "session")
        .and(warp::post())
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|api, tokens| render(store(api, tokens)));

    let clear_route = warp::path!("api" / "session")
        .and(warp::delete())
        .and(with_api(api.clone()))
        .and_then(|api| render(clear(api)));

    status_route
        .or(store_route)
        .unify()
        .or(clear_route)
        .unify()
        .boxed()
}

#[derive(Serialize)]
struct StatusResponse<'a> {
    status: &'static str,
    authenticated: bool,
    login_url: &'a str,
}

async fn status(api: Api) -> Result<Response, Failure> {
    Ok(success(&StatusResponse {
        status: "success",
        authenticated: api.session().is_authenticated().await,
        login_url: api.session().login_url(),
    }))
}

async fn store(api: Api, tokens: Tokens) -> Result<Response, Failure> {
    api.session().store(tokens).await?;
    Ok(success(&SimpleSuccessResponse::new()))
}

async fn clear(api: Api) -> Result<Response, Failure> {
    api.session().clear().await;
    Ok(success(&SimpleSuccessResponse::new()))
}
