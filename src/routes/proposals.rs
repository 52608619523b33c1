use serde::Deserialize;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    normalized_page_number, render, success, Failure, ItemResponse, ListResponse, Response,
};
use crate::validation::check_pending;
use api::{
    models::{Decision, Id, Proposal, ProposalState},
    search, Api,
};
use filters::{authed, with_api};

pub fn routes(api: &Api) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "proposals")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    list_route
        .or(decide_route(api, "approve", Decision::Approve))
        .unify()
        .or(decide_route(api, "reject", Decision::Reject))
        .unify()
        .boxed()
}

fn decide_route(api: &Api, action: &'static str, decision: Decision) -> BoxedFilter<(Response,)> {
    warp::path("api")
        .and(warp::path("proposals"))
        .and(warp::path::param::<Id>())
        .and(warp::path(action))
        .and(warp::path::end())
        .and(warp::post())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::any().map(move || decision))
        .and_then(|id, api, decision| render(decide(id, api, decision)))
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    page: Option<i64>,
    state: Option<ProposalState>,
    teacher_id: Option<Id>,
    subject_id: Option<Id>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let proposals = api.proposals().await?;

    let found = search(
        &proposals,
        |_: &Proposal| String::new(),
        normalized_page_number(request.page),
        None,
        |p| {
            request.state.map_or(true, |s| p.state == s)
                && request.teacher_id.map_or(true, |id| p.teacher_id == id)
                && request.subject_id.map_or(true, |id| p.subject_id == id)
        },
    );

    Ok(success(&ListResponse::new(found)))
}

/// Only pending proposals can be approved or rejected.
async fn decide(id: Id, api: Api, decision: Decision) -> Result<Response, Failure> {
    let proposals = api.proposals().await?;
    let proposal = proposals
        .iter()
        .find(|p| p.id == id)
        .ok_or(Failure::NotFound)?;

    check_pending(proposal)?;

    let decided = api.decide_proposal(id, decision).await?;
    Ok(success(&ItemResponse::new(&decided)))
}
