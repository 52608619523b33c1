//! Item routes shared by every core API collection: get, create, update and delete.

use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    created, render, success, Failure, ItemResponse, Response, SimpleSuccessResponse,
};
use crate::validation::Validate;
use api::{
    models::{Id, Resource},
    Api,
};
use filters::{authed, with_api};

/// All four item routes under `/api/<name>`.
pub fn routes<T>(api: &Api, name: &'static str) -> BoxedFilter<(Response,)>
where
    T: Resource,
    T::Payload: Validate,
{
    get_route::<T>(api, name)
        .or(create_route::<T>(api, name))
        .unify()
        .or(update_route::<T>(api, name))
        .unify()
        .or(delete_route::<T>(api, name))
        .unify()
        .boxed()
}

pub fn get_route<T: Resource>(api: &Api, name: &'static str) -> BoxedFilter<(Response,)> {
    warp::path("api")
        .and(warp::path(name))
        .and(warp::path::param::<Id>())
        .and(warp::path::end())
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and_then(|id, api| render(get::<T>(id, api)))
        .boxed()
}

pub fn create_route<T>(api: &Api, name: &'static str) -> BoxedFilter<(Response,)>
where
    T: Resource,
    T::Payload: Validate,
{
    warp::path("api")
        .and(warp::path(name))
        .and(warp::path::end())
        .and(warp::post())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|api, payload| render(create::<T>(api, payload)))
        .boxed()
}

pub fn update_route<T>(api: &Api, name: &'static str) -> BoxedFilter<(Response,)>
where
    T: Resource,
    T::Payload: Validate,
{
    warp::path("api")
        .and(warp::path(name))
        .and(warp::path::param::<Id>())
        .and(warp::path::end())
        .and(warp::put())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|id, api, payload| render(update::<T>(id, api, payload)))
        .boxed()
}

pub fn delete_route<T: Resource>(api: &Api, name: &'static str) -> BoxedFilter<(Response,)> {
    warp::path("api")
        .and(warp::path(name))
        .and(warp::path::param::<Id>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and_then(|id, api| render(delete::<T>(id, api)))
        .boxed()
}

async fn get<T: Resource>(id: Id, api: Api) -> Result<Response, Failure> {
    let item = api.get::<T>(id).await?;
    Ok(success(&ItemResponse::new(&item)))
}

async fn create<T>(api: Api, payload: T::Payload) -> Result<Response, Failure>
where
    T: Resource,
    T::Payload: Validate,
{
    payload.validate()?;
    let item = api.create::<T>(&payload).await?;
    Ok(created(&ItemResponse::new(&item)))
}

async fn update<T>(id: Id, api: Api, payload: T::Payload) -> Result<Response, Failure>
where
    T: Resource,
    T::Payload: Validate,
{
    payload.validate_update(id)?;
    let item = api.update::<T>(id, &payload).await?;
    Ok(success(&ItemResponse::new(&item)))
}

async fn delete<T: Resource>(id: Id, api: Api) -> Result<Response, Failure> {
    api.delete::<T>(id).await?;
    Ok(success(&SimpleSuccessResponse::new()))
}
