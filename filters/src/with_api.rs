use api::Api;
use std::convert::Infallible;
use warp::Filter;

/// Simple filter to add the backend client to the request
pub fn with_api(api: Api) -> impl Filter<Extract = (Api,), Error = Infallible> + Clone {
    warp::any().map(move || api.clone())
}
