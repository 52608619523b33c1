use api::Api;
use warp::{Filter, Rejection};

use crate::with_api;

/// Filter that rejects the request when no operator session is stored
pub fn authed(api: &Api) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    with_api(api.clone()).and_then(guard).untuple_one()
}

#[derive(Debug)]
pub struct Unauthorized {
    pub login_url: String,
}

impl warp::reject::Reject for Unauthorized {}

async fn guard(api: Api) -> Result<(), Rejection> {
    if api.session().is_authenticated().await {
        Ok(())
    } else {
        Err(warp::reject::custom(Unauthorized {
            login_url: api.session().login_url().to_string(),
        }))
    }
}
