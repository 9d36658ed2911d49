use axum::Router;

pub fn merge_vec<S>(routers: Vec<Router<S>>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routers.into_iter().fold(Router::new(), |router, r| router.merge(r))
}
