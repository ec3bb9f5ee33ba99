use std::sync::Arc;

use appraisal_api::handlers::write_sheet;
use appraisal_api::{telemetry, AppContext};
use vercel_runtime::{run, Error, Request};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_logging();
    let ctx = Arc::new(AppContext::from_env()?);
    run(move |req: Request| {
        let ctx = ctx.clone();
        async move { write_sheet::handle(&ctx, req.method().as_str(), req.body()).await }
    })
    .await
}
