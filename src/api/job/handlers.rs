use actix_web::{
    HttpResponse, Responder, post,
    web::{Data, Json, ServiceConfig},
};

use super::event::ApiGatewayEvent;
use super::service::JobService;

/// Invocation path used by the Lambda runtime interface emulator
pub const INVOCATION_PATH: &str = "/2015-03-31/functions/function/invocations";

/// Run one invocation and return the response descriptor
///
/// The HTTP status of this endpoint is always 200 once the event decodes;
/// the job handler's own status travels in `statusCode`.
#[post("/2015-03-31/functions/function/invocations")]
async fn invoke(service: Data<JobService>, event: Json<ApiGatewayEvent>) -> impl Responder {
    let (request, caller) = event.into_inner().into_parts();
    let response = service.handle(request, &caller).await;
    HttpResponse::Ok().json(response)
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(invoke);
}
