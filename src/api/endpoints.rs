use actix_web::{
    HttpRequest, HttpResponse, delete, error::JsonPayloadError, get, post, put,
    web::{self, Path},
};
use serde_json::{Map, Value};
use tracing::{Instrument, instrument};

use crate::{
    api::{rest::VehicleElement, state::AppState},
    model::{
        apperror::{ApplicationError, ErrorType},
        models::VehicleDetailType,
    },
};

/**
 * Registers the vehicle endpoints and the JSON body configuration.
 */
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(home)
        .service(vehicles_list)
        .service(vehicle_add)
        .service(vehicle_get)
        .service(vehicle_update)
        .service(vehicle_delete);
}

/**
 * Liveness endpoint.
 */
#[get("/")]
pub async fn home() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("it's working!!")
}

/**
 * Endpoint to retrieve all vehicles.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "listVehicles", trace_id = get_trace_id(&http_request), result))]
#[get("/vehicle")]
pub async fn vehicles_list(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let vehicles = app_state.vehicle_service.get_vehicle_list().instrument(span).await?;
    let response: Vec<VehicleElement> = vehicles.into_iter().map(VehicleElement::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/**
 * Add a new vehicle.
 */
#[instrument(level = "info", skip(http_request, request_body, app_state), fields(service = "addVehicle", trace_id = get_trace_id(&http_request), result))]
#[post("/vehicle")]
pub async fn vehicle_add(http_request: HttpRequest, request_body: web::Json<Value>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let vehicle_add_input = VehicleDetailType::try_from(into_object(request_body)?)?;
    let vehicle = app_state.vehicle_service.add_vehicle(vehicle_add_input).instrument(span).await?;
    Ok(HttpResponse::Created().json(VehicleElement::from(vehicle)))
}

/**
 * Endpoint to retrieve a vehicle by VIN.
 */
#[instrument(skip(http_request, app_state), fields(service = "getVehicle", trace_id = get_trace_id(&http_request), result))]
#[get("/vehicle/{vin}")]
pub async fn vehicle_get(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let vin = path.into_inner();
    let vehicle = app_state.vehicle_service.get_vehicle(&vin).instrument(span).await?;
    Ok(HttpResponse::Ok().json(VehicleElement::from(vehicle)))
}

/**
 * Endpoint to overwrite fields of a vehicle.
 */
#[instrument(skip(http_request, request_body, app_state), fields(service = "updateVehicle", trace_id = get_trace_id(&http_request), result))]
#[put("/vehicle/{vin}")]
pub async fn vehicle_update(path: Path<String>, http_request: HttpRequest, request_body: web::Json<Value>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let vin = path.into_inner();
    let fields = into_object(request_body)?;
    let vehicle = app_state.vehicle_service.update_vehicle(&vin, fields).instrument(span).await?;
    Ok(HttpResponse::Ok().json(VehicleElement::from(vehicle)))
}

/**
 * Endpoint to delete a vehicle.
 */
#[instrument(skip(http_request, app_state), fields(service = "deleteVehicle", trace_id = get_trace_id(&http_request), result))]
#[delete("/vehicle/{vin}")]
pub async fn vehicle_delete(path: Path<String>, http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let span = tracing::Span::current();
    let vin = path.into_inner();
    app_state.vehicle_service.delete_vehicle(&vin).instrument(span).await?;
    Ok(HttpResponse::NoContent().finish())
}

/**
 * Unwraps a request body that must be a JSON object.
 */
fn into_object(request_body: web::Json<Value>) -> Result<Map<String, Value>, ApplicationError> {
    match request_body.into_inner() {
        Value::Object(fields) => Ok(fields),
        _ => Err(malformed_request()),
    }
}

/**
 * Maps unreadable, non-JSON or wrongly typed bodies to a bad request.
 */
fn json_error_handler(err: JsonPayloadError, _http_request: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Invalid JSON payload: {}", err);
    malformed_request().into()
}

fn malformed_request() -> ApplicationError {
    ApplicationError::new(ErrorType::MalformedRequest, "Invalid or missing JSON payload".to_string())
}

/**
 * Retrieves the trace ID from the HTTP request headers.
 * If the trace ID is not present, a new UUID is generated.
 */
fn get_trace_id(http_request: &HttpRequest) -> String {
    http_request.headers().get("X-Trace-ID")
        .and_then(|v| v.to_str().ok().map(std::string::ToString::to_string))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
