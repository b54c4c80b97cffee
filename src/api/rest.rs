use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::VehicleDetailType,
};

/***************** Vehicle models *********************/

/**
 * Represents a vehicle in API responses.
 *
 * Fields are rendered in attribute order.
 */
#[derive(Debug, Serialize)]
pub struct VehicleElement {
    /**
     * Vehicle identification number.
     */
    vin: String,
    manufacturer_name: String,
    description: String,
    horse_power: i64,
    model_name: String,
    model_year: i64,
    purchase_price: f64,
    fuel_type: String,
}

/**
 * Converts from VehicleDetailType to VehicleElement.
 */
impl From<VehicleDetailType> for VehicleElement {
    fn from(vehicle: VehicleDetailType) -> Self {
        VehicleElement {
            vin: vehicle.vin,
            manufacturer_name: vehicle.manufacturer_name,
            description: vehicle.description,
            horse_power: vehicle.horse_power,
            model_name: vehicle.model_name,
            model_year: vehicle.model_year,
            purchase_price: vehicle.purchase_price,
            fuel_type: vehicle.fuel_type,
        }
    }
}

/***************** Error models *********************/

/**
 * Custom error response for the application.
 */
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /**
     * A human-readable message describing the error.
     */
    pub error: String,
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error.
     */
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse { error: self.message.clone() };
        HttpResponse::build(self.status_code()).json(&error_response)
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::MalformedRequest => StatusCode::BAD_REQUEST,
        ErrorType::Validation | ErrorType::ConstraintViolation | ErrorType::InvalidData => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorType::NotFound => StatusCode::NOT_FOUND,
        ErrorType::Initialization | ErrorType::DatabaseError | ErrorType::Application => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_vehicle_element_field_order() {
        let vehicle = VehicleDetailType::new("V1".to_string(), "Honda".to_string(), "Compact".to_string(), 150, "Civic".to_string(), 2020, 20000.0, "Petrol".to_string());
        let serialized = serde_json::to_string(&VehicleElement::from(vehicle)).unwrap();
        assert_eq!(
            serialized,
            r#"{"vin":"V1","manufacturer_name":"Honda","description":"Compact","horse_power":150,"model_name":"Civic","model_year":2020,"purchase_price":20000.0,"fuel_type":"Petrol"}"#
        );
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(get_statuscode(&ErrorType::MalformedRequest), StatusCode::BAD_REQUEST);
        assert_eq!(get_statuscode(&ErrorType::Validation), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(get_statuscode(&ErrorType::ConstraintViolation), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(get_statuscode(&ErrorType::InvalidData), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(get_statuscode(&ErrorType::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_statuscode(&ErrorType::DatabaseError), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body() {
        let body = serde_json::to_value(ErrorResponse { error: "Vehicle not found".to_string() }).unwrap();
        assert_eq!(body, json!({"error": "Vehicle not found"}));
    }
}
