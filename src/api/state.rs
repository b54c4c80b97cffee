use crate::service::vehicle::VehicleService;

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The vehicle service for handling vehicle-related operations.
     */
    pub vehicle_service: VehicleService,
}

/**
 * Creates a new instance of `AppState`.
 *
 * # Arguments
 * `vehicle_service`: The vehicle service for handling vehicle-related operations.
 */
impl AppState {
    pub fn new(vehicle_service: VehicleService) -> Self {
        AppState { vehicle_service }
    }
}
