use sqlx::{SqliteConnection, error::ErrorKind};
use tracing::{Instrument, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{VehicleChangesType, VehicleDetailType},
};

/**
 * Database response type for querying vehicles. Columns follow the attribute order.
 */
pub type QueryVehicleDbResp = (String, String, String, i64, String, i64, f64, String);

/**
 * SQL query to retrieve all vehicles in insertion order.
 */
const QUERY_VEHICLE_LIST: &str =
    "SELECT vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type FROM vehicles ORDER BY rowid";

/**
 * SQL query to retrieve a single vehicle by VIN.
 */
const QUERY_VEHICLE: &str =
    "SELECT vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type FROM vehicles WHERE vin = ?1";

/**
 * SQL query to add a new vehicle.
 */
const ADD_VEHICLE: &str = "INSERT INTO vehicles (vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                           RETURNING vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type";

/**
 * SQL query to overwrite the supplied fields of a vehicle. A NULL parameter keeps the stored value.
 */
const UPDATE_VEHICLE: &str = "UPDATE vehicles SET
                                 vin = COALESCE(?1, vin),
                                 manufacturer_name = COALESCE(?2, manufacturer_name),
                                 description = COALESCE(?3, description),
                                 horse_power = COALESCE(?4, horse_power),
                                 model_name = COALESCE(?5, model_name),
                                 model_year = COALESCE(?6, model_year),
                                 purchase_price = COALESCE(?7, purchase_price),
                                 fuel_type = COALESCE(?8, fuel_type)
                              WHERE vin = ?9
                              RETURNING vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type";

/**
 * SQL query to delete a vehicle.
 */
const DELETE_VEHICLE: &str = "DELETE FROM vehicles WHERE vin = ?1";

impl From<QueryVehicleDbResp> for VehicleDetailType {
    fn from(row: QueryVehicleDbResp) -> Self {
        VehicleDetailType::new(row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7)
    }
}

/**
 * DAO for vehicle-related database operations.
 */
pub struct VehicleDao {}

impl VehicleDao {
    /**
     * Creates a new instance of `VehicleDao`.
     *
     * # Returns
     * A new instance of `VehicleDao`.
     */
    pub fn new() -> Self {
        VehicleDao {}
    }

    /**
     * Retrieves all vehicles.
     *
     * # Arguments
     * `connection`: The database connection.
     *
     * # Returns
     * A Result containing the vehicles in insertion order or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_vehicle_list(&self, connection: &mut SqliteConnection) -> Result<Vec<VehicleDetailType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<QueryVehicleDbResp> = sqlx::query_as(QUERY_VEHICLE_LIST)
            .fetch_all(connection)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to get vehicle list: {err}")))?;
        Ok(results.into_iter().map(VehicleDetailType::from).collect())
    }

    /**
     * Retrieves a vehicle by its VIN.
     *
     * # Arguments
     * `connection`: The database connection.
     * `vin`: The VIN of the vehicle.
     *
     * # Returns
     * A Result containing the vehicle, `None` if it does not exist, or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_vehicle(&self, connection: &mut SqliteConnection, vin: &str) -> Result<Option<VehicleDetailType>, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QueryVehicleDbResp> = sqlx::query_as(QUERY_VEHICLE)
            .bind(vin)
            .fetch_optional(connection)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to get vehicle: {err}")))?;
        Ok(result.map(VehicleDetailType::from))
    }

    /**
     * Adds a new vehicle to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `vehicle`: The vehicle to be added.
     *
     * # Returns
     * A Result containing the persisted vehicle or an `ApplicationError`.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_vehicle(&self, transaction: &mut SqliteConnection, vehicle: VehicleDetailType) -> Result<VehicleDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: QueryVehicleDbResp = sqlx::query_as(ADD_VEHICLE)
            .bind(vehicle.vin)
            .bind(vehicle.manufacturer_name)
            .bind(vehicle.description)
            .bind(vehicle.horse_power)
            .bind(vehicle.model_name)
            .bind(vehicle.model_year)
            .bind(vehicle.purchase_price)
            .bind(vehicle.fuel_type)
            .fetch_one(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        Ok(VehicleDetailType::from(result))
    }

    /**
     * Overwrites the supplied fields of an existing vehicle.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `vin`: The VIN of the vehicle to be updated.
     * `changes`: The fields to overwrite.
     *
     * # Returns
     * A Result containing the updated vehicle or an `ApplicationError`.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn update_vehicle(&self, transaction: &mut SqliteConnection, vin: &str, changes: VehicleChangesType) -> Result<VehicleDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<QueryVehicleDbResp> = sqlx::query_as(UPDATE_VEHICLE)
            .bind(changes.vin)
            .bind(changes.manufacturer_name)
            .bind(changes.description)
            .bind(changes.horse_power)
            .bind(changes.model_name)
            .bind(changes.model_year)
            .bind(changes.purchase_price)
            .bind(changes.fuel_type)
            .bind(vin)
            .fetch_optional(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(&err))?;
        match result {
            Some(row) => Ok(VehicleDetailType::from(row)),
            None => {
                tracing::debug!("Vehicle with VIN {} not found for update", vin);
                Err(ApplicationError::new(ErrorType::NotFound, "Vehicle not found".to_string()))
            }
        }
    }

    /**
     * Deletes a vehicle from the database by its VIN.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `vin`: The VIN of the vehicle to be deleted.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn delete_vehicle(&self, transaction: &mut SqliteConnection, vin: &str) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(DELETE_VEHICLE)
            .bind(vin)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to delete vehicle: {err}")))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Vehicle with VIN {} not found for deletion", vin);
            return Err(ApplicationError::new(ErrorType::NotFound, "Vehicle not found".to_string()));
        }
        if result.rows_affected() > 1 {
            tracing::warn!("Multiple vehicles attempted deleted. Rolled back");
            return Err(ApplicationError::new(ErrorType::Application, "Multiple vehicles attempted deleted. Rolled back".to_string()));
        }
        Ok(())
    }

    /**
     * Handles database errors and maps them to application errors.
     *
     * # Arguments
     * `error`: The error returned by the database driver.
     *
     * # Returns
     * An `ApplicationError` corresponding to the database error.
     */
    fn handle_database_error(error: &sqlx::Error) -> ApplicationError {
        if let Some(db_error) = error.as_database_error() {
            tracing::debug!("Database error: {}", db_error);
            match db_error.kind() {
                ErrorKind::UniqueViolation => {
                    return ApplicationError::new(ErrorType::ConstraintViolation, "A vehicle with this VIN already exists".to_string());
                }
                ErrorKind::NotNullViolation => {
                    // SQLite reports "NOT NULL constraint failed: vehicles.<column>"
                    return match db_error.message().rsplit_once('.') {
                        Some((_, column)) => ApplicationError::null_field(column),
                        None => ApplicationError::new(ErrorType::ConstraintViolation, "A required field is null".to_string()),
                    };
                }
                _ => {}
            }
            tracing::error!("Unhandled database error: {}", db_error);
            return ApplicationError::new(ErrorType::DatabaseError, "Unhandled database error".to_string());
        }
        tracing::error!("Failed to execute database operation: {}", error);
        ApplicationError::new(ErrorType::DatabaseError, "Failed to execute database operation".to_string())
    }
}
