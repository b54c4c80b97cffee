use serde_json::{Map, Value};
use sqlx::{Pool, Sqlite, Transaction};

use crate::{
    dao::vehicle::VehicleDao,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{VehicleChangesType, VehicleDetailType},
    },
};

/**
 * Represents the service for managing vehicles.
 */
pub struct VehicleService {
    /**
     * The DAO for vehicle operations.
     */
    vehicle_dao: VehicleDao,
    /**
     * Connection pool for database operations.
     */
    connection_pool: Pool<Sqlite>,
}

impl VehicleService {
    /**
     * Creates a new instance of `VehicleService`.
     *
     * # Arguments
     * `vehicle_dao`: The DAO for vehicle operations.
     * `connection_pool`: Connection pool for database operations.
     *
     * # Returns
     * A new instance of `VehicleService`.
     */
    pub fn new(vehicle_dao: VehicleDao, connection_pool: Pool<Sqlite>) -> Self {
        VehicleService { vehicle_dao, connection_pool }
    }

    /**
     * Retrieves all vehicles.
     *
     * # Returns
     * A Result containing all vehicles in insertion order or an `ApplicationError`.
     */
    pub async fn get_vehicle_list(&self) -> Result<Vec<VehicleDetailType>, ApplicationError> {
        let mut connection = self.connection_pool.acquire().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to acquire connection: {err}")))?;
        self.vehicle_dao.get_vehicle_list(&mut connection).await
    }

    /**
     * Retrieves a vehicle by its VIN.
     *
     * # Arguments
     * `vin`: The VIN of the vehicle.
     *
     * # Returns
     * A Result containing the vehicle or an `ApplicationError` of type `NotFound`.
     */
    pub async fn get_vehicle(&self, vin: &str) -> Result<VehicleDetailType, ApplicationError> {
        let mut connection = self.connection_pool.acquire().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to acquire connection: {err}")))?;
        self.vehicle_dao.get_vehicle(&mut connection, vin).await?.ok_or_else(Self::not_found)
    }

    /**
     * Adds a new vehicle.
     *
     * # Arguments
     * `vehicle`: The vehicle to be added.
     *
     * # Returns
     * A Result containing the persisted vehicle or an `ApplicationError`.
     */
    pub async fn add_vehicle(&self, vehicle: VehicleDetailType) -> Result<VehicleDetailType, ApplicationError> {
        let mut transaction = self.begin().await.map_err(ApplicationError::into_write_failure)?;
        match self.vehicle_dao.add_vehicle(&mut transaction, vehicle).await {
            Ok(vehicle) => {
                Self::commit(transaction).await.map_err(ApplicationError::into_write_failure)?;
                Ok(vehicle)
            }
            Err(err) => {
                Self::rollback(transaction).await.map_err(ApplicationError::into_write_failure)?;
                Err(err.into_write_failure())
            }
        }
    }

    /**
     * Overwrites fields of an existing vehicle.
     *
     * The vehicle must exist before the fields are validated, so a missing vehicle is reported
     * ahead of any invalid field. The existence check is a plain read; the transaction starts with
     * the write so concurrent writers wait on the database lock instead of failing an upgrade.
     *
     * # Arguments
     * `vin`: The VIN of the vehicle to be updated.
     * `fields`: Field name to value map from the request.
     *
     * # Returns
     * A Result containing the updated vehicle or an `ApplicationError`.
     */
    pub async fn update_vehicle(&self, vin: &str, fields: Map<String, Value>) -> Result<VehicleDetailType, ApplicationError> {
        self.get_vehicle(vin).await?;
        let changes = VehicleChangesType::try_from(fields)?;
        let mut transaction = self.begin().await.map_err(ApplicationError::into_write_failure)?;
        match self.vehicle_dao.update_vehicle(&mut transaction, vin, changes).await {
            Ok(vehicle) => {
                Self::commit(transaction).await.map_err(ApplicationError::into_write_failure)?;
                Ok(vehicle)
            }
            Err(err) => {
                Self::rollback(transaction).await.map_err(ApplicationError::into_write_failure)?;
                Err(err.into_write_failure())
            }
        }
    }

    /**
     * Deletes a vehicle by its VIN.
     *
     * # Arguments
     * `vin`: The VIN of the vehicle to be deleted.
     *
     * # Returns
     * A Result indicating success or an `ApplicationError`.
     */
    pub async fn delete_vehicle(&self, vin: &str) -> Result<(), ApplicationError> {
        let mut transaction = self.begin().await?;
        match self.vehicle_dao.delete_vehicle(&mut transaction, vin).await {
            Ok(()) => Self::commit(transaction).await?,
            Err(err) => {
                Self::rollback(transaction).await?;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, ApplicationError> {
        self.connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))
    }

    async fn commit(transaction: Transaction<'static, Sqlite>) -> Result<(), ApplicationError> {
        transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))
    }

    async fn rollback(transaction: Transaction<'static, Sqlite>) -> Result<(), ApplicationError> {
        transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))
    }

    fn not_found() -> ApplicationError {
        ApplicationError::new(ErrorType::NotFound, "Vehicle not found".to_string())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::dao::vehicle::test::{init_db, init_file_db, vehicle};

    async fn service() -> VehicleService {
        VehicleService::new(VehicleDao::new(), init_db().await)
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[actix_web::test]
    async fn test_add_then_get_vehicle() {
        let vehicle_service = service().await;
        let added = vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        assert_eq!(added.vin, "V1");
        assert_eq!(vehicle_service.get_vehicle("V1").await.unwrap(), added);
    }

    #[actix_web::test]
    async fn test_get_missing_vehicle() {
        let vehicle_service = service().await;
        let error = vehicle_service.get_vehicle("V1").await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Vehicle not found");
    }

    #[actix_web::test]
    async fn test_add_duplicate_keeps_first_record() {
        let vehicle_service = service().await;
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        let mut duplicate = vehicle("V1");
        duplicate.manufacturer_name = "Toyota".to_string();
        let error = vehicle_service.add_vehicle(duplicate).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::ConstraintViolation);
        assert_eq!(error.message, "A vehicle with this VIN already exists");
        let vehicles = vehicle_service.get_vehicle_list().await.unwrap();
        assert_eq!(vehicles, vec![vehicle("V1")]);
    }

    #[actix_web::test]
    async fn test_update_missing_vehicle_takes_precedence_over_null_field() {
        let vehicle_service = service().await;
        let error = vehicle_service.update_vehicle("V1", object(json!({"manufacturer_name": null}))).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::NotFound);
    }

    #[actix_web::test]
    async fn test_update_null_field_changes_nothing() {
        let vehicle_service = service().await;
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        let error = vehicle_service.update_vehicle("V1", object(json!({"horse_power": 999, "fuel_type": null}))).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Field \"fuel_type\" is null");
        assert_eq!(vehicle_service.get_vehicle("V1").await.unwrap(), vehicle("V1"));
    }

    #[actix_web::test]
    async fn test_update_duplicate_vin_rolls_back() {
        let vehicle_service = service().await;
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        vehicle_service.add_vehicle(vehicle("V2")).await.unwrap();
        let error = vehicle_service.update_vehicle("V2", object(json!({"horse_power": 999, "vin": "V1"}))).await.unwrap_err();
        assert_eq!(error.error_type, ErrorType::ConstraintViolation);
        assert_eq!(vehicle_service.get_vehicle("V2").await.unwrap(), vehicle("V2"));
    }

    #[actix_web::test]
    async fn test_update_subset_of_fields() {
        let vehicle_service = service().await;
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        let updated = vehicle_service.update_vehicle("V1", object(json!({"horse_power": 170}))).await.unwrap();
        let mut expected = vehicle("V1");
        expected.horse_power = 170;
        assert_eq!(updated, expected);
        assert_eq!(vehicle_service.get_vehicle("V1").await.unwrap(), expected);
    }

    #[actix_web::test]
    async fn test_delete_then_get_vehicle() {
        let vehicle_service = service().await;
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        vehicle_service.delete_vehicle("V1").await.unwrap();
        assert_eq!(vehicle_service.get_vehicle("V1").await.unwrap_err().error_type, ErrorType::NotFound);
        assert_eq!(vehicle_service.delete_vehicle("V1").await.unwrap_err().error_type, ErrorType::NotFound);
    }

    #[actix_web::test]
    async fn test_concurrent_updates_all_succeed() {
        let directory = tempfile::tempdir().unwrap();
        let vehicle_service = Arc::new(VehicleService::new(VehicleDao::new(), init_file_db(&directory).await));
        vehicle_service.add_vehicle(vehicle("V1")).await.unwrap();
        let handles: Vec<_> = (0..8)
            .map(|horse_power| {
                let vehicle_service = vehicle_service.clone();
                tokio::spawn(async move { vehicle_service.update_vehicle("V1", object(json!({"horse_power": horse_power}))).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        let horse_power = vehicle_service.get_vehicle("V1").await.unwrap().horse_power;
        assert!((0..8).contains(&horse_power));
    }

    #[actix_web::test]
    async fn test_concurrent_creates_of_one_vin() {
        let directory = tempfile::tempdir().unwrap();
        let vehicle_service = Arc::new(VehicleService::new(VehicleDao::new(), init_file_db(&directory).await));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let vehicle_service = vehicle_service.clone();
                tokio::spawn(async move { vehicle_service.add_vehicle(vehicle("V1")).await })
            })
            .collect();
        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.error_type, ErrorType::ConstraintViolation),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(vehicle_service.get_vehicle_list().await.unwrap(), vec![vehicle("V1")]);
    }
}
