use serde_json::{Map, Value};

use crate::model::apperror::ApplicationError;

/**
 * Vehicle attribute names in the order they are stored and rendered.
 */
pub const VEHICLE_FIELDS: [&str; 8] = ["vin", "manufacturer_name", "description", "horse_power", "model_name", "model_year", "purchase_price", "fuel_type"];

/**
 * A complete vehicle record. Every attribute is always present.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDetailType {
    pub vin: String,
    pub manufacturer_name: String,
    pub description: String,
    pub horse_power: i64,
    pub model_name: String,
    pub model_year: i64,
    pub purchase_price: f64,
    pub fuel_type: String,
}

impl VehicleDetailType {
    #[allow(clippy::too_many_arguments)]
    pub fn new(vin: String, manufacturer_name: String, description: String, horse_power: i64, model_name: String, model_year: i64, purchase_price: f64, fuel_type: String) -> Self {
        VehicleDetailType { vin, manufacturer_name, description, horse_power, model_name, model_year, purchase_price, fuel_type }
    }
}

/**
 * Builds a vehicle to be created from a JSON object.
 *
 * Every attribute must be present and non-null, checked in attribute order. Keys that are not
 * vehicle attributes are rejected before any value is converted.
 */
impl TryFrom<Map<String, Value>> for VehicleDetailType {
    type Error = ApplicationError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for field in VEHICLE_FIELDS {
            if fields.get(field).is_none_or(Value::is_null) {
                return Err(ApplicationError::null_field(field));
            }
        }
        if let Some(unknown) = fields.keys().find(|key| !VEHICLE_FIELDS.contains(&key.as_str())) {
            return Err(ApplicationError::unknown_field(unknown));
        }
        // Every attribute is present past this point.
        Ok(VehicleDetailType::new(
            string_value(&fields["vin"])?,
            string_value(&fields["manufacturer_name"])?,
            string_value(&fields["description"])?,
            integer_value(&fields["horse_power"])?,
            string_value(&fields["model_name"])?,
            integer_value(&fields["model_year"])?,
            float_value(&fields["purchase_price"])?,
            string_value(&fields["fuel_type"])?,
        ))
    }
}

/**
 * Field overwrites for an existing vehicle. `None` leaves the stored value unchanged.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleChangesType {
    pub vin: Option<String>,
    pub manufacturer_name: Option<String>,
    pub description: Option<String>,
    pub horse_power: Option<i64>,
    pub model_name: Option<String>,
    pub model_year: Option<i64>,
    pub purchase_price: Option<f64>,
    pub fuel_type: Option<String>,
}

/**
 * Builds the field overwrites from a JSON object.
 *
 * Keys are checked in body order: an explicit null is rejected first, then a key that is not a
 * vehicle attribute. Absent attributes stay unchanged.
 */
impl TryFrom<Map<String, Value>> for VehicleChangesType {
    type Error = ApplicationError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for (field, value) in &fields {
            if value.is_null() {
                return Err(ApplicationError::null_field(field));
            }
            if !VEHICLE_FIELDS.contains(&field.as_str()) {
                return Err(ApplicationError::unknown_field(field));
            }
        }
        let mut changes = VehicleChangesType::default();
        for (field, value) in &fields {
            match field.as_str() {
                "vin" => changes.vin = Some(string_value(value)?),
                "manufacturer_name" => changes.manufacturer_name = Some(string_value(value)?),
                "description" => changes.description = Some(string_value(value)?),
                "horse_power" => changes.horse_power = Some(integer_value(value)?),
                "model_name" => changes.model_name = Some(string_value(value)?),
                "model_year" => changes.model_year = Some(integer_value(value)?),
                "purchase_price" => changes.purchase_price = Some(float_value(value)?),
                "fuel_type" => changes.fuel_type = Some(string_value(value)?),
                _ => return Err(ApplicationError::unknown_field(field)),
            }
        }
        Ok(changes)
    }
}

fn string_value(value: &Value) -> Result<String, ApplicationError> {
    value.as_str().map(str::to_string).ok_or_else(ApplicationError::invalid_data)
}

fn integer_value(value: &Value) -> Result<i64, ApplicationError> {
    value.as_i64().ok_or_else(ApplicationError::invalid_data)
}

fn float_value(value: &Value) -> Result<f64, ApplicationError> {
    value.as_f64().ok_or_else(ApplicationError::invalid_data)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::model::apperror::ErrorType;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn civic() -> Value {
        json!({
            "vin": "V1",
            "manufacturer_name": "Honda",
            "description": "Compact",
            "horse_power": 150,
            "model_name": "Civic",
            "model_year": 2020,
            "purchase_price": 20000.0,
            "fuel_type": "Petrol"
        })
    }

    #[test]
    fn test_create_input_complete() {
        let vehicle = VehicleDetailType::try_from(object(civic())).unwrap();
        assert_eq!(vehicle.vin, "V1");
        assert_eq!(vehicle.horse_power, 150);
        assert_eq!(vehicle.purchase_price, 20000.0);
    }

    #[test]
    fn test_create_input_accepts_integer_price() {
        let mut fields = object(civic());
        fields.insert("purchase_price".to_string(), json!(25000));
        let vehicle = VehicleDetailType::try_from(fields).unwrap();
        assert_eq!(vehicle.purchase_price, 25000.0);
    }

    #[test]
    fn test_create_input_missing_field() {
        let mut fields = object(civic());
        fields.remove("vin");
        let error = VehicleDetailType::try_from(fields).unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Field \"vin\" is null");
    }

    #[test]
    fn test_create_input_reports_first_missing_field_in_attribute_order() {
        let mut fields = object(civic());
        fields.remove("fuel_type");
        fields.insert("description".to_string(), Value::Null);
        let error = VehicleDetailType::try_from(fields).unwrap_err();
        assert_eq!(error.message, "Field \"description\" is null");
    }

    #[test]
    fn test_create_input_unknown_field() {
        let mut fields = object(civic());
        fields.insert("colour".to_string(), json!("red"));
        let error = VehicleDetailType::try_from(fields).unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Field \"colour\" is not a vehicle attribute");
    }

    #[test]
    fn test_create_input_wrong_type() {
        let mut fields = object(civic());
        fields.insert("horse_power".to_string(), json!("lots"));
        let error = VehicleDetailType::try_from(fields).unwrap_err();
        assert_eq!(error.error_type, ErrorType::InvalidData);
    }

    #[test]
    fn test_create_input_missing_field_reported_before_wrong_type() {
        let mut fields = object(civic());
        fields.insert("vin".to_string(), json!(42));
        fields.remove("fuel_type");
        let error = VehicleDetailType::try_from(fields).unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Field \"fuel_type\" is null");
    }

    #[test]
    fn test_changes_subset() {
        let changes = VehicleChangesType::try_from(object(json!({"horse_power": 170, "description": "Updated"}))).unwrap();
        assert_eq!(changes.horse_power, Some(170));
        assert_eq!(changes.description, Some("Updated".to_string()));
        assert_eq!(changes.vin, None);
        assert_eq!(changes.fuel_type, None);
    }

    #[test]
    fn test_changes_empty() {
        let changes = VehicleChangesType::try_from(Map::new()).unwrap();
        assert_eq!(changes, VehicleChangesType::default());
    }

    #[test]
    fn test_changes_null_field() {
        let error = VehicleChangesType::try_from(object(json!({"horse_power": 170, "manufacturer_name": null}))).unwrap_err();
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Field \"manufacturer_name\" is null");
    }

    #[test]
    fn test_changes_null_unknown_field_reported_as_null() {
        let error = VehicleChangesType::try_from(object(json!({"colour": null}))).unwrap_err();
        assert_eq!(error.message, "Field \"colour\" is null");
    }

    #[test]
    fn test_changes_unknown_field() {
        let error = VehicleChangesType::try_from(object(json!({"colour": "red"}))).unwrap_err();
        assert_eq!(error.message, "Field \"colour\" is not a vehicle attribute");
    }

    #[test]
    fn test_changes_wrong_type() {
        let error = VehicleChangesType::try_from(object(json!({"model_year": 2020.5}))).unwrap_err();
        assert_eq!(error.error_type, ErrorType::InvalidData);
    }
}
