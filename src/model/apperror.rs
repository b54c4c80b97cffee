use std::fmt;

/**
 * Represents the type of error that can occur within the application.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    Initialization,
    MalformedRequest,
    Validation,
    ConstraintViolation,
    InvalidData,
    NotFound,
    DatabaseError,
    Application,
}

/**
 * Represents an error that occurs within the application.
 */
#[derive(Debug, Clone)]
pub struct ApplicationError {
    /**
     * Error type.
     */
    pub error_type: ErrorType,
    /**
     * Error message describing problem.
     */
    pub message: String,
}

impl ApplicationError {
    /**
     * Creates a new ApplicationError.
     *
     * #Arguments
     * `error_type`: The type of error.
     * `message`: A description of the error.
     */
    pub fn new(error_type: ErrorType, message: String) -> Self {
        ApplicationError { error_type, message }
    }

    /**
     * Error for a field that is missing or explicitly null.
     */
    pub fn null_field(field: &str) -> Self {
        ApplicationError::new(ErrorType::Validation, format!("Field \"{field}\" is null"))
    }

    /**
     * Error for a key that does not name a vehicle attribute.
     */
    pub fn unknown_field(field: &str) -> Self {
        ApplicationError::new(ErrorType::Validation, format!("Field \"{field}\" is not a vehicle attribute"))
    }

    /**
     * Generic error for data the store refused or that could not be converted.
     */
    pub fn invalid_data() -> Self {
        ApplicationError::new(ErrorType::InvalidData, "Invalid data or internal error".to_string())
    }

    /**
     * Converts a failed write into the error reported to the client. Classified
     * constraint and validation errors pass through, everything else becomes invalid data.
     */
    pub fn into_write_failure(self) -> Self {
        match self.error_type {
            ErrorType::ConstraintViolation | ErrorType::Validation | ErrorType::NotFound | ErrorType::InvalidData => self,
            _ => {
                tracing::warn!("Write failed: {}", self.message);
                ApplicationError::invalid_data()
            }
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
