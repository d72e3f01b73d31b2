//! Employee record returned by `employee/getEmployee`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;
use crate::error::PrismResult;
use crate::response::from_value;

/// A person on a client's payroll. Absent fields default to "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    #[serde(deserialize_with = "de::string")]
    pub first_name: String,
    #[serde(deserialize_with = "de::string")]
    pub last_name: String,
    #[serde(deserialize_with = "de::string")]
    pub email_address: String,
}

impl Employee {
    pub fn from_api_response(value: Value) -> PrismResult<Self> {
        from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_all_fields() {
        let employee = Employee::from_api_response(json!({
            "id": "E100",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "emailAddress": "ada@example.com",
            "ssn": "ignored"
        }))
        .unwrap();
        assert_eq!(employee.id, "E100");
        assert_eq!(employee.first_name, "Ada");
        assert_eq!(employee.last_name, "Lovelace");
        assert_eq!(employee.email_address, "ada@example.com");
    }

    #[test]
    fn absent_fields_default_to_empty() {
        let employee = Employee::from_api_response(json!({"id": 42})).unwrap();
        assert_eq!(employee.id, "42");
        assert_eq!(employee, Employee { id: "42".into(), ..Employee::default() });
    }

    #[test]
    fn null_fields_default_to_empty() {
        let employee = Employee::from_api_response(json!({"id": "1", "emailAddress": null})).unwrap();
        assert_eq!(employee.email_address, "");
    }
}
