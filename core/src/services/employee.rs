//! Employee lookups.

use serde_json::Value;
use tracing::debug;

use crate::config::PrismConfig;
use crate::entities::Employee;
use crate::error::PrismResult;
use crate::http::{HttpRequest, HttpResponse};
use crate::response::{decode, decode_or_not_found, one_or_many, pointer, scalar_string};
use crate::services::require;
use crate::transport::Transport;

const GET_EMPLOYEE_PATH: &str = "employee/getEmployee";
const GET_EMPLOYEE_LIST_PATH: &str = "employee/getEmployeeList";
const GET_EMPLOYERS_INFO_PATH: &str = "employee/getEmployersInfo";

/// Most employee IDs the vendor accepts in one `getEmployee` call.
pub const EMPLOYEE_CHUNK_SIZE: usize = 15;

pub struct EmployeeService<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a PrismConfig,
}

impl<'a, T: ?Sized> EmployeeService<'a, T> {
    pub fn new(transport: &'a T, config: &'a PrismConfig) -> Self {
        Self { transport, config }
    }

    /// One `getEmployee` request. IDs go out as repeated `employeeId` pairs.
    pub fn build_get_employees<S: AsRef<str>>(&self, ids: &[S], client_id: &str) -> PrismResult<HttpRequest> {
        let mut query: Vec<(&str, &str)> = ids.iter().map(|id| ("employeeId", id.as_ref())).collect();
        query.push(("clientId", client_id));
        query.push(("options", "Person"));
        self.config.build_get(GET_EMPLOYEE_PATH, &query)
    }

    pub fn parse_get_employees(&self, response: HttpResponse) -> PrismResult<Vec<Employee>> {
        let body = decode(&response)?;
        one_or_many(body.get("employee"))
            .into_iter()
            .map(Employee::from_api_response)
            .collect()
    }

    pub fn build_get_employee_list(&self, client_id: &str) -> PrismResult<HttpRequest> {
        self.config
            .build_get(GET_EMPLOYEE_LIST_PATH, &[("clientId", client_id)])
    }

    /// IDs under `employeeList.employeeId`; a 404 means the client has none.
    pub fn parse_get_employee_list(&self, response: HttpResponse) -> PrismResult<Vec<String>> {
        Ok(decode_or_not_found(&response)?
            .map(|body| employee_ids(&body))
            .unwrap_or_default())
    }

    pub fn build_get_employer(&self, employee_id: &str) -> PrismResult<HttpRequest> {
        self.config
            .build_get(GET_EMPLOYERS_INFO_PATH, &[("employeeId", employee_id)])
    }
}

impl<'a, T: Transport + ?Sized> EmployeeService<'a, T> {
    /// The employee with `id`, or `None` when the vendor returns no match.
    pub fn get_employee(&self, id: &str, client_id: &str) -> PrismResult<Option<Employee>> {
        require(id, "id")?;
        require(client_id, "client_id")?;
        let request = self.build_get_employees(&[id], client_id)?;
        let employees = self.parse_get_employees(self.transport.execute(request)?)?;
        Ok(employees.into_iter().next())
    }

    /// Fetches `ids` in chunks of `EMPLOYEE_CHUNK_SIZE`, one request per
    /// chunk, in order. Results are concatenated in request order.
    pub fn get_employees<S: AsRef<str>>(&self, ids: &[S], client_id: &str) -> PrismResult<Vec<Employee>> {
        require(client_id, "client_id")?;
        let mut employees = Vec::with_capacity(ids.len());
        for (index, chunk) in ids.chunks(EMPLOYEE_CHUNK_SIZE).enumerate() {
            debug!(chunk = index, size = chunk.len(), "fetching employee chunk");
            let request = self.build_get_employees(chunk, client_id)?;
            employees.extend(self.parse_get_employees(self.transport.execute(request)?)?);
        }
        Ok(employees)
    }

    /// Every employee of `client_id`: the ID list first, then full records.
    pub fn get_all_employees(&self, client_id: &str) -> PrismResult<Vec<Employee>> {
        require(client_id, "client_id")?;
        let request = self.build_get_employee_list(client_id)?;
        let ids = self.parse_get_employee_list(self.transport.execute(request)?)?;
        self.get_employees(&ids, client_id)
    }

    /// Employer details for one employee, as returned by the vendor.
    pub fn get_employer(&self, employee_id: &str) -> PrismResult<Value> {
        require(employee_id, "employee_id")?;
        let request = self.build_get_employer(employee_id)?;
        decode(&self.transport.execute(request)?)
    }
}

/// `employeeList.employeeId` as strings; shared with the payroll service.
pub(crate) fn employee_ids(body: &Value) -> Vec<String> {
    one_or_many(pointer(body, &["employeeList", "employeeId"]))
        .iter()
        .filter_map(scalar_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrismError;
    use crate::http::HttpMethod;

    fn config() -> PrismConfig {
        PrismConfig::new("1.22", "https://api.prismhr.com/").unwrap()
    }

    #[test]
    fn build_get_employees_repeats_employee_id() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let req = service.build_get_employees(&["A1", "B2"], "C1").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://api.prismhr.com/api-1.22/services/rest/employee/getEmployee?employeeId=A1&employeeId=B2&clientId=C1&options=Person"
        );
    }

    #[test]
    fn parse_get_employees_maps_list() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let employees = service
            .parse_get_employees(HttpResponse::new(
                200,
                r#"{"employee":[{"id":"A1","firstName":"Ann"},{"id":"B2","lastName":"Bo"}]}"#,
            ))
            .unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].first_name, "Ann");
        assert_eq!(employees[1].last_name, "Bo");
        assert_eq!(employees[1].first_name, "");
    }

    #[test]
    fn parse_get_employees_empty_list() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let employees = service
            .parse_get_employees(HttpResponse::new(200, r#"{"employee":[]}"#))
            .unwrap();
        assert!(employees.is_empty());
    }

    #[test]
    fn parse_get_employees_translates_4xx() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let err = service
            .parse_get_employees(HttpResponse::new(400, r#"{"errorMessage":"Bad client"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "Received 400: 'Bad client' when contacting API");
    }

    #[test]
    fn parse_get_employee_list_404_is_empty() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let ids = service
            .parse_get_employee_list(HttpResponse::new(404, r#"{"errorMessage":"none"}"#))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn parse_get_employee_list_reads_nested_ids() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let ids = service
            .parse_get_employee_list(HttpResponse::new(
                200,
                r#"{"employeeList":{"employeeId":["A1", 22]}}"#,
            ))
            .unwrap();
        assert_eq!(ids, vec!["A1".to_string(), "22".to_string()]);
    }

    #[test]
    fn parse_get_employee_list_other_4xx_raises() {
        let config = config();
        let service = EmployeeService::<()>::new(&(), &config);
        let err = service
            .parse_get_employee_list(HttpResponse::new(401, r#"{"errorMessage":"expired"}"#))
            .unwrap_err();
        assert!(matches!(err, PrismError::Api { status: 401, .. }));
    }
}
