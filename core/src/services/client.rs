//! Client (company) listing.

use serde_json::Value;

use crate::config::PrismConfig;
use crate::error::PrismResult;
use crate::http::HttpRequest;
use crate::response::decode;
use crate::transport::Transport;

const GET_CLIENT_LIST_PATH: &str = "clientMaster/getClientList";

pub struct ClientService<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a PrismConfig,
}

impl<'a, T: ?Sized> ClientService<'a, T> {
    pub fn new(transport: &'a T, config: &'a PrismConfig) -> Self {
        Self { transport, config }
    }

    pub fn build_get_all_clients(&self) -> PrismResult<HttpRequest> {
        self.config.build_get(GET_CLIENT_LIST_PATH, &[])
    }
}

impl<'a, T: Transport + ?Sized> ClientService<'a, T> {
    /// Every client the session can see, as returned by the vendor.
    pub fn get_all_clients(&self) -> PrismResult<Value> {
        let request = self.build_get_all_clients()?;
        decode(&self.transport.execute(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_get_all_clients_has_no_query() {
        let config = PrismConfig::new("1.21", "https://prism.example.com/").unwrap();
        let service = ClientService::<()>::new(&(), &config);
        let req = service.build_get_all_clients().unwrap();
        assert_eq!(
            req.url,
            "https://prism.example.com/api-1.21/services/rest/clientMaster/getClientList"
        );
        assert!(req.query_pairs().is_empty());
    }
}
