pub mod http;
pub mod payload;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{ActionRequest, StateFilter};

pub use http::HttpRemote;
pub use payload::{AddRequest, AddResponse, ItemPayload, RetrieveResponse, SendResponse};

/// The saved-links service. Authoritative for item state.
#[async_trait]
pub trait RemoteClient {
    /// Retrieve the full current item set for one state filter.
    async fn fetch(&self, state: StateFilter) -> Result<RetrieveResponse>;

    /// Submit a batch of item actions.
    async fn submit(&self, actions: &[ActionRequest]) -> Result<SendResponse>;

    /// Save a new url.
    async fn add(&self, request: &AddRequest) -> Result<AddResponse>;
}
