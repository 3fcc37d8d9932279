use crate::domain::{RawPhoneNumber, VirtualNumber, VirtualNumberRequest};
use crate::transport::VirtualNumberList;

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    pub async fn list_virtual_numbers(&self) -> Result<Vec<VirtualNumber>, YouMailError> {
        let list: VirtualNumberList = self
            .fetch(ApiRequest::get(format!("{API_ROOT}/virtualnumbers")))
            .await?;
        Ok(list.items)
    }

    /// Provision a number in the requested area code.
    pub async fn add_virtual_number(
        &self,
        request: &VirtualNumberRequest,
    ) -> Result<VirtualNumber, YouMailError> {
        let body = self.encode("virtualNumberRequest", request)?;
        self.fetch(ApiRequest::post(format!("{API_ROOT}/virtualnumbers"), body))
            .await
    }

    pub async fn remove_virtual_number(
        &self,
        phone_number: &RawPhoneNumber,
    ) -> Result<(), YouMailError> {
        let request = ApiRequest::delete(format!("{API_ROOT}/virtualnumbers"))
            .query("phoneNumber", phone_number.raw());
        self.execute(request).await
    }
}
