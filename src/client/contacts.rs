use crate::domain::{Contact, ContactId, ContactQuery, ValidationError};
use crate::transport::ContactList;

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, YouMailError> {
        let request =
            ApiRequest::get(format!("{API_ROOT}/contacts")).query_pairs(query.to_query());
        let list: ContactList = self.fetch(request).await?;
        Ok(list.items)
    }

    /// Create a contact. Any `id` on `contact` is ignored by the service.
    pub async fn create_contact(&self, contact: &Contact) -> Result<Contact, YouMailError> {
        let body = self.encode("contact", contact)?;
        self.fetch(ApiRequest::post(format!("{API_ROOT}/contacts"), body))
            .await
    }

    /// Replace a stored contact. `contact.id` must be set.
    pub async fn update_contact(&self, contact: &Contact) -> Result<(), YouMailError> {
        let id = contact
            .id
            .ok_or(ValidationError::Empty { field: "contact_id" })?;
        let body = self.encode("contact", contact)?;
        self.execute(ApiRequest::put(contact_path(id), body)).await
    }

    pub async fn delete_contact(&self, id: ContactId) -> Result<(), YouMailError> {
        self.execute(ApiRequest::delete(contact_path(id))).await
    }
}

fn contact_path(id: ContactId) -> String {
    format!("{API_ROOT}/contacts/{id}")
}
