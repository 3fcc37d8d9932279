use crate::domain::{Greeting, GreetingId};
use crate::transport::GreetingList;

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    pub async fn list_greetings(&self) -> Result<Vec<Greeting>, YouMailError> {
        let list: GreetingList = self
            .fetch(ApiRequest::get(format!("{API_ROOT}/greetings")))
            .await?;
        Ok(list.items)
    }

    pub async fn get_greeting(&self, id: GreetingId) -> Result<Greeting, YouMailError> {
        self.fetch(ApiRequest::get(greeting_path(id))).await
    }

    /// Make `id` the greeting played to callers without a per-contact greeting.
    pub async fn set_active_greeting(&self, id: GreetingId) -> Result<(), YouMailError> {
        let request = ApiRequest::put(format!("{}/active", greeting_path(id)), Vec::new());
        self.execute(request).await
    }

    pub async fn delete_greeting(&self, id: GreetingId) -> Result<(), YouMailError> {
        self.execute(ApiRequest::delete(greeting_path(id))).await
    }
}

fn greeting_path(id: GreetingId) -> String {
    format!("{API_ROOT}/greetings/{id}")
}
