use crate::domain::{FolderId, MessageEntry, MessageId, MessageQuery, MessageUpdateBody};
use crate::transport::MessageList;

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

const STATUS_NEW: u8 = 1;
const STATUS_READ: u8 = 2;

impl YouMailClient {
    /// List voicemail entries matching `query`.
    pub async fn list_messages(
        &self,
        query: &MessageQuery,
    ) -> Result<Vec<MessageEntry>, YouMailError> {
        let request =
            ApiRequest::get(format!("{API_ROOT}/messages")).query_pairs(query.to_query());
        let list: MessageList = self.fetch(request).await?;
        Ok(list.items)
    }

    pub async fn get_message(&self, id: MessageId) -> Result<MessageEntry, YouMailError> {
        self.fetch(ApiRequest::get(message_path(id))).await
    }

    pub async fn move_message(&self, id: MessageId, folder: FolderId) -> Result<(), YouMailError> {
        self.update_message(MessageUpdateBody {
            id,
            folder_id: Some(folder),
            status: None,
        })
        .await
    }

    /// Flag an entry as read (`true`) or back to new (`false`).
    pub async fn mark_message_read(&self, id: MessageId, read: bool) -> Result<(), YouMailError> {
        self.update_message(MessageUpdateBody {
            id,
            folder_id: None,
            status: Some(if read { STATUS_READ } else { STATUS_NEW }),
        })
        .await
    }

    pub async fn delete_message(&self, id: MessageId) -> Result<(), YouMailError> {
        self.execute(ApiRequest::delete(message_path(id))).await
    }

    async fn update_message(&self, update: MessageUpdateBody) -> Result<(), YouMailError> {
        let body = self.encode("message", &update)?;
        self.execute(ApiRequest::put(message_path(update.id), body))
            .await
    }
}

fn message_path(id: MessageId) -> String {
    format!("{API_ROOT}/messages/{id}")
}
