use crate::domain::{Folder, FolderId, NewFolder};
use crate::transport::FolderList;

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    pub async fn list_folders(&self) -> Result<Vec<Folder>, YouMailError> {
        let list: FolderList = self
            .fetch(ApiRequest::get(format!("{API_ROOT}/folders")))
            .await?;
        Ok(list.items)
    }

    /// Create a folder and return it as stored by the service.
    pub async fn create_folder(&self, folder: &NewFolder) -> Result<Folder, YouMailError> {
        let body = self.encode("folder", folder)?;
        self.fetch(ApiRequest::post(format!("{API_ROOT}/folders"), body))
            .await
    }

    pub async fn delete_folder(&self, id: FolderId) -> Result<(), YouMailError> {
        self.execute(ApiRequest::delete(format!("{API_ROOT}/folders/{id}")))
            .await
    }
}
