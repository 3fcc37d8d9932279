use crate::domain::{MessageId, TranscriptionRequestBody, TranscriptionSettings, TranscriptionStatus};

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    /// Transcription plan and remaining quota.
    pub async fn get_transcription_status(&self) -> Result<TranscriptionStatus, YouMailError> {
        self.fetch(ApiRequest::get(format!("{API_ROOT}/transcription/status")))
            .await
    }

    pub async fn get_transcription_settings(
        &self,
    ) -> Result<TranscriptionSettings, YouMailError> {
        self.fetch(ApiRequest::get(format!(
            "{API_ROOT}/transcription/settings"
        )))
        .await
    }

    /// Queue a transcription for one message. The text shows up on the entry once done.
    pub async fn request_transcription(&self, message: MessageId) -> Result<(), YouMailError> {
        let body = self.encode(
            "transcriptionRequest",
            &TranscriptionRequestBody {
                message_id: message,
            },
        )?;
        self.execute(ApiRequest::post(
            format!("{API_ROOT}/transcription/requests"),
            body,
        ))
        .await
    }
}
