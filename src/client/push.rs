use crate::domain::{PushRegistration, PushRegistrationId, PushRegistrationInfo};

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    /// Register a device for new-message notifications.
    pub async fn register_push(
        &self,
        registration: &PushRegistration,
    ) -> Result<PushRegistrationInfo, YouMailError> {
        let body = self.encode("pushRegistration", registration)?;
        self.fetch(ApiRequest::post(
            format!("{API_ROOT}/push/registrations"),
            body,
        ))
        .await
    }

    /// Extend a registration before it expires.
    pub async fn renew_push(
        &self,
        id: PushRegistrationId,
    ) -> Result<PushRegistrationInfo, YouMailError> {
        let request = ApiRequest::put(format!("{}/renew", registration_path(id)), Vec::new());
        self.fetch(request).await
    }

    pub async fn unregister_push(&self, id: PushRegistrationId) -> Result<(), YouMailError> {
        self.execute(ApiRequest::delete(registration_path(id))).await
    }
}

fn registration_path(id: PushRegistrationId) -> String {
    format!("{API_ROOT}/push/registrations/{id}")
}

#[cfg(test)]
mod tests {
    use crate::client::testing::{FakeTransport, body_text, client, path_of};
    use crate::client::{HttpMethod, HttpResponse};
    use crate::domain::{PushClientType, PushRegistration, PushRegistrationId};
    use crate::transport::DataFormat;

    #[tokio::test]
    async fn register_renew_and_unregister() {
        let transport = FakeTransport::new(|request| match request.method {
            HttpMethod::Delete => Ok(HttpResponse::new(200, "")),
            _ => Ok(HttpResponse::new(
                200,
                r#"{"id":77,"deviceId":"dev-1","validUntil":1700000000000}"#,
            )),
        });
        let client = client(transport.clone(), DataFormat::Json);

        let mut registration =
            PushRegistration::new("dev-1", PushClientType::Android, "2.1").unwrap();
        registration.valid_days = Some(30);
        let info = client.register_push(&registration).await.unwrap();
        assert_eq!(info.id, PushRegistrationId::new(77));
        assert_eq!(
            body_text(&transport.last_request()),
            r#"{"deviceId":"dev-1","clientType":"android","version":"2.1","validDays":30}"#
        );

        let renewed = client.renew_push(info.id).await.unwrap();
        assert_eq!(renewed.valid_until, Some(1_700_000_000_000));
        client.unregister_push(info.id).await.unwrap();

        let paths = transport
            .requests()
            .iter()
            .map(path_of)
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "/api/v4/push/registrations",
                "/api/v4/push/registrations/77/renew",
                "/api/v4/push/registrations/77",
            ]
        );
    }
}
