use crate::domain::{AccountRegistration, Password, PasswordChangeBody, RawPhoneNumber, UserAccount};

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

const NOT_FOUND: u16 = 404;

impl YouMailClient {
    /// Log in with the configured credentials. See [`Session::login`](super::Session::login).
    pub async fn login(&self) -> Result<(), YouMailError> {
        self.session.login().await
    }

    /// Wait for any login in flight, then report whether the session is logged in.
    pub async fn is_logged_in(&self) -> bool {
        self.session.login_wait().await
    }

    /// Whether an account is registered for `phone_number`. Does not need a login.
    pub async fn account_exists(&self, phone_number: &RawPhoneNumber) -> Result<bool, YouMailError> {
        let request = ApiRequest::get(format!("{API_ROOT}/accounts/exists"))
            .query("phoneNumber", phone_number.raw())
            .anonymous();
        match self.execute(request).await {
            Ok(()) => Ok(true),
            Err(err) if err.status() == Some(NOT_FOUND) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Sign up a new account. Does not need a login.
    pub async fn create_account(
        &self,
        registration: &AccountRegistration,
    ) -> Result<UserAccount, YouMailError> {
        let body = self.encode("user", &registration.body())?;
        self.fetch(ApiRequest::post(format!("{API_ROOT}/accounts"), body).anonymous())
            .await
    }

    pub async fn get_account(&self) -> Result<UserAccount, YouMailError> {
        self.fetch(ApiRequest::get(format!("{API_ROOT}/accounts/me")))
            .await
    }

    pub async fn update_account(&self, details: &UserAccount) -> Result<(), YouMailError> {
        let body = self.encode("user", details)?;
        self.execute(ApiRequest::put(format!("{API_ROOT}/accounts/me"), body))
            .await
    }

    /// Change the account password.
    ///
    /// The session keeps the credentials it was built with; build a new client with the new
    /// password before the current token expires.
    pub async fn change_password(&self, new_password: &Password) -> Result<(), YouMailError> {
        let body = self.encode("password", &PasswordChangeBody::new(new_password))?;
        self.execute(ApiRequest::put(
            format!("{API_ROOT}/accounts/me/password"),
            body,
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::HttpResponse;
    use crate::client::testing::{FakeTransport, body_text, client, header, path_of, query_of};
    use crate::domain::{AccountRegistration, Password, RawPhoneNumber, UserAccount};
    use crate::transport::DataFormat;

    #[tokio::test]
    async fn account_exists_maps_not_found_to_false() {
        let transport = FakeTransport::new(|request| {
            let known = query_of(request)
                .iter()
                .any(|(key, value)| key == "phoneNumber" && value == "5555550100");
            Ok(HttpResponse::new(if known { 200 } else { 404 }, ""))
        });
        let client = client(transport.clone(), DataFormat::Json);

        let known = RawPhoneNumber::new("5555550100").unwrap();
        let unknown = RawPhoneNumber::new("5555550199").unwrap();
        assert!(client.account_exists(&known).await.unwrap());
        assert!(!client.account_exists(&unknown).await.unwrap());

        let request = transport.last_request();
        assert_eq!(path_of(&request), "/api/v4/accounts/exists");
        assert_eq!(header(&request, "Authorization"), None);
    }

    #[tokio::test]
    async fn account_exists_propagates_other_failures() {
        let transport = FakeTransport::new(|_| Ok(HttpResponse::new(500, "")));
        let client = client(transport, DataFormat::Json);

        let err = client
            .account_exists(&RawPhoneNumber::new("1").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn create_account_posts_xml_user_anonymously() {
        let transport = FakeTransport::new(|_| {
            Ok(HttpResponse::new(
                200,
                "<user><userId>42</userId><phoneNumber>5555550100</phoneNumber></user>",
            ))
        });
        let client = client(transport.clone(), DataFormat::Xml);

        let registration = AccountRegistration {
            phone_number: RawPhoneNumber::new("5555550100").unwrap(),
            password: Password::new("secret").unwrap(),
            email_address: Some("me@example.invalid".to_owned()),
            first_name: None,
            last_name: None,
            carrier_id: Some(3),
        };
        let account = client.create_account(&registration).await.unwrap();
        assert_eq!(account.user_id, Some(42));

        let request = transport.last_request();
        assert_eq!(path_of(&request), "/api/v4/accounts");
        assert_eq!(header(&request, "Authorization"), None);
        assert_eq!(header(&request, "Content-Type"), Some("application/xml"));
        let body = body_text(&request);
        assert!(body.starts_with("<user>"));
        assert!(body.contains("<phoneNumber>5555550100</phoneNumber>"));
        assert!(body.contains("<carrierId>3</carrierId>"));
        assert!(!body.contains("firstName"));
    }

    #[tokio::test]
    async fn account_details_round_trip_through_me() {
        let transport = FakeTransport::new(|request| {
            if request.body.is_some() {
                Ok(HttpResponse::new(200, ""))
            } else {
                Ok(HttpResponse::new(200, r#"{"userId":7,"firstName":"Ada"}"#))
            }
        });
        let client = client(transport.clone(), DataFormat::Json);

        let mut account = client.get_account().await.unwrap();
        assert_eq!(account.first_name.as_deref(), Some("Ada"));
        assert_eq!(
            header(&transport.last_request(), "Authorization"),
            Some("YouMail tok")
        );

        account.last_name = Some("Lovelace".to_owned());
        client.update_account(&account).await.unwrap();
        let request = transport.last_request();
        assert_eq!(path_of(&request), "/api/v4/accounts/me");
        let sent: UserAccount = serde_json::from_str(&body_text(&request)).unwrap();
        assert_eq!(sent.last_name.as_deref(), Some("Lovelace"));
    }

    #[tokio::test]
    async fn change_password_keeps_session_credentials() {
        let transport = FakeTransport::new(|_| Ok(HttpResponse::new(200, "")));
        let client = client(transport.clone(), DataFormat::Json);

        client
            .change_password(&Password::new("n3w").unwrap())
            .await
            .unwrap();
        let request = transport.last_request();
        assert_eq!(path_of(&request), "/api/v4/accounts/me/password");
        assert_eq!(body_text(&request), r#"{"password":"n3w"}"#);
        assert_eq!(client.session().username().unwrap().as_str(), "user");
    }

    #[tokio::test]
    async fn is_logged_in_reflects_session() {
        let transport = FakeTransport::new(|_| Ok(HttpResponse::new(403, "")));
        let client = client(transport, DataFormat::Json);

        assert!(client.is_logged_in().await);
        assert!(client.login().await.is_err());
        assert!(!client.is_logged_in().await);
    }
}
