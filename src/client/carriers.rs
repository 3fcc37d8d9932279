use crate::domain::{Carrier, CarrierLookup, RawPhoneNumber};
use crate::transport::CarrierList;

use super::{API_ROOT, ApiRequest, Protocol, YouMailClient, YouMailError};

impl YouMailClient {
    /// Carriers YouMail knows how to forward from. Does not need a login.
    pub async fn list_carriers(&self) -> Result<Vec<Carrier>, YouMailError> {
        let request = ApiRequest::get(format!("{API_ROOT}/carriers")).anonymous();
        let list: CarrierList = self.fetch(request).await?;
        Ok(list.items)
    }

    /// Carrier serving `phone_number`. Always sent over HTTPS; does not need a login.
    pub async fn lookup_carrier(
        &self,
        phone_number: &RawPhoneNumber,
    ) -> Result<CarrierLookup, YouMailError> {
        let request = ApiRequest::get(format!("{API_ROOT}/carriers/lookup"))
            .query("phoneNumber", phone_number.raw())
            .protocol(Protocol::Https)
            .anonymous();
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::HttpResponse;
    use crate::client::testing::{FakeTransport, client, header, query_of};
    use crate::domain::RawPhoneNumber;
    use crate::transport::DataFormat;

    #[tokio::test]
    async fn carriers_are_anonymous() {
        let transport = FakeTransport::new(|_| {
            Ok(HttpResponse::new(
                200,
                r#"{"carriers":[{"id":1,"name":"Acme Mobile","supported":true}]}"#,
            ))
        });
        let client = client(transport.clone(), DataFormat::Json);

        let carriers = client.list_carriers().await.unwrap();
        assert_eq!(carriers[0].name, "Acme Mobile");
        assert!(carriers[0].supported);
        assert_eq!(header(&transport.last_request(), "Authorization"), None);
    }

    #[tokio::test]
    async fn lookup_is_forced_to_https() {
        let transport = FakeTransport::new(|_| {
            Ok(HttpResponse::new(
                200,
                "<carrierLookup><phoneNumber>5555550100</phoneNumber>\
                 <carrier><id>2</id><name>Other</name></carrier>\
                 <isWireless>true</isWireless></carrierLookup>",
            ))
        });
        let client = client(transport.clone(), DataFormat::Xml);
        client.session().set_secure_connections(false);

        let lookup = client
            .lookup_carrier(&RawPhoneNumber::new("5555550100").unwrap())
            .await
            .unwrap();
        assert!(lookup.is_wireless);
        assert_eq!(lookup.carrier.unwrap().id, 2);

        let request = transport.last_request();
        assert!(request.url.starts_with("https://api.example.invalid/api/v4/carriers/lookup?"));
        assert_eq!(
            query_of(&request),
            vec![("phoneNumber".to_owned(), "5555550100".to_owned())]
        );
        assert_eq!(header(&request, "Authorization"), None);
    }
}
