use crate::domain::{RawPhoneNumber, SpamReport, SpamScore};

use super::{API_ROOT, ApiRequest, YouMailClient, YouMailError};

impl YouMailClient {
    /// Spam risk for a caller.
    pub async fn lookup_spam(&self, phone_number: &RawPhoneNumber) -> Result<SpamScore, YouMailError> {
        let request =
            ApiRequest::get(format!("{API_ROOT}/spam")).query("phoneNumber", phone_number.raw());
        self.fetch(request).await
    }

    pub async fn report_spam(&self, report: &SpamReport) -> Result<(), YouMailError> {
        let body = self.encode("spamReport", &report.body())?;
        self.execute(ApiRequest::post(format!("{API_ROOT}/spam/reports"), body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::HttpResponse;
    use crate::client::testing::{FakeTransport, body_text, client, path_of, query_of};
    use crate::domain::{RawPhoneNumber, SpamReport};
    use crate::transport::DataFormat;

    #[tokio::test]
    async fn lookup_spam_queries_by_number() {
        let transport = FakeTransport::new(|_| {
            Ok(HttpResponse::new(
                200,
                r#"{"phoneNumber":"8005550100","spamRisk":3,"reportCount":120}"#,
            ))
        });
        let client = client(transport.clone(), DataFormat::Json);

        let score = client
            .lookup_spam(&RawPhoneNumber::new("8005550100").unwrap())
            .await
            .unwrap();
        assert_eq!(score.spam_risk, 3);
        assert_eq!(score.report_count, 120);
        assert_eq!(
            query_of(&transport.last_request()),
            vec![("phoneNumber".to_owned(), "8005550100".to_owned())]
        );
    }

    #[tokio::test]
    async fn report_spam_encodes_report() {
        let transport = FakeTransport::new(|_| Ok(HttpResponse::new(200, "")));
        let client = client(transport.clone(), DataFormat::Xml);

        let report = SpamReport {
            phone_number: RawPhoneNumber::new("8005550100").unwrap(),
            caller_name: None,
            comment: Some("robocall".to_owned()),
        };
        client.report_spam(&report).await.unwrap();

        let request = transport.last_request();
        assert_eq!(path_of(&request), "/api/v4/spam/reports");
        assert_eq!(
            body_text(&request),
            "<spamReport><phoneNumber>8005550100</phoneNumber>\
             <comment>robocall</comment></spamReport>"
        );
    }
}
