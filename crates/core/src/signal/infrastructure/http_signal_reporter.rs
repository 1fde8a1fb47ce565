/// Reports signal codes to the receiver's `/data/` endpoint over HTTP GET.
///
/// The reading travels as a JSON object in the `sensor_reading` query
/// parameter, e.g. `/data/?sensor_reading={"sensor0_reading":6}`. The
/// response body is never read.
use serde::Serialize;

use crate::signal::domain::emotion_mapper::SignalCode;
use crate::signal::domain::signal_reporter::{ReportDispatchError, SignalReporter};

#[derive(Serialize)]
struct SensorReading {
    sensor0_reading: u8,
}

pub struct HttpSignalReporter {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSignalReporter {
    /// `endpoint` is the receiver host, optionally with `:port`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// One GET with the client's default settings; no retry.
    pub fn send(&self, code: SignalCode) -> Result<(), ReportDispatchError> {
        let url = reading_url(&self.endpoint, code)?;
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ReportDispatchError::Request {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportDispatchError::Status { url, status });
        }
        Ok(())
    }
}

impl SignalReporter for HttpSignalReporter {
    fn report(&mut self, code: SignalCode) {
        match self.send(code) {
            Ok(()) => log::debug!("Reported signal {code} to {}", self.endpoint),
            Err(e) => log::warn!("Signal report failed: {e}"),
        }
    }
}

pub fn reading_url(endpoint: &str, code: SignalCode) -> Result<String, ReportDispatchError> {
    let reading = serde_json::to_string(&SensorReading {
        sensor0_reading: code.value(),
    })
    .map_err(ReportDispatchError::Serialize)?;
    Ok(format!("http://{endpoint}/data/?sensor_reading={reading}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_reading_url_embeds_json_fragment() {
        let url = reading_url("192.168.4.1", SignalCode(6)).unwrap();
        assert_eq!(
            url,
            r#"http://192.168.4.1/data/?sensor_reading={"sensor0_reading":6}"#
        );
    }

    #[test]
    fn test_reading_url_no_signal() {
        let url = reading_url("10.0.0.2:8080", SignalCode::NO_SIGNAL).unwrap();
        assert!(url.starts_with("http://10.0.0.2:8080/data/"));
        assert!(url.contains(r#"sensor_reading={"sensor0_reading":0}"#));
    }

    #[test]
    fn test_send_hits_receiver_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/data/")
                .query_param("sensor_reading", r#"{"sensor0_reading":3}"#);
            then.status(200).body("OK");
        });

        let reporter = HttpSignalReporter::new(server.address().to_string());
        reporter.send(SignalCode(3)).unwrap();
        mock.assert_hits(1);
    }

    #[test]
    fn test_send_reports_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/data/");
            then.status(500);
        });

        let reporter = HttpSignalReporter::new(server.address().to_string());
        let result = reporter.send(SignalCode(1));
        assert!(matches!(
            result,
            Err(ReportDispatchError::Status { status, .. }) if status.as_u16() == 500
        ));
    }

    #[test]
    fn test_report_swallows_connection_failure() {
        // Reserve a free port, then close it so the connection is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut reporter = HttpSignalReporter::new(address);
        assert!(matches!(
            reporter.send(SignalCode(2)),
            Err(ReportDispatchError::Request { .. })
        ));
        reporter.report(SignalCode(2));
    }
}
