// Remote classifier behavior against a local stand-in server.
//
// A bare TcpListener answers every request with a canned HTTP response, so
// these tests never leave the machine. A failing remote must yield exactly
// the heuristic verdict; a working one must replace it.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use trust_guardian::config::Config;
use trust_guardian::detectors::traits::ThreatLevel;
use trust_guardian::detectors::DetectorSet;
use trust_guardian::scoring::Analyzer;
use trust_guardian::steering::SteeringConfig;

/// Serve `status` with `body` to every connection; returns the base URL.
async fn canned_server(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Read headers plus a Content-Length body so the client isn't reset
/// mid-write.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + content_length {
                return;
            }
        }
    }
}

fn config_for(base_url: &str, with_perspective: bool) -> Config {
    Config {
        hugging_face_api_key: Some("test-key".to_string()),
        perspective_api_key: with_perspective.then(|| "test-key".to_string()),
        hugging_face_api_url: base_url.to_string(),
        perspective_api_url: base_url.to_string(),
        http_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

#[tokio::test]
async fn server_error_falls_back_to_heuristics() {
    let base = canned_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let remote = Analyzer::new(DetectorSet::from_config(&config_for(&base, true)).unwrap());
    let local = Analyzer::new(DetectorSet::local());
    let config = SteeringConfig::default();

    for text in [
        "FREE MONEY WINNER CLICK HERE ACT NOW",
        "URGENT: wire money via western union",
        "you stupid idiot!!!",
        "a deepfake video, AI generated",
        "see you on Monday",
    ] {
        let from_remote = remote.analyze(text, &config).await;
        let from_local = local.analyze(text, &config).await;
        assert_eq!(from_remote.score, from_local.score, "text: {text}");
        assert_eq!(from_remote.spam, from_local.spam);
        assert_eq!(from_remote.toxicity, from_local.toxicity);
    }
}

#[tokio::test]
async fn malformed_body_falls_back_to_heuristics() {
    let base = canned_server("200 OK", "not json at all").await;
    let detectors = DetectorSet::from_config(&config_for(&base, true)).unwrap();
    let analysis = Analyzer::new(detectors)
        .analyze("please click here", &SteeringConfig::default())
        .await;
    assert_eq!(analysis.spam.confidence, 35.0);
    assert_eq!(analysis.spam.threat_level, ThreatLevel::Medium);
}

#[tokio::test]
async fn unreachable_server_falls_back_to_heuristics() {
    // Bind then drop so nothing is listening on the port
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let base = format!("http://{addr}");
    let detectors = DetectorSet::from_config(&config_for(&base, true)).unwrap();
    let analysis = Analyzer::new(detectors)
        .analyze("you stupid idiot!!!", &SteeringConfig::default())
        .await;
    assert_eq!(analysis.toxicity.confidence, 50.0);
}

#[tokio::test]
async fn successful_remote_verdict_replaces_heuristic() {
    let base = canned_server(
        "200 OK",
        r#"[[{"label":"LABEL_1","score":0.9},{"label":"LABEL_0","score":0.1}]]"#,
    )
    .await;
    let detectors = DetectorSet::from_config(&config_for(&base, false)).unwrap();
    let analysis = Analyzer::new(detectors)
        .analyze("see you on Monday", &SteeringConfig::default())
        .await;

    // Spam and scam read LABEL_1
    assert_eq!(analysis.spam.confidence, 90.0);
    assert_eq!(analysis.spam.threat_level, ThreatLevel::High);
    assert_eq!(analysis.scam.confidence, 90.0);
    // The deepfake model's label is absent, which scores 0
    assert_eq!(analysis.deepfake.confidence, 0.0);
    assert_eq!(
        analysis.deepfake.details.as_deref(),
        Some("Likely authentic content")
    );
    // No Perspective key: toxicity stays local
    assert_eq!(analysis.toxicity.confidence, 0.0);
    assert_eq!(analysis.toxicity.details.as_deref(), Some("No toxicity detected"));

    assert!(analysis.score.is_threat);
    assert_eq!(analysis.score.overall, ThreatLevel::High);
}
