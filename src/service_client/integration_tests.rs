#[cfg(test)]
mod integration_tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use reqwest::StatusCode;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::error_handling::types::ApiError;
    use crate::live_detection::{DeviceCamera, LiveSessionController, LiveSettings};
    use crate::notification::ConsoleNotifier;
    use crate::service_client::{DetectionService, HttpDetectionService};
    use crate::upload_analysis::{
        AnalyzeOutcome, MediaFile, ReportFormat, UploadController, UploadSettings, UploadStatus,
    };

    #[derive(Clone)]
    struct Route {
        method: &'static str,
        path: &'static str,
        status: u16,
        body: &'static str,
    }

    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        path: String,
        body: Vec<u8>,
    }

    type Journal = Arc<Mutex<Vec<Recorded>>>;

    const LIVE_RESULTS: &str = r#"{"results":[{"confidence":0.2,"is_violent":false,"timestamp":1700000000.0},{"confidence":0.91,"is_violent":true,"timestamp":1700000000.5}],"total_detections":3}"#;
    const UPLOAD_OK: &str = r#"{"success":true,"results":{"total_frames":30,"analyzed_frames":1,"violent_frames":0,"violence_percentage":0.0,"is_violent_video":false,"frame_results":[{"frame":0,"timestamp":0.0,"is_violent":false,"confidence":0.1}]}}"#;

    fn route(method: &'static str, path: &'static str, status: u16, body: &'static str) -> Route {
        Route {
            method,
            path,
            status,
            body,
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<Recorded> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.lines();
        let mut request_line = lines.next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let path = request_line.next().unwrap_or_default().to_string();

        let mut content_length = None;
        let mut chunked = false;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse::<usize>().ok(),
                "transfer-encoding" => chunked = value.to_ascii_lowercase().contains("chunked"),
                _ => {}
            }
        }

        loop {
            let body = &buf[header_end..];
            let complete = match content_length {
                Some(len) => body.len() >= len,
                None if chunked => body.ends_with(b"0\r\n\r\n"),
                None => true,
            };
            if complete {
                break;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Ok(Recorded {
            method,
            path,
            body: buf[header_end..].to_vec(),
        })
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            _ => "Internal Server Error",
        }
    }

    /// Serves canned JSON answers on an ephemeral port. Returns the base URL and the request
    /// journal.
    async fn serve(routes: Vec<Route>) -> (String, Journal) {
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&journal);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let Ok(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let (status, body) = routes
                        .iter()
                        .find(|r| r.method == request.method && r.path == request.path)
                        .map(|r| (r.status, r.body))
                        .unwrap_or((404, r#"{"error":"not found"}"#));
                    log.lock().unwrap().push(request);

                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason(status),
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), journal)
    }

    fn client(base_url: &str) -> HttpDetectionService {
        let _ = env_logger::builder().is_test(true).try_init();
        HttpDetectionService::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_live_endpoints() {
        let (base, journal) = serve(vec![
            route("POST", "/start_live_detection", 200, r#"{"status":"started"}"#),
            route("POST", "/stop_live_detection", 200, r#"{"status":"stopped"}"#),
            route("GET", "/get_live_results", 200, LIVE_RESULTS),
        ])
        .await;
        let service = client(&format!("{}/", base));
        assert_eq!(service.base_url(), base);

        service.start_live_detection().await.unwrap();
        let results = service.get_live_results().await.unwrap();
        service.stop_live_detection().await.unwrap();

        assert_eq!(results.results.len(), 2);
        assert_eq!(results.total_detections, 3);
        let latest = results.latest().unwrap();
        assert!(latest.is_violent);
        assert_eq!(latest.confidence, 0.91);

        let requests: Vec<(String, String)> = journal
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect();
        assert_eq!(
            requests,
            vec![
                ("POST".to_string(), "/start_live_detection".to_string()),
                ("GET".to_string(), "/get_live_results".to_string()),
                ("POST".to_string(), "/stop_live_detection".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_start_rejected_by_server() {
        let (base, _) = serve(vec![route(
            "POST",
            "/start_live_detection",
            500,
            r#"{"error":"camera busy"}"#,
        )])
        .await;
        let service = client(&base);

        match service.start_live_detection().await {
            Err(ApiError::UnexpectedStatus { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("camera busy"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = client(&format!("http://{}", addr));
        assert!(matches!(
            service.get_live_results().await,
            Err(ApiError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_video_field() {
        let (base, journal) = serve(vec![route("POST", "/upload_video", 200, UPLOAD_OK)]).await;
        let service = client(&base);

        let result = service
            .upload_video("movie.mp4", "video/mp4", vec![7u8; 135])
            .await
            .unwrap();
        assert_eq!(result.total_frames, 30);
        assert_eq!(result.frame_results.len(), 1);

        let recorded = journal.lock().unwrap()[0].clone();
        let body = String::from_utf8_lossy(&recorded.body);
        assert!(body.contains("name=\"video\""));
        assert!(body.contains("filename=\"movie.mp4\""));
        assert!(body.contains("video/mp4"));
    }

    #[tokio::test]
    async fn test_upload_error_payload() {
        let (base, _) = serve(vec![route(
            "POST",
            "/upload_video",
            400,
            r#"{"error":"No video file provided"}"#,
        )])
        .await;
        let service = client(&base);

        match service.upload_video("movie.mp4", "video/mp4", vec![0]).await {
            Err(ApiError::Service(message)) => assert_eq!(message, "No video file provided"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_controller_against_server() {
        let (base, _) = serve(vec![route("POST", "/upload_video", 200, UPLOAD_OK)]).await;
        let controller = UploadController::new(
            client(&base),
            Arc::new(ConsoleNotifier::new()),
            UploadSettings::default(),
        );
        let dir = tempfile::TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        std::fs::write(&video, vec![0u8; 135]).unwrap();

        let file = MediaFile::from_path(&video).await.unwrap();
        controller.select_file(file).unwrap();
        assert_eq!(controller.analyze().await.unwrap(), AnalyzeOutcome::Completed);
        assert_eq!(controller.status(), UploadStatus::Results);

        let out = dir.path().join("reports");
        let csv = controller
            .export_report(ReportFormat::Csv, Path::new(&out))
            .unwrap();
        assert!(std::fs::read_to_string(csv)
            .unwrap()
            .ends_with("0,0,false,0.1\n"));
    }

    #[tokio::test]
    async fn test_live_session_against_server() {
        let (base, journal) = serve(vec![
            route("POST", "/start_live_detection", 200, "{}"),
            route("POST", "/stop_live_detection", 200, "{}"),
            route("GET", "/get_live_results", 200, LIVE_RESULTS),
        ])
        .await;
        let settings = LiveSettings {
            poll_interval: Duration::from_millis(20),
            ..LiveSettings::default()
        };
        let controller = LiveSessionController::new(
            client(&base),
            Arc::new(ConsoleNotifier::new()),
            Arc::new(DeviceCamera::new(None)),
            settings,
        );

        controller.start().await.unwrap();
        let mut waited = Duration::ZERO;
        while controller.view().total_detections == 0 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }

        let view = controller.view();
        assert_eq!(view.total_detections, 3);
        assert!(view.is_violent);
        assert_eq!(view.confidence_percent, 91);
        assert!(controller.alert().is_visible());

        controller.stop().await.unwrap();
        assert!(!controller.is_active());
        let stops = journal
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == "/stop_live_detection")
            .count();
        assert_eq!(stops, 1);
    }
}
