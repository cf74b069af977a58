fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use cosapi_protocol::messages::{
        ListData, MutationRequest, ObjectInfo, PrepareData, UploadData,
    };
    use cosapi_protocol::{ApiResponse, FileDigest, UploadOutcome, UploadSession};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_slice(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Parses a fixture as a service response envelope.
    fn load_response(name: &str) -> ApiResponse {
        ApiResponse::from_slice(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse envelope {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(fixture: &serde_json::Value, name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, &reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
    }

    fn digest(len: u64) -> FileDigest {
        FileDigest {
            sha: "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12".into(),
            byte_length: len,
        }
    }

    // --- Upload responses ---

    #[test]
    fn fixture_prepare_session() {
        let resp = load_response("prepare_session.json");
        assert!(resp.is_success());
        let data: PrepareData = resp.parse_data().unwrap().unwrap();
        assert!(data.url.is_none());
        assert_eq!(data.slice_size, Some(3_145_728));

        let session = UploadSession::new(
            data.session.unwrap(),
            data.slice_size.unwrap(),
            data.offset.unwrap(),
            digest(25 * 1024 * 1024),
        )
        .unwrap();
        assert_eq!(session.remaining_slices(), 9);
    }

    #[test]
    fn fixture_prepare_resume() {
        let data: PrepareData = load_response("prepare_resume.json")
            .parse_data()
            .unwrap()
            .unwrap();
        let session = UploadSession::new(
            data.session.unwrap(),
            data.slice_size.unwrap(),
            data.offset.unwrap(),
            digest(25 * 1024 * 1024),
        )
        .unwrap();
        assert_eq!(session.resume_offset(), 6_291_456);
        assert_eq!(session.remaining_slices(), 7);
    }

    #[test]
    fn fixture_prepare_dedup() {
        let resp = load_response("prepare_dedup.json");
        let data: PrepareData = resp.parse_data().unwrap().unwrap();
        assert!(data.session.is_none());
        assert!(data.url.is_some());

        let outcome = UploadOutcome::from_response(&resp);
        assert!(outcome.is_success());
        assert_eq!(
            outcome.resource_url.as_deref(),
            Some("http://web.file.myqcloud.com/files/v1/10001/photos/2024/big.iso")
        );
    }

    #[test]
    fn fixture_slice_ack() {
        let resp = load_response("slice_ack.json");
        let data: UploadData = resp.parse_data().unwrap().unwrap();
        assert_eq!(data.offset, Some(3_145_728));
        assert!(data.resource_url().is_none());
        assert!(UploadOutcome::from_response(&resp).resource_url.is_none());
    }

    #[test]
    fn fixture_upload_complete() {
        let fixture = load_fixture("upload_complete.json");
        roundtrip_test::<UploadData>(&fixture["data"], "upload_complete.json#data");

        let outcome = UploadOutcome::from_response(&load_response("upload_complete.json"));
        assert_eq!(outcome.data.as_ref(), Some(&fixture["data"]));
    }

    #[test]
    fn fixture_error_response() {
        let resp = load_response("error_response.json");
        assert!(!resp.is_success());
        let outcome = UploadOutcome::from_response(&resp);
        assert_eq!(outcome.code, -166);
        assert_eq!(outcome.message, "ERROR_CMD_BUCKET_NOTEXIST");
        assert!(outcome.data.is_none());
    }

    // --- Metadata ---

    #[test]
    fn fixture_list_response() {
        let fixture = load_fixture("list_response.json");
        roundtrip_test::<ListData>(&fixture["data"], "list_response.json#data");

        let data: ListData = load_response("list_response.json")
            .parse_data()
            .unwrap()
            .unwrap();
        assert_eq!(data.infos.len(), 2);
        assert!(data.infos[0].is_dir());
        assert!(!data.infos[1].is_dir());
    }

    #[test]
    fn fixture_stat_response() {
        let fixture = load_fixture("stat_response.json");
        roundtrip_test::<ObjectInfo>(&fixture["data"], "stat_response.json#data");
    }

    #[test]
    fn fixture_mutation_requests() {
        for name in ["create_request.json", "update_request.json", "delete_request.json"] {
            roundtrip_test::<MutationRequest>(&load_fixture(name), name);
        }
        assert_eq!(
            serde_json::to_value(MutationRequest::create(true, Some("album"))).unwrap(),
            load_fixture("create_request.json")
        );
        assert_eq!(
            serde_json::to_value(MutationRequest::delete()).unwrap(),
            load_fixture("delete_request.json")
        );
    }
}
