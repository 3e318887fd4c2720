//! Custom assertion macros for the response envelope

/// Assert a failure envelope with the given status and error code
#[macro_export]
macro_rules! assert_api_error {
    ($response:expr, $status:expr, $code:expr) => {{
        let response = &$response;
        assert_eq!(response.status, $status, "unexpected status, body: {}", response.body);
        assert_eq!(response.body["success"], serde_json::json!(false));
        assert_eq!(response.error_code(), Some($code), "body: {}", response.body);
    }};
}

/// Assert a success envelope with the given status
#[macro_export]
macro_rules! assert_api_ok {
    ($response:expr, $status:expr) => {{
        let response = &$response;
        assert_eq!(response.status, $status, "unexpected status, body: {}", response.body);
        assert_eq!(response.body["success"], serde_json::json!(true));
    }};
}
