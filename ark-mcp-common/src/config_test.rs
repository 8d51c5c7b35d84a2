//! Tests for the configuration module.
//!
//! `Config::from_lookup` is exercised with in-memory maps so the tests never
//! mutate the process environment.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::ConfigError;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

/// Strategy for generating valid port numbers
fn port_strategy() -> impl Strategy<Value = u16> {
    1024u16..65535u16
}

/// Strategy for generating http(s) base URLs
fn base_url_strategy() -> impl Strategy<Value = String> {
    ("https?", "[a-z]{3,12}", "(/api/v[0-9])?")
        .prop_map(|(scheme, host, path)| format!("{}://{}.example.com{}", scheme, host, path))
}

mod config_logic_tests {
    use super::*;

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("ARK_API_KEY", "secret-key"),
            ("ARK_BASE_URL", "http://localhost:9000/api/v3"),
            ("ARK_DEFAULT_MODEL", "doubao-seedream-4-0"),
            ("PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.base_url, "http://localhost:9000/api/v3");
        assert_eq!(config.default_model, "doubao-seedream-4-0");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn empty_api_key_is_treated_as_absent() {
        let config = Config::from_lookup(lookup_from(&[("ARK_API_KEY", "")])).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("ARK_BASE_URL", "  ")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(ref name, _)) if name == "ARK_BASE_URL"));
    }

    #[test]
    fn empty_default_model_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("ARK_DEFAULT_MODEL", "")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(ref name, _)) if name == "ARK_DEFAULT_MODEL"));
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn images_endpoint_formats_correctly() {
        let config = Config::default();
        assert_eq!(
            config.images_endpoint(),
            "https://ark.cn-beijing.volces.com/api/v3/images/generations"
        );
    }

    #[test]
    fn images_endpoint_tolerates_trailing_slash() {
        let config = Config::default().with_base_url("http://127.0.0.1:1234/");
        assert_eq!(config.images_endpoint(), "http://127.0.0.1:1234/images/generations");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::default().with_api_key(Some("super-secret".to_string()));
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("redacted"));
        assert!(debug_str.contains(DEFAULT_BASE_URL));
    }
}

mod property_tests {
    use super::*;

    proptest! {
        /// For any valid port number, the lookup value is preserved.
        #[test]
        fn config_preserves_port(port in port_strategy()) {
            let port_str = port.to_string();
            let config = Config::from_lookup(lookup_from(&[("PORT", port_str.as_str())])).unwrap();
            prop_assert_eq!(config.port, port);
        }

        /// The images endpoint always starts with the base URL and ends with
        /// the generations path.
        #[test]
        fn images_endpoint_extends_base_url(base_url in base_url_strategy()) {
            let config = Config::default().with_base_url(base_url.clone());
            let endpoint = config.images_endpoint();

            prop_assert!(endpoint.starts_with(&base_url));
            prop_assert!(endpoint.ends_with("/images/generations"));
            prop_assert!(!endpoint.contains("//images"));
        }
    }
}
