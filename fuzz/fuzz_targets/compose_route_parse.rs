#![no_main]

use libfuzzer_sys::fuzz_target;
use smc_compose_core::{DeepLink, DeepLinkResolution};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Some(link) = DeepLink::parse_route(&raw) else {
        return;
    };

    let route = link.route_path();
    let reparsed = DeepLink::parse_route(&route).expect("formatted route parses");
    assert_eq!(reparsed.route_path(), route);

    match link.resolve() {
        Ok(DeepLinkResolution::Lookup { audience, value }) => {
            assert!(audience.is_selected());
            assert!(!value.trim().is_empty());
        }
        Ok(DeepLinkResolution::Audience(audience)) => assert!(audience.is_selected()),
        Ok(DeepLinkResolution::FastPath) => assert!(link.kind.is_none()),
        Err(error) => assert!(!error.to_string().is_empty()),
    }
});
