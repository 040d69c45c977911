//! Device request construction for `deploy` and `json`.

use super::types::{DeviceRequest, Facility, ServerType, BILLING_CYCLE, OPERATING_SYSTEM};
use super::userdata::{CloudConfig, UserdataOptions};

/// What the operator asked for.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    pub hostname: String,
    pub server_type: ServerType,
    pub facility: Facility,
    pub userdata: UserdataOptions,
}

/// Build the request body. Fails if the license file is invalid.
pub fn build_device_request(spec: &DeviceSpec, ipxe_url: &str) -> Result<DeviceRequest, String> {
    let userdata = match CloudConfig::from_options(&spec.userdata)? {
        Some(cc) => Some(cc.render()?),
        None => None,
    };

    Ok(DeviceRequest {
        hostname: spec.hostname.clone(),
        plan: spec.server_type,
        billing_cycle: BILLING_CYCLE.to_string(),
        facility: spec.facility,
        operating_system: OPERATING_SYSTEM.to_string(),
        ipxe_script_url: ipxe_url.to_string(),
        userdata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_spec() -> DeviceSpec {
        DeviceSpec {
            hostname: "virl-sjc".to_string(),
            server_type: ServerType::Type2,
            facility: Facility::Ewr,
            userdata: UserdataOptions::default(),
        }
    }

    #[test]
    fn test_request_fixed_fields() {
        let req = build_device_request(&make_spec(), "http://packet.virl.info").unwrap();
        assert_eq!(req.hostname, "virl-sjc");
        assert_eq!(req.plan, ServerType::Type2);
        assert_eq!(req.facility, Facility::Ewr);
        assert_eq!(req.billing_cycle, "hourly");
        assert_eq!(req.operating_system, "custom_ipxe");
        assert_eq!(req.ipxe_script_url, "http://packet.virl.info");
        assert!(req.userdata.is_none());
    }

    #[test]
    fn test_request_embeds_compact_userdata() {
        let mut spec = make_spec();
        spec.userdata.uwm_password = Some("uwm-pw".to_string());
        let req = build_device_request(&spec, "http://ipxe.example").unwrap();
        assert_eq!(
            req.userdata.as_deref(),
            Some("#cloud-config\nuwm_password: uwm-pw\n")
        );
    }

    #[test]
    fn test_request_bad_license_rejected() {
        let mut spec = make_spec();
        spec.userdata.license_file = Some("/nonexistent/virl.pem".into());
        let err = build_device_request(&spec, "http://ipxe.example").unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
