pub mod types;
pub mod utils;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn service_info_uses_name_service_key() {
        let info = types::ServiceInfo { name_service: "Service B".into(), version: "0.1.0".into() };
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["name_service"], "Service B");
        assert_eq!(v["version"], "0.1.0");
    }
}
