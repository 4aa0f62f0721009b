pub mod addresses;
pub mod lookup;
pub mod nameservers;
pub mod probe;
pub mod scan;
pub mod service_discovery;

pub use addresses::{get_ip4s, get_ip6s, get_ips};
pub use lookup::{exchange, lookup, lookup_name};
pub use nameservers::get_name_servers;
pub use probe::{probe_client_subnet, probe_nsid};
pub use scan::{ScanRecord, ScanUseCase};
pub use service_discovery::{
    enumerate_services, get_all_service_browser_domains, get_default_service_browser_domain,
    get_legacy_service_browser_domain, get_service_browser_domains, get_service_instance_info,
    get_service_instances, get_services,
};
