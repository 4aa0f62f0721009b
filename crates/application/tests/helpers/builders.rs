use hickory_proto::rr::rdata::{A, AAAA, CNAME, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

pub fn name(s: &str) -> Name {
    let fqdn = if s.ends_with('.') {
        s.to_string()
    } else {
        format!("{}.", s)
    };
    Name::from_str(&fqdn).unwrap()
}

pub fn a_record(owner: &str, ip: &str) -> Record {
    let ip: Ipv4Addr = ip.parse().unwrap();
    Record::from_rdata(name(owner), 300, RData::A(A(ip)))
}

pub fn aaaa_record(owner: &str, ip: &str) -> Record {
    let ip: Ipv6Addr = ip.parse().unwrap();
    Record::from_rdata(name(owner), 300, RData::AAAA(AAAA(ip)))
}

pub fn cname_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 300, RData::CNAME(CNAME(name(target))))
}

pub fn ns_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 3600, RData::NS(NS(name(target))))
}

pub fn ptr_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(name(owner), 3600, RData::PTR(PTR(name(target))))
}

pub fn srv_record(owner: &str, priority: u16, weight: u16, port: u16, target: &str) -> Record {
    Record::from_rdata(
        name(owner),
        120,
        RData::SRV(SRV::new(priority, weight, port, name(target))),
    )
}

pub fn txt_record(owner: &str, strings: &[&str]) -> Record {
    Record::from_rdata(
        name(owner),
        120,
        RData::TXT(TXT::new(strings.iter().map(|s| s.to_string()).collect())),
    )
}

pub fn soa_record(owner: &str, mname: &str) -> Record {
    Record::from_rdata(
        name(owner),
        3600,
        RData::SOA(SOA::new(
            name(mname),
            name(&format!("hostmaster.{}", owner)),
            2024010101,
            7200,
            3600,
            1209600,
            300,
        )),
    )
}
