use async_trait::async_trait;
use dnsclient_application::ports::{DnsClient, DnsClientFactory};
use dnsclient_domain::{ClientConfig, ClientError};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::opt::EdnsOption;
use hickory_proto::rr::{Record, RecordType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub enum MockReply {
    Answer {
        rcode: ResponseCode,
        answers: Vec<Record>,
        authority: Vec<Record>,
    },
    Timeout,
}

impl MockReply {
    pub fn answers(answers: Vec<Record>) -> Self {
        MockReply::Answer {
            rcode: ResponseCode::NoError,
            answers,
            authority: vec![],
        }
    }

    pub fn authority(authority: Vec<Record>) -> Self {
        MockReply::Answer {
            rcode: ResponseCode::NoError,
            answers: vec![],
            authority,
        }
    }

    pub fn rcode(rcode: ResponseCode) -> Self {
        MockReply::Answer {
            rcode,
            answers: vec![],
            authority: vec![],
        }
    }
}

type ZoneKey = (String, RecordType);

/// Scripted in-memory server keyed by (name, type); unknown keys get NXDOMAIN.
#[derive(Clone)]
pub struct MockDnsClient {
    config: ClientConfig,
    zone: Arc<RwLock<HashMap<ZoneKey, MockReply>>>,
    edns_options: Arc<RwLock<Vec<EdnsOption>>>,
    requests: Arc<RwLock<Vec<Message>>>,
    exchanges: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

fn key(name: &str, record_type: RecordType) -> ZoneKey {
    (
        name.trim_end_matches('.').to_ascii_lowercase(),
        record_type,
    )
}

impl MockDnsClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            zone: Arc::new(RwLock::new(HashMap::new())),
            edns_options: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            exchanges: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_max_cnames(max_cnames: u8) -> Self {
        Self::with_config(ClientConfig {
            max_cnames,
            ..ClientConfig::default()
        })
    }

    pub fn set_reply(&self, name: &str, record_type: RecordType, reply: MockReply) {
        self.zone
            .write()
            .unwrap()
            .insert(key(name, record_type), reply);
    }

    pub fn set_answers(&self, name: &str, record_type: RecordType, answers: Vec<Record>) {
        self.set_reply(name, record_type, MockReply::answers(answers));
    }

    /// Options attached to an OPT record in every response.
    pub fn echo_edns_option(&self, option: EdnsOption) {
        self.edns_options.write().unwrap().push(option);
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Message> {
        self.requests.read().unwrap().clone()
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|m| m.queries().first().map(|q| q.name().to_utf8()))
            .collect()
    }

    fn respond(&self, request: &Message) -> Result<Message, ClientError> {
        let query = request
            .queries()
            .first()
            .cloned()
            .ok_or_else(|| ClientError::Encode("request without question".to_string()))?;

        let reply = self
            .zone
            .read()
            .unwrap()
            .get(&key(&query.name().to_utf8(), query.query_type()))
            .cloned()
            .unwrap_or_else(|| MockReply::rcode(ResponseCode::NXDomain));

        let (rcode, answers, authority) = match reply {
            MockReply::Timeout => {
                return Err(ClientError::TransportTimeout {
                    server: self.config.server.clone(),
                })
            }
            MockReply::Answer {
                rcode,
                answers,
                authority,
            } => (rcode, answers, authority),
        };

        let mut response = Message::new(request.id(), MessageType::Response, OpCode::Query);
        response.set_recursion_desired(request.recursion_desired());
        response.set_recursion_available(true);
        response.set_response_code(rcode);
        response.add_query(query);
        for record in answers {
            response.add_answer(record);
        }
        for record in authority {
            response.add_name_server(record);
        }

        let options = self.edns_options.read().unwrap().clone();
        if !options.is_empty() {
            let mut edns = Edns::new();
            for option in options {
                edns.options_mut().insert(option);
            }
            response.set_edns(edns);
        }

        Ok(response)
    }
}

#[async_trait]
impl DnsClient for MockDnsClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.requests.write().unwrap().push(request.clone());
        self.respond(request)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out clones of one scripted client so every worker sees the same zone.
pub struct MockClientFactory {
    template: MockDnsClient,
    created: AtomicUsize,
    fail: bool,
}

impl MockClientFactory {
    pub fn new(template: MockDnsClient) -> Self {
        Self {
            template,
            created: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            template: MockDnsClient::new(),
            created: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl DnsClientFactory for MockClientFactory {
    fn create(&self) -> Result<Box<dyn DnsClient>, ClientError> {
        if self.fail {
            return Err(ClientError::TransportConnectionRefused {
                server: self.template.config.server.clone(),
                reason: "mock refused".to_string(),
            });
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone()))
    }
}
