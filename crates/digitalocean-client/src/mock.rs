//! Mock DropletClient for unit testing
//!
//! Stores droplets in memory, assigns addresses on create, records every call,
//! and can be scripted to return specific list outcomes per tag so tests can
//! simulate a provider that is still booting or inconsistent.

use crate::droplet_trait::DropletClientTrait;
use crate::error::DigitalOceanError;
use crate::models::*;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted result of one `list_droplets_by_tag` call
#[derive(Debug, Clone)]
pub enum ListOutcome {
    /// The provider query fails
    Error(String),
    /// The provider returns these droplets
    Droplets(Vec<Droplet>),
}

/// Mock DropletClient for testing
#[derive(Debug, Clone)]
pub struct MockDropletClient {
    base_url: String,
    droplets: Arc<Mutex<BTreeMap<i64, Droplet>>>,
    scripted_lists: Arc<Mutex<HashMap<String, VecDeque<ListOutcome>>>>,
    addresses: Arc<Mutex<HashMap<String, (String, String)>>>,
    create_error: Arc<Mutex<Option<String>>>,
    list_calls: Arc<Mutex<HashMap<String, u32>>>,
    create_requests: Arc<Mutex<Vec<CreateDropletRequest>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockDropletClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            droplets: Arc::new(Mutex::new(BTreeMap::new())),
            scripted_lists: Arc::new(Mutex::new(HashMap::new())),
            addresses: Arc::new(Mutex::new(HashMap::new())),
            create_error: Arc::new(Mutex::new(None)),
            list_calls: Arc::new(Mutex::new(HashMap::new())),
            create_requests: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1000)),
        }
    }

    /// Build a droplet with the given identity and addresses (for test setup)
    pub fn droplet(
        id: i64,
        name: &str,
        region: &str,
        size: &str,
        image: &str,
        addresses: Option<(&str, &str)>,
    ) -> Droplet {
        let v4 = addresses
            .map(|(private, public)| {
                vec![
                    NetworkAddress {
                        ip_address: private.to_string(),
                        netmask: None,
                        gateway: None,
                        address_type: "private".to_string(),
                    },
                    NetworkAddress {
                        ip_address: public.to_string(),
                        netmask: None,
                        gateway: None,
                        address_type: "public".to_string(),
                    },
                ]
            })
            .unwrap_or_default();

        Droplet {
            id,
            name: name.to_string(),
            status: "active".to_string(),
            region: Region {
                slug: region.to_string(),
                name: region.to_string(),
            },
            size_slug: size.to_string(),
            image: Image {
                id: 0,
                name: image.to_string(),
                slug: Some(image.to_string()),
            },
            networks: Networks { v4, v6: Vec::new() },
            tags: vec![name.to_string()],
            created_at: None,
        }
    }

    /// Add a droplet to the mock store (for test setup)
    pub fn add_droplet(&self, droplet: Droplet) {
        self.droplets.lock().unwrap().insert(droplet.id, droplet);
    }

    /// Queue list outcomes for `tag`; consumed before the store is consulted
    pub fn script_list(&self, tag: &str, outcomes: impl IntoIterator<Item = ListOutcome>) {
        self.scripted_lists
            .lock()
            .unwrap()
            .entry(tag.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Addresses assigned to the droplet named `name` on create
    pub fn set_addresses(&self, name: &str, private: &str, public: &str) {
        self.addresses
            .lock()
            .unwrap()
            .insert(name.to_string(), (private.to_string(), public.to_string()));
    }

    /// Make every subsequent create fail with `message`
    pub fn fail_creates(&self, message: &str) {
        *self.create_error.lock().unwrap() = Some(message.to_string());
    }

    /// Number of list calls made for `tag`
    pub fn list_calls(&self, tag: &str) -> u32 {
        self.list_calls.lock().unwrap().get(tag).copied().unwrap_or(0)
    }

    /// Every create request received, in order
    pub fn create_requests(&self) -> Vec<CreateDropletRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    /// IDs of deleted droplets, in order
    pub fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }

    /// Droplets currently stored
    pub fn droplets(&self) -> Vec<Droplet> {
        self.droplets.lock().unwrap().values().cloned().collect()
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }
}

#[async_trait::async_trait]
impl DropletClientTrait for MockDropletClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, DigitalOceanError> {
        *self.list_calls.lock().unwrap().entry(tag.to_string()).or_insert(0) += 1;

        let scripted = self
            .scripted_lists
            .lock()
            .unwrap()
            .get_mut(tag)
            .and_then(VecDeque::pop_front);
        if let Some(outcome) = scripted {
            return match outcome {
                ListOutcome::Error(message) => Err(DigitalOceanError::Api { status: 503, message }),
                ListOutcome::Droplets(droplets) => Ok(droplets),
            };
        }

        Ok(self
            .droplets
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet, DigitalOceanError> {
        self.create_requests.lock().unwrap().push(request.clone());

        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(DigitalOceanError::Api { status: 422, message });
        }

        let image = match &request.image {
            ImageIdentifier::Slug(slug) => slug.clone(),
            ImageIdentifier::Id(id) => id.to_string(),
        };
        let addresses = self.addresses.lock().unwrap().get(&request.name).cloned();
        let mut droplet = Self::droplet(
            self.next_id(),
            &request.name,
            &request.region,
            &request.size,
            &image,
            addresses.as_ref().map(|(private, public)| (private.as_str(), public.as_str())),
        );
        droplet.tags = request.tags.clone();

        self.add_droplet(droplet.clone());
        Ok(droplet)
    }

    async fn delete_droplet(&self, id: i64) -> Result<(), DigitalOceanError> {
        match self.droplets.lock().unwrap().remove(&id) {
            Some(_) => {
                self.deleted.lock().unwrap().push(id);
                Ok(())
            }
            None => Err(DigitalOceanError::NotFound(format!("droplet {id}"))),
        }
    }
}
